/// 导出 `malloc`、`free` 和 `guest_string_free`
///
/// Host 通过 `malloc` 在 guest 线性内存里为参数分配空间，并通过 `free` /
/// `guest_string_free` 释放 guest 交还给它的 buffer。只在 wasm32 上生效，
/// 原生构建（测试）不会覆盖进程的 libc 分配器。
#[macro_export]
macro_rules! export_guest_alloc {
    () => {
        #[cfg(target_arch = "wasm32")]
        #[export_name = "malloc"]
        pub extern "C" fn __guest_malloc(size: i32) -> *mut u8 {
            $crate::memory::malloc(size)
        }

        #[cfg(target_arch = "wasm32")]
        #[export_name = "free"]
        pub unsafe extern "C" fn __guest_free(ptr: *mut u8) {
            $crate::memory::free(ptr)
        }

        #[cfg(target_arch = "wasm32")]
        #[export_name = "guest_string_free"]
        pub unsafe extern "C" fn __guest_string_free(desc: *mut $crate::GuestString) {
            $crate::descriptor::free_guest_string(desc)
        }
    };
}
