//! Host 提供的函数
//!
//! 样例代码只依赖 [`Host`] trait；在 wasm32 上由 [`ImportedHost`] 转发到
//! `env` 模块的导入函数，原生测试则使用 `testing::RecordingHost`。

use std::ffi::CStr;

/// Guest 能调用的全部 host 能力
pub trait Host {
    /// 打印一行 NUL 结尾的字符串。Host 只在调用期间借用 `msg`。
    fn print(&self, msg: &CStr) -> i32;

    /// 把一块 buffer 连同长度交给 host。Host 借用，不释放。
    fn receive_buffer(&self, buf: &[u8]) -> i32;

    /// 单调递增的微秒时钟
    fn time_since_boot_us(&self) -> i64;

    fn test_host_func(&self, a: i32) -> i32;
}

impl<H: Host + ?Sized> Host for &H {
    fn print(&self, msg: &CStr) -> i32 {
        (**self).print(msg)
    }

    fn receive_buffer(&self, buf: &[u8]) -> i32 {
        (**self).receive_buffer(buf)
    }

    fn time_since_boot_us(&self) -> i64 {
        (**self).time_since_boot_us()
    }

    fn test_host_func(&self, a: i32) -> i32 {
        (**self).test_host_func(a)
    }
}

#[cfg(target_arch = "wasm32")]
mod imports {
    use std::os::raw::c_char;

    // 由 host 在 `env` 模块下提供
    extern "C" {
        pub fn HostPrint(msg: *const c_char) -> i32;
        pub fn HostFuncWithBufferAndLength(buffer: *const u8, length: i32) -> i32;
        pub fn GetTimeSinceBootMicrosecond() -> i64;
        pub fn TestHostFunc(a: i32) -> i32;
    }
}

/// 转发到真实 host 导入函数的实现
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportedHost;

#[cfg(target_arch = "wasm32")]
impl Host for ImportedHost {
    fn print(&self, msg: &CStr) -> i32 {
        // SAFETY: msg 以 NUL 结尾，调用期间一直有效
        unsafe { imports::HostPrint(msg.as_ptr()) }
    }

    fn receive_buffer(&self, buf: &[u8]) -> i32 {
        let Ok(len) = i32::try_from(buf.len()) else {
            return -1;
        };
        // SAFETY: ptr/len 在调用期间指向有效的切片
        unsafe { imports::HostFuncWithBufferAndLength(buf.as_ptr(), len) }
    }

    fn time_since_boot_us(&self) -> i64 {
        unsafe { imports::GetTimeSinceBootMicrosecond() }
    }

    fn test_host_func(&self, a: i32) -> i32 {
        unsafe { imports::TestHostFunc(a) }
    }
}
