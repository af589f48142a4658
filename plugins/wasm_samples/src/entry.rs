//! 导出函数的指针层
//!
//! 把 host 传来的裸指针转换成所有权句柄：接管的参数包成 `OwnedBuffer` /
//! `OwnedCStr`，借用的参数包成 `&CStr` / `&mut [u8]`，返回给 host 的 buffer
//! 用 `into_raw` 交出。失败在这里转换成哨兵值并打印错误。
//!
//! 这一层对 [`Host`] 泛型，原生构建也会编译，`exports` 只是 wasm32 上的薄包装。

use std::os::raw::c_char;
use std::ptr;

use samples_guest_sdk::descriptor::free_guest_string;
use samples_guest_sdk::memory::{borrow_c_str, c_str_bytes_mut};
use samples_guest_sdk::{error, GuestError, GuestString, Host, OwnedBuffer, OwnedCStr};

use crate::{component, hello, run_wasm};

/// 接管参数失败时打印错误
fn adopt<H: Host, T>(host: &H, export: &str, adopted: Result<T, GuestError>) -> Option<T> {
    match adopted {
        Ok(value) => Some(value),
        Err(e) => {
            error!(host, "{}: {}", export, e);
            None
        }
    }
}

/// `HelloWorld`
///
/// # Safety
///
/// `msg` 为空，或者是 host 持有的 NUL 结尾字符串，guest 只借用。
pub unsafe fn hello_world<H: Host>(host: &H, msg: *const c_char) -> i32 {
    match borrow_c_str(msg) {
        Some(msg) => hello::hello_world(host, msg),
        None => {
            error!(host, "HelloWorld: {}", GuestError::NullPointer);
            -1
        }
    }
}

/// `ReceiveByteArray`
///
/// # Safety
///
/// `data` 为空，或者来自导出的 `malloc`，所有权转交给 guest。
pub unsafe fn receive_byte_array<H: Host>(host: &H, data: *mut u8, length: i32) -> *mut u8 {
    let data = OwnedBuffer::from_raw(data).and_then(|buf| buf.with_wasm_len(length));
    adopt(host, "ReceiveByteArray", data)
        .and_then(|data| run_wasm::receive_byte_array(host, data))
        .map_or(ptr::null_mut(), OwnedBuffer::into_raw)
}

/// `WasmPrintUsingHostPrint`
///
/// # Safety
///
/// `msg` 为空，或者来自导出的 `malloc`，所有权转交给 guest。
pub unsafe fn wasm_print_using_host_print<H: Host>(host: &H, msg: *mut c_char) -> i32 {
    adopt(host, "WasmPrintUsingHostPrint", OwnedCStr::from_raw(msg))
        .map_or(-1, |msg| run_wasm::print_using_host_print(host, msg))
}

/// `Print`
///
/// # Safety
///
/// 同 [`wasm_print_using_host_print`]。
pub unsafe fn print<H: Host>(host: &H, msg: *mut c_char) {
    if let Some(msg) = adopt(host, "Print", OwnedCStr::from_raw(msg)) {
        run_wasm::print(host, msg);
    }
}

/// `Echo`: 不检查内容，同一块 buffer 原样交还调用方。空指针返回空指针。
///
/// # Safety
///
/// `msg` 为空，或者来自导出的 `malloc`；返回值的所有权交给调用方。
pub unsafe fn echo(msg: *mut c_char) -> *mut c_char {
    match OwnedBuffer::from_raw(msg.cast()) {
        Ok(buf) => run_wasm::echo(buf).into_raw().cast(),
        Err(_) => ptr::null_mut(),
    }
}

/// `ToUpper`: 成功时返回 `msg` 本身，空字符串或空指针返回空指针
///
/// # Safety
///
/// `msg` 为空，或者是可写的 NUL 结尾字符串，调用期间没有其他引用。所有权不变。
pub unsafe fn to_upper(msg: *mut c_char) -> *mut c_char {
    let Some(bytes) = c_str_bytes_mut(msg) else {
        return ptr::null_mut();
    };
    if run_wasm::to_upper(bytes) {
        msg
    } else {
        ptr::null_mut()
    }
}

/// `PrintUpper`
///
/// # Safety
///
/// 同 [`wasm_print_using_host_print`]。
pub unsafe fn print_upper<H: Host>(host: &H, msg: *mut c_char) {
    if let Some(msg) = adopt(host, "PrintUpper", OwnedCStr::from_raw(msg)) {
        run_wasm::print_upper(host, msg);
    }
}

/// `guest_echo`: 结果写进 `ret`；`ret` 为空时结果直接释放
///
/// # Safety
///
/// `msg` 为空或指向调用方转交的描述符；`ret` 为空或指向可写的描述符。
pub unsafe fn guest_echo<H: Host>(host: &H, msg: *mut GuestString, ret: *mut GuestString) {
    let mut out = component::guest_echo(host, msg);
    match ret.as_mut() {
        Some(ret) => *ret = out,
        None => free_guest_string(&mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::slice;

    use samples_guest_sdk::memory::{free, live_allocations, malloc};
    use samples_guest_sdk::testing::RecordingHost;
    use samples_types::split_prefixed;

    // 模拟 host：用导出的 malloc 分配并写入（malloc 的内存已清零）
    fn host_bytes(bytes: &[u8]) -> *mut u8 {
        let ptr = malloc(bytes.len() as i32);
        assert!(!ptr.is_null());
        unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len()) };
        ptr
    }

    fn host_c_string(s: &str) -> *mut c_char {
        let ptr = malloc(s.len() as i32 + 1);
        assert!(!ptr.is_null());
        unsafe { ptr::copy_nonoverlapping(s.as_ptr(), ptr, s.len()) };
        ptr.cast()
    }

    #[test]
    fn test_hello_world_only_borrows() {
        let host = RecordingHost::new();
        let msg = host_c_string("Hello from the host");

        assert_eq!(unsafe { hello_world(&host, msg) }, 0);
        assert_eq!(host.prints()[0], "Hello from the host\n");

        // 参数仍归 host 所有
        assert_eq!(live_allocations(), 1);
        unsafe { free(msg.cast()) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_hello_world_null() {
        let host = RecordingHost::new();
        assert_eq!(unsafe { hello_world(&host, ptr::null()) }, -1);
        assert!(host.prints()[0].starts_with("[ERROR] HelloWorld: "));
    }

    #[test]
    fn test_receive_byte_array_frees_input() {
        let host = RecordingHost::new();
        let data = host_bytes(&[0x01, 0x02, 0x03]);

        let out = unsafe { receive_byte_array(&host, data, 3) };
        assert!(!out.is_null());
        assert_eq!(live_allocations(), 1);

        let out = unsafe { OwnedBuffer::from_raw(out) }.unwrap();
        assert_eq!(split_prefixed(&out).unwrap(), &[0x01, 0x02, 0x03]);
        drop(out);
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_receive_byte_array_bad_length() {
        let host = RecordingHost::new();

        for length in [-1, 4] {
            let data = host_bytes(b"abc");
            assert!(unsafe { receive_byte_array(&host, data, length) }.is_null());
            assert_eq!(live_allocations(), 0);
        }
        assert!(unsafe { receive_byte_array(&host, ptr::null_mut(), 0) }.is_null());

        let prints = host.prints();
        assert_eq!(prints.len(), 3);
        assert!(prints.iter().all(|p| p.starts_with("[ERROR] ReceiveByteArray: ")));
    }

    #[test]
    fn test_wasm_print_using_host_print() {
        let host = RecordingHost::new();
        let msg = host_c_string("Hello, World!");

        assert_eq!(unsafe { wasm_print_using_host_print(&host, msg) }, 13);
        assert_eq!(host.prints(), vec!["Hello, World!"]);
        assert_eq!(live_allocations(), 0);

        assert_eq!(unsafe { wasm_print_using_host_print(&host, ptr::null_mut()) }, -1);
    }

    #[test]
    fn test_print_and_print_upper_free_argument() {
        let host = RecordingHost::new();

        unsafe { print(&host, host_c_string("plain\n")) };
        unsafe { print_upper(&host, host_c_string("quiet")) };
        unsafe { print_upper(&host, host_c_string("")) };

        assert_eq!(host.prints(), vec!["plain\n", "QUIET", ""]);
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_echo_returns_same_pointer() {
        let msg = host_c_string("Hello, echo!");

        let out = unsafe { echo(msg) };
        assert_eq!(out, msg);
        assert_eq!(unsafe { CStr::from_ptr(out) }.to_bytes(), b"Hello, echo!");
        assert_eq!(live_allocations(), 1);

        unsafe { free(out.cast()) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_echo_does_not_require_terminator() {
        let data = host_bytes(b"hello");

        let out = unsafe { echo(data.cast()) };
        assert_eq!(out.cast::<u8>(), data);
        assert_eq!(unsafe { slice::from_raw_parts(out.cast::<u8>(), 5) }, b"hello");
        assert_eq!(live_allocations(), 1);

        unsafe { free(out.cast()) };
        assert!(unsafe { echo(ptr::null_mut()) }.is_null());
    }

    #[test]
    fn test_to_upper_in_place() {
        let msg = host_c_string("hello, World 123!");

        let out = unsafe { to_upper(msg) };
        assert_eq!(out, msg);
        assert_eq!(unsafe { CStr::from_ptr(out) }.to_bytes(), b"HELLO, WORLD 123!");

        // 所有权不变，host 自己释放
        assert_eq!(live_allocations(), 1);
        unsafe { free(msg.cast()) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_to_upper_empty_and_null() {
        let empty = host_c_string("");
        assert!(unsafe { to_upper(empty) }.is_null());
        assert_eq!(live_allocations(), 1);
        unsafe { free(empty.cast()) };

        assert!(unsafe { to_upper(ptr::null_mut()) }.is_null());
    }

    #[test]
    fn test_guest_echo_writes_result() {
        let host = RecordingHost::new();
        let mut input = OwnedBuffer::from_slice(b"component").unwrap().into_guest_string();
        let mut ret = GuestString::EMPTY;

        unsafe { guest_echo(&host, &mut input, &mut ret) };

        assert_eq!(input, GuestString::EMPTY);
        assert_eq!(unsafe { slice::from_raw_parts(ret.ptr, ret.len) }, b"component");
        assert_eq!(live_allocations(), 1);

        unsafe { free_guest_string(&mut ret) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_guest_echo_without_return_slot() {
        let host = RecordingHost::new();
        let mut input = OwnedBuffer::from_slice(b"dropped").unwrap().into_guest_string();

        unsafe { guest_echo(&host, &mut input, ptr::null_mut()) };
        assert_eq!(live_allocations(), 0);
    }
}
