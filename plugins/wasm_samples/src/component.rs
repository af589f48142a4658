//! 描述符调用约定下的字符串 echo
//!
//! 参数和返回值都是 `{ptr, len}` 描述符。函数复制输入、通过
//! `guest_string_free` 的约定释放输入描述符，并把新分配的描述符交给调用方。

use samples_guest_sdk::descriptor::{free_guest_string, guest_string_bytes};
use samples_guest_sdk::{error, GuestString, Host, OwnedBuffer};

/// `guest_echo` 的实现
///
/// 分配失败时返回空描述符并打印错误。无论成功与否，输入描述符都会被释放并重置。
///
/// # Safety
///
/// `msg` 为空，或者指向一个有效描述符，其数据来自 guest 分配器且由调用方转交。
pub unsafe fn guest_echo<H: Host>(host: &H, msg: *mut GuestString) -> GuestString {
    let out = match msg.as_ref() {
        Some(desc) => match OwnedBuffer::from_slice(guest_string_bytes(desc)) {
            Ok(copy) => copy.into_guest_string(),
            Err(e) => {
                error!(host, "guest_echo: {}", e);
                GuestString::EMPTY
            }
        },
        None => GuestString::EMPTY,
    };
    free_guest_string(msg);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use samples_guest_sdk::memory::live_allocations;
    use samples_guest_sdk::testing::RecordingHost;

    #[test]
    fn test_guest_echo_copies_and_frees_input() {
        let host = RecordingHost::new();
        let mut input = OwnedBuffer::from_slice(b"Hello from component")
            .unwrap()
            .into_guest_string();
        let input_ptr = input.ptr;

        let mut out = unsafe { guest_echo(&host, &mut input) };

        assert_eq!(input, GuestString::EMPTY);
        assert_ne!(out.ptr, input_ptr);
        assert_eq!(unsafe { guest_string_bytes(&out) }, b"Hello from component");
        assert_eq!(live_allocations(), 1);

        unsafe { free_guest_string(&mut out) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_guest_echo_empty_string() {
        let host = RecordingHost::new();
        let mut input = OwnedBuffer::allocate(0).unwrap().into_guest_string();

        let mut out = unsafe { guest_echo(&host, &mut input) };
        assert_eq!(out.len, 0);
        assert!(unsafe { guest_string_bytes(&out) }.is_empty());

        unsafe { free_guest_string(&mut out) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_guest_echo_null_descriptor() {
        let host = RecordingHost::new();
        let out = unsafe { guest_echo(&host, std::ptr::null_mut()) };
        assert_eq!(out, GuestString::EMPTY);
    }
}
