//! 描述符形式的字符串 (pointer + length) 的借用与释放

use std::slice;

use samples_types::GuestString;

use crate::memory;

/// 借用描述符指向的数据。空描述符得到空切片。
///
/// # Safety
///
/// 非空时 `desc.ptr` 必须指向至少 `desc.len` 个有效字节，并在 `desc` 被借用期间保持有效。
pub unsafe fn guest_string_bytes(desc: &GuestString) -> &[u8] {
    if desc.is_empty() {
        return &[];
    }
    slice::from_raw_parts(desc.ptr, desc.len)
}

/// 释放描述符持有的数据，并把描述符重置为 `{null, 0}`
///
/// # Safety
///
/// `desc` 为空，或者指向一个有效描述符；其 `ptr` 为空或来自 guest 分配器且尚未释放。
pub unsafe fn free_guest_string(desc: *mut GuestString) {
    let Some(desc) = desc.as_mut() else {
        return;
    };
    memory::release(desc.ptr);
    *desc = GuestString::EMPTY;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::live_allocations;
    use crate::OwnedBuffer;

    #[test]
    fn test_free_resets_descriptor() {
        let mut desc = OwnedBuffer::from_slice(b"hello").unwrap().into_guest_string();
        assert_eq!(unsafe { guest_string_bytes(&desc) }, b"hello");

        unsafe { free_guest_string(&mut desc) };
        assert_eq!(desc, GuestString::EMPTY);
        assert_eq!(live_allocations(), 0);

        // 第二次释放是空操作
        unsafe { free_guest_string(&mut desc) };
        assert_eq!(live_allocations(), 0);
    }

    #[test]
    fn test_empty_descriptor_bytes() {
        assert!(unsafe { guest_string_bytes(&GuestString::EMPTY) }.is_empty());
        unsafe { free_guest_string(std::ptr::null_mut()) };
    }
}
