//! 结构化字符串描述符 (pointer + length)
//!
//! `guest_echo` 按这种约定收发字符串：参数和返回值都是指向描述符的指针，
//! 描述符本身只记录数据地址和长度，不带 NUL 结尾。

use std::ptr;

/// Guest 侧的字符串描述符，布局与 C 的 `{ uint8_t *ptr; size_t len; }` 一致
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestString {
    pub ptr: *mut u8,
    pub len: usize,
}

impl GuestString {
    /// `{null, 0}`，释放后的描述符就是这个状态
    pub const EMPTY: GuestString = GuestString {
        ptr: ptr::null_mut(),
        len: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }
}

impl Default for GuestString {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Host 侧看到的 wasm32 描述符：两个小端 u32
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WasmStringDescriptor {
    pub ptr: u32,
    pub len: u32,
}

impl WasmStringDescriptor {
    pub const SIZE: usize = 8;

    pub fn to_le_bytes(self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..4].copy_from_slice(&self.ptr.to_le_bytes());
        out[4..].copy_from_slice(&self.len.to_le_bytes());
        out
    }

    pub fn from_le_bytes(bytes: [u8; Self::SIZE]) -> Self {
        let [p0, p1, p2, p3, l0, l1, l2, l3] = bytes;
        Self {
            ptr: u32::from_le_bytes([p0, p1, p2, p3]),
            len: u32::from_le_bytes([l0, l1, l2, l3]),
        }
    }

    pub fn is_null(&self) -> bool {
        self.ptr == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_descriptor() {
        assert!(GuestString::default().is_empty());
        assert_eq!(GuestString::default(), GuestString::EMPTY);
    }

    #[test]
    fn test_wasm_descriptor_layout() {
        let desc = WasmStringDescriptor { ptr: 0x1000, len: 5 };
        let bytes = desc.to_le_bytes();
        assert_eq!(&bytes[..4], &[0x00, 0x10, 0x00, 0x00]);
        assert_eq!(&bytes[4..], &[0x05, 0x00, 0x00, 0x00]);
        assert_eq!(WasmStringDescriptor::from_le_bytes(bytes), desc);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_guest_descriptor_matches_wasm_size() {
        assert_eq!(std::mem::size_of::<GuestString>(), WasmStringDescriptor::SIZE);
    }
}
