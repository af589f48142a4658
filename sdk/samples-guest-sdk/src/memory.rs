//! Guest 内存管理
//!
//! 每次分配前面都带一个 8 字节的隐藏头，记录可用容量。这样 `free` 只需要指针，
//! guest 也能在接管 host 传来的 buffer 时知道它的边界。
//!
//! 所有权约定：
//! - [`OwnedBuffer`] / [`OwnedCStr`] 持有一次分配，drop 时释放且只释放一次
//! - `into_raw` 把所有权转交给 host，不释放
//! - host 借给 guest 的数据只以 `&[u8]` / `&CStr` 的形式出现，生命周期不超过一次调用

use std::alloc::{self, Layout};
use std::ffi::CStr;
use std::ops::{Deref, DerefMut};
use std::os::raw::c_char;
use std::ptr::{self, NonNull};
use std::{mem, slice};

use samples_types::{encode_header, GuestString, LENGTH_PREFIX_SIZE};

use crate::{GuestError, Result};

const HEADER_SIZE: usize = 8;
const ALIGN: usize = 8;

#[cfg(any(test, feature = "testing"))]
thread_local! {
    static LIVE_ALLOCATIONS: std::cell::Cell<isize> = const { std::cell::Cell::new(0) };
}

/// 当前线程上尚未释放的分配数量
#[cfg(any(test, feature = "testing"))]
pub fn live_allocations() -> isize {
    LIVE_ALLOCATIONS.with(|c| c.get())
}

#[cfg(any(test, feature = "testing"))]
fn track(delta: isize) {
    LIVE_ALLOCATIONS.with(|c| c.set(c.get() + delta));
}

#[cfg(not(any(test, feature = "testing")))]
fn track(_delta: isize) {}

fn layout_for(capacity: usize) -> Result<Layout> {
    let total = capacity
        .checked_add(HEADER_SIZE)
        .ok_or(GuestError::AllocationFailed { size: capacity })?;
    Layout::from_size_align(total, ALIGN)
        .map_err(|_| GuestError::AllocationFailed { size: capacity })
}

/// 分配 `capacity` 字节（已清零），返回指向可用区域的指针
pub fn allocate(capacity: usize) -> Result<NonNull<u8>> {
    let layout = layout_for(capacity)?;
    // SAFETY: layout 包含头部，大小不为 0
    let base = unsafe { alloc::alloc_zeroed(layout) };
    let base = NonNull::new(base).ok_or(GuestError::AllocationFailed { size: capacity })?;
    track(1);
    // SAFETY: base 按 ALIGN 对齐，长度至少 HEADER_SIZE
    unsafe {
        base.as_ptr().cast::<usize>().write(capacity);
        Ok(NonNull::new_unchecked(base.as_ptr().add(HEADER_SIZE)))
    }
}

/// 读取一次分配的容量
///
/// # Safety
///
/// `ptr` 必须来自 [`allocate`]（或导出的 `malloc`）且尚未释放。
pub unsafe fn capacity_of(ptr: NonNull<u8>) -> usize {
    ptr.as_ptr().sub(HEADER_SIZE).cast::<usize>().read()
}

/// 释放一次分配。空指针什么也不做。
///
/// # Safety
///
/// `ptr` 为空，或者来自 [`allocate`] 且尚未释放。调用后不得再使用 `ptr`。
pub unsafe fn release(ptr: *mut u8) {
    let Some(ptr) = NonNull::new(ptr) else {
        return;
    };
    let capacity = capacity_of(ptr);
    let base = ptr.as_ptr().sub(HEADER_SIZE);
    // SAFETY: 分配时已校验过同一个 layout
    let layout = Layout::from_size_align_unchecked(capacity + HEADER_SIZE, ALIGN);
    alloc::dealloc(base, layout);
    track(-1);
}

/// 导出 `malloc` 的实现：负数或分配失败返回空指针
pub fn malloc(size: i32) -> *mut u8 {
    let Ok(size) = usize::try_from(size) else {
        return ptr::null_mut();
    };
    allocate(size).map_or(ptr::null_mut(), NonNull::as_ptr)
}

/// 导出 `free` 的实现
///
/// # Safety
///
/// 同 [`release`]。
pub unsafe fn free(ptr: *mut u8) {
    release(ptr)
}

/// 一块由 guest 持有的 buffer
///
/// `len` 是逻辑长度，不超过分配时的容量。
#[derive(Debug)]
pub struct OwnedBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl OwnedBuffer {
    /// 分配 `len` 字节的清零 buffer
    pub fn allocate(len: usize) -> Result<Self> {
        let ptr = allocate(len)?;
        Ok(Self { ptr, len })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut buf = Self::allocate(bytes.len())?;
        buf.copy_from_slice(bytes);
        Ok(buf)
    }

    /// 分配 `payload.len() + 4` 字节，写入长度头和 payload
    pub fn length_prefixed(payload: &[u8]) -> Result<Self> {
        let header = encode_header(payload.len())?;
        let mut buf = Self::allocate(LENGTH_PREFIX_SIZE + payload.len())?;
        buf[..LENGTH_PREFIX_SIZE].copy_from_slice(&header);
        buf[LENGTH_PREFIX_SIZE..].copy_from_slice(payload);
        Ok(buf)
    }

    /// 接管 host 通过 `malloc` 分配的 buffer，逻辑长度等于容量
    ///
    /// # Safety
    ///
    /// `ptr` 必须来自导出的 `malloc` 且尚未释放，调用方之后不得再使用它。
    pub unsafe fn from_raw(ptr: *mut u8) -> Result<Self> {
        let ptr = NonNull::new(ptr).ok_or(GuestError::NullPointer)?;
        let len = capacity_of(ptr);
        Ok(Self { ptr, len })
    }

    /// 按调用方给出的 wasm 长度截断。长度非法时 buffer 随错误一起被释放。
    pub fn with_wasm_len(mut self, length: i32) -> Result<Self> {
        let capacity = self.capacity();
        match usize::try_from(length) {
            Ok(len) if len <= capacity => {
                self.len = len;
                Ok(self)
            }
            _ => Err(GuestError::InvalidLength { length, capacity }),
        }
    }

    pub fn capacity(&self) -> usize {
        // SAFETY: self.ptr 是 self 持有的有效分配
        unsafe { capacity_of(self.ptr) }
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// 把所有权转交给调用方，不释放
    pub fn into_raw(self) -> *mut u8 {
        let ptr = self.ptr.as_ptr();
        mem::forget(self);
        ptr
    }

    /// 转成描述符交给调用方，之后由 `guest_string_free` 释放
    pub fn into_guest_string(self) -> GuestString {
        let len = self.len;
        GuestString {
            ptr: self.into_raw(),
            len,
        }
    }
}

impl Deref for OwnedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: 分配的内存已清零，且 len <= capacity
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for OwnedBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: 同上，且 self 是唯一所有者
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for OwnedBuffer {
    fn drop(&mut self) {
        // SAFETY: self 持有这块分配，只会 drop 一次
        unsafe { release(self.ptr.as_ptr()) }
    }
}

/// 由 guest 持有的 NUL 结尾字符串
#[derive(Debug)]
pub struct OwnedCStr {
    buf: OwnedBuffer,
    /// 不含 NUL 的字节数
    len: usize,
}

impl OwnedCStr {
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if let Some(position) = bytes.iter().position(|&b| b == 0) {
            return Err(GuestError::InteriorNul { position });
        }
        let mut buf = OwnedBuffer::allocate(bytes.len() + 1)?;
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            buf,
            len: bytes.len(),
        })
    }

    /// 接管 host 传来的字符串。NUL 只在分配容量内查找。
    ///
    /// # Safety
    ///
    /// 同 [`OwnedBuffer::from_raw`]。
    pub unsafe fn from_raw(ptr: *mut c_char) -> Result<Self> {
        let buf = OwnedBuffer::from_raw(ptr.cast())?;
        let len = buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(GuestError::MissingTerminator {
                capacity: buf.capacity(),
            })?;
        Ok(Self { buf, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// 可变视图，不包含结尾的 NUL
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    /// 到第一个 NUL 为止的 C 字符串视图
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.buf[..=self.len]).unwrap_or_default()
    }

    pub fn into_raw(self) -> *mut c_char {
        self.buf.into_raw().cast()
    }
}

/// 借用一个 NUL 结尾字符串的可变视图（不含 NUL）
///
/// # Safety
///
/// `ptr` 为空，或者指向一个在返回的生命周期内有效、且没有其他引用的 NUL 结尾字符串。
pub unsafe fn c_str_bytes_mut<'a>(ptr: *mut c_char) -> Option<&'a mut [u8]> {
    if ptr.is_null() {
        return None;
    }
    let len = CStr::from_ptr(ptr).to_bytes().len();
    Some(slice::from_raw_parts_mut(ptr.cast::<u8>(), len))
}

/// 借用一个 host 传来的 NUL 结尾字符串
///
/// # Safety
///
/// `ptr` 为空，或者指向一个在返回的生命周期内有效的 NUL 结尾字符串。
pub unsafe fn borrow_c_str<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    (!ptr.is_null()).then(|| CStr::from_ptr(ptr))
}
