//! Guest 线性内存读写
//!
//! wasm 线性内存是小端的；guest 指针和长度在 wasm32 上都是 i32。

use anyhow::{anyhow, bail, Context, Result};
use samples_types::{WasmStringDescriptor, LENGTH_PREFIX_SIZE};
use wasmtime::{AsContext, AsContextMut, Memory, TypedFunc};

fn offset(ptr: i32) -> Result<usize> {
    usize::try_from(ptr).map_err(|_| anyhow!("Negative guest pointer: {}", ptr))
}

/// 读取 `ptr` 处的 `len` 个字节
pub fn read_bytes(memory: &Memory, store: impl AsContext, ptr: i32, len: i32) -> Result<Vec<u8>> {
    let start = offset(ptr)?;
    let len = usize::try_from(len).map_err(|_| anyhow!("Negative length: {}", len))?;
    let mut buf = vec![0u8; len];
    memory
        .read(&store, start, &mut buf)
        .with_context(|| format!("Pointer/Length out of bounds: ptr={}, len={}", ptr, len))?;
    Ok(buf)
}

/// 读取 `ptr` 处以 NUL 结尾的字符串，最多保留 `max_len` 个字节
pub fn read_c_string(
    memory: &Memory,
    store: impl AsContext,
    ptr: i32,
    max_len: usize,
) -> Result<Vec<u8>> {
    let start = offset(ptr)?;
    let data = memory.data(&store);
    let tail = data
        .get(start..)
        .ok_or_else(|| anyhow!("Pointer out of bounds: ptr={}, memory_size={}", ptr, data.len()))?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| anyhow!("Unterminated string at ptr={}", ptr))?;
    Ok(tail[..end.min(max_len)].to_vec())
}

/// 读取 `ptr` 处带长度前缀的 buffer，返回数据部分
pub fn read_length_prefixed(memory: &Memory, store: impl AsContext, ptr: i32) -> Result<Vec<u8>> {
    let header = read_bytes(memory, &store, ptr, LENGTH_PREFIX_SIZE as i32)?;
    let mut raw = [0u8; LENGTH_PREFIX_SIZE];
    raw.copy_from_slice(&header);
    let len = i32::from_le_bytes(raw);
    if len < 0 {
        bail!("Negative length in prefix header: {}", len);
    }
    read_bytes(memory, &store, ptr + LENGTH_PREFIX_SIZE as i32, len)
}

pub fn read_descriptor(
    memory: &Memory,
    store: impl AsContext,
    ptr: i32,
) -> Result<WasmStringDescriptor> {
    let bytes = read_bytes(memory, &store, ptr, WasmStringDescriptor::SIZE as i32)?;
    let mut raw = [0u8; WasmStringDescriptor::SIZE];
    raw.copy_from_slice(&bytes);
    Ok(WasmStringDescriptor::from_le_bytes(raw))
}

/// 用 guest 的 `malloc` 分配 `bytes.len()` 个字节并写入 `bytes`。
/// 返回 guest 指针，所有权归调用方决定交给谁。
pub fn write_bytes(
    memory: &Memory,
    mut store: impl AsContextMut,
    malloc: &TypedFunc<i32, i32>,
    bytes: &[u8],
) -> Result<i32> {
    let len = i32::try_from(bytes.len()).context("Buffer too large for wasm32")?;
    let ptr = malloc.call(&mut store, len)?;
    if ptr == 0 {
        bail!("Guest malloc({}) returned null", len);
    }
    memory.write(&mut store, offset(ptr)?, bytes)?;
    Ok(ptr)
}

/// 同 [`write_bytes`]，末尾多写一个 NUL
pub fn write_c_string(
    memory: &Memory,
    store: impl AsContextMut,
    malloc: &TypedFunc<i32, i32>,
    s: &str,
) -> Result<i32> {
    if s.contains('\0') {
        bail!("String passed to guest contains an interior NUL");
    }
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    write_bytes(memory, store, malloc, &bytes)
}

pub fn write_descriptor(
    memory: &Memory,
    mut store: impl AsContextMut,
    ptr: i32,
    desc: WasmStringDescriptor,
) -> Result<()> {
    memory.write(&mut store, offset(ptr)?, &desc.to_le_bytes())?;
    Ok(())
}
