//! 最简单的样例：打印并返回状态码

use std::ffi::CStr;

use samples_guest_sdk::{error, host_print, Host, OwnedBuffer};
use samples_types::limits::{SCRATCH_BUFFER_SIZE, SCRATCH_CONTENTS};

/// `Hello`: 打印一行问候，返回 0
pub fn hello<H: Host>(host: &H) -> i32 {
    host_print!(host, "Hello from Wasm in Hyperlight \n");
    0
}

/// `HelloWorld`: 打印借来的消息，再用一块临时 buffer 演示 guest 内部的分配与释放
///
/// 分配失败时返回 -1。
pub fn hello_world<H: Host>(host: &H, msg: &CStr) -> i32 {
    host_print!(host, "{}\n", msg.to_string_lossy());

    let mut buf = match OwnedBuffer::allocate(SCRATCH_BUFFER_SIZE) {
        Ok(buf) => buf,
        Err(e) => {
            error!(host, "malloc buf failed: {}", e);
            return -1;
        }
    };

    host_print!(host, "buffer address: {:p}\n", buf.as_ptr());

    let contents = SCRATCH_CONTENTS.as_bytes();
    buf[..contents.len()].copy_from_slice(contents);
    host_print!(
        host,
        "contents of buffer after snprintf: {}\n",
        String::from_utf8_lossy(&buf[..contents.len()])
    );

    0
}
