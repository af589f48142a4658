//! 直接按 Rust 调用约定写的样例：只有标量参数，输出走 `host_print!`

use samples_guest_sdk::{host_print, Host};

/// `hello_world`
pub fn hello_world<H: Host>(host: &H) -> i32 {
    host_print!(host, "Hello from Wasm in Hyperlight!\n");
    0
}

/// `add`
pub fn add(left: usize, right: usize) -> usize {
    left.wrapping_add(right)
}

/// `call_host_function`: 转发给 host 的 `TestHostFunc`
pub fn call_host_function<H: Host>(host: &H, a: i32) -> i32 {
    host.test_host_func(a)
}

/// `simd_test`: 用 wasm SIMD 计算 `100 + 50`，返回第 0 个 lane
#[cfg(target_arch = "wasm32")]
pub fn simd_test() -> i32 {
    use std::arch::wasm32::{i32x4_add, i32x4_extract_lane, i32x4_splat};

    let sum = i32x4_add(i32x4_splat(100), i32x4_splat(50));
    i32x4_extract_lane::<0>(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use samples_guest_sdk::testing::RecordingHost;

    #[test]
    fn test_hello_world() {
        let host = RecordingHost::new();
        assert_eq!(hello_world(&host), 0);
        assert_eq!(host.output(), "Hello from Wasm in Hyperlight!\n");
    }

    #[test]
    fn test_add() {
        assert_eq!(add(2, 2), 4);
        assert_eq!(add(usize::MAX, 1), 0);
    }

    #[test]
    fn test_call_host_function() {
        let host = RecordingHost::new();
        assert_eq!(call_host_function(&host, 5), 6);
    }
}
