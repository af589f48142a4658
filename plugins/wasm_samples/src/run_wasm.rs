//! Buffer 所有权样例
//!
//! | 导出 | 参数 | 所有权 |
//! |---|---|---|
//! | `ReceiveByteArray` | 接管 | 返回值交给调用方 |
//! | `WasmPrintUsingHostPrint` / `Print` / `PrintUpper` | 接管 | 调用结束前释放 |
//! | `Echo` | 接管 | 原样交还调用方 |
//! | `ToUpper` | 借用 | 原地修改 |

use std::hint::black_box;

use samples_guest_sdk::{error, host_print, info, warn, Host, OwnedBuffer, OwnedCStr};
use samples_types::limits::{BUSY_LOOP_COUNTER_LIMIT, BUSY_LOOP_FIB_INPUT};

/// `CalcFib`: 朴素递归 Fibonacci。`n <= 1` 时返回 `n`，溢出时回绕。
pub fn calc_fib(n: i32) -> i32 {
    if n <= 1 {
        return n;
    }
    calc_fib(n - 1).wrapping_add(calc_fib(n - 2))
}

/// `ReceiveByteArray`: 复制成带长度头的新 buffer
///
/// 输入 buffer 在返回前释放；失败时打印错误并返回 `None`。
pub fn receive_byte_array<H: Host>(host: &H, data: OwnedBuffer) -> Option<OwnedBuffer> {
    match OwnedBuffer::length_prefixed(&data) {
        Ok(out) => Some(out),
        Err(e) => {
            error!(host, "ReceiveByteArray: {}", e);
            None
        }
    }
}

/// `WasmPrintUsingHostPrint`: 借给 host 打印，然后释放，返回字符串长度
pub fn print_using_host_print<H: Host>(host: &H, msg: OwnedCStr) -> i32 {
    host.print(msg.as_c_str());
    i32::try_from(msg.len()).unwrap_or(i32::MAX)
}

/// `PrintHelloWorld`
pub fn print_hello_world<H: Host>(host: &H) {
    host_print!(host, "Hello World from Wasm!\n");
}

/// `Print`: 借给 host 打印，然后释放
pub fn print<H: Host>(host: &H, msg: OwnedCStr) {
    host.print(msg.as_c_str());
}

/// `Echo`: 不复制也不检查内容，所有权原样交还调用方
pub fn echo(msg: OwnedBuffer) -> OwnedBuffer {
    msg
}

/// `ToUpper`: 原地转大写（ASCII，与 locale 无关）
///
/// 从左到右逐字节访问一次。空字符串返回 `false`，对应导出函数的空指针返回值。
pub fn to_upper(msg: &mut [u8]) -> bool {
    if msg.is_empty() {
        return false;
    }
    for byte in msg.iter_mut() {
        *byte = byte.to_ascii_uppercase();
    }
    true
}

/// `PrintUpper`: 原地转大写后打印，然后释放
pub fn print_upper<H: Host>(host: &H, mut msg: OwnedCStr) {
    to_upper(msg.as_bytes_mut());
    host.print(msg.as_c_str());
}

/// 忙循环的迭代计数器，到达上限后归零
#[derive(Debug, Clone)]
pub struct IterationCounter {
    count: i32,
    limit: i32,
    wraps: u32,
}

impl IterationCounter {
    pub fn new(limit: i32) -> Self {
        Self {
            count: 0,
            limit: limit.max(1),
            wraps: 0,
        }
    }

    /// 加一；到达上限时归零并返回 `true`
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.limit {
            self.count = 0;
            self.wraps += 1;
            return true;
        }
        false
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn wraps(&self) -> u32 {
        self.wraps
    }
}

/// `KeepCPUBusy`: 反复计算 fib(10)，直到 host 时钟走过 `ms` 毫秒，返回 `ms`
///
/// 用来验证 host 在持续 CPU 负载下的时间片/中断行为。
pub fn keep_cpu_busy<H: Host>(host: &H, ms: i32) -> i32 {
    keep_cpu_busy_with_limit(host, ms, BUSY_LOOP_COUNTER_LIMIT)
}

fn keep_cpu_busy_with_limit<H: Host>(host: &H, ms: i32, counter_limit: i32) -> i32 {
    let budget_us = i64::from(ms) * 1_000;
    let start = host.time_since_boot_us();
    let mut counter = IterationCounter::new(counter_limit);

    loop {
        black_box(calc_fib(black_box(BUSY_LOOP_FIB_INPUT)));

        let elapsed = host.time_since_boot_us().saturating_sub(start);
        if elapsed >= budget_us {
            break;
        }

        if counter.tick() {
            warn!(host, "Reached int max - reset iteration counter");
        }
    }

    info!(
        host,
        "Kept CPU busy for {} ms using {} iterations of fib({}) | wraps = {}",
        ms,
        counter.count(),
        BUSY_LOOP_FIB_INPUT,
        counter.wraps()
    );
    ms
}
