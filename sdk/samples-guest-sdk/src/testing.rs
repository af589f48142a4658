//! 原生测试用的 host 实现

use std::cell::{Cell, RefCell};
use std::ffi::CStr;

use crate::Host;

/// 记录所有调用的 host
///
/// - `print` 记录文本，返回字节数
/// - `receive_buffer` 记录收到的字节，返回预设状态码
/// - 时钟从 0 开始，每读一次前进 `clock_step_us`
/// - `test_host_func` 返回 `a + 1`
#[derive(Debug)]
pub struct RecordingHost {
    prints: RefCell<Vec<String>>,
    received: RefCell<Vec<Vec<u8>>>,
    now_us: Cell<i64>,
    clock_step_us: i64,
    clock_reads: Cell<usize>,
    buffer_status: i32,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            prints: RefCell::new(Vec::new()),
            received: RefCell::new(Vec::new()),
            now_us: Cell::new(0),
            clock_step_us: 1_000,
            clock_reads: Cell::new(0),
            buffer_status: 0,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock_step(mut self, step_us: i64) -> Self {
        self.clock_step_us = step_us;
        self
    }

    pub fn with_buffer_status(mut self, status: i32) -> Self {
        self.buffer_status = status;
        self
    }

    pub fn prints(&self) -> Vec<String> {
        self.prints.borrow().clone()
    }

    /// 所有打印内容拼接在一起
    pub fn output(&self) -> String {
        self.prints.borrow().concat()
    }

    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.borrow().clone()
    }

    pub fn clock_reads(&self) -> usize {
        self.clock_reads.get()
    }

    /// 时钟下一次读数
    pub fn now_us(&self) -> i64 {
        self.now_us.get()
    }
}

impl Host for RecordingHost {
    fn print(&self, msg: &CStr) -> i32 {
        let text = msg.to_string_lossy().into_owned();
        let len = i32::try_from(text.len()).unwrap_or(i32::MAX);
        self.prints.borrow_mut().push(text);
        len
    }

    fn receive_buffer(&self, buf: &[u8]) -> i32 {
        self.received.borrow_mut().push(buf.to_vec());
        self.buffer_status
    }

    fn time_since_boot_us(&self) -> i64 {
        let now = self.now_us.get();
        self.now_us.set(now + self.clock_step_us);
        self.clock_reads.set(self.clock_reads.get() + 1);
        now
    }

    fn test_host_func(&self, a: i32) -> i32 {
        a + 1
    }
}
