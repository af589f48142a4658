//! Guest 日志功能
//!
//! 所有输出都经由 host 的 `HostPrint`。`host_print!` 原样输出，
//! 多级别日志宏在行首加 `[LEVEL] ` 前缀，由 host 映射回自己的日志级别。

use std::ffi::CString;
use std::fmt;

use crate::Host;
use samples_types::LogLevel;

/// 原样打印一段文本。遇到内嵌 NUL 时只打印 NUL 之前的部分。
pub fn print_str<H: Host + ?Sized>(host: &H, msg: &str) -> i32 {
    let head = msg.split('\0').next().unwrap_or_default();
    match CString::new(head) {
        Ok(line) => host.print(&line),
        Err(_) => -1,
    }
}

/// 打印一行带级别前缀的日志
pub fn log<H: Host + ?Sized>(host: &H, level: LogLevel, args: fmt::Arguments<'_>) -> i32 {
    print_str(host, &format!("{}{}\n", level, args))
}

/// 原样打印，相当于 guest 里的 `printf`
///
/// # 示例
/// ```ignore
/// host_print!(&host, "buffer address: {:p}\n", ptr);
/// ```
#[macro_export]
macro_rules! host_print {
    ($host:expr, $($arg:tt)*) => {
        $crate::logging::print_str($host, &format!($($arg)*))
    };
}

/// TRACE 级别日志宏
#[macro_export]
macro_rules! trace {
    ($host:expr, $($arg:tt)*) => {
        $crate::logging::log($host, $crate::LogLevel::Trace, format_args!($($arg)*))
    };
}

/// DEBUG 级别日志宏
#[macro_export]
macro_rules! debug {
    ($host:expr, $($arg:tt)*) => {
        $crate::logging::log($host, $crate::LogLevel::Debug, format_args!($($arg)*))
    };
}

/// INFO 级别日志宏
///
/// # 示例
/// ```ignore
/// info!(&host, "Kept CPU busy for {} ms", ms);
/// ```
#[macro_export]
macro_rules! info {
    ($host:expr, $($arg:tt)*) => {
        $crate::logging::log($host, $crate::LogLevel::Info, format_args!($($arg)*))
    };
}

/// WARN 级别日志宏
///
/// 用于可恢复的异常情况，例如计数器回绕
#[macro_export]
macro_rules! warn {
    ($host:expr, $($arg:tt)*) => {
        $crate::logging::log($host, $crate::LogLevel::Warn, format_args!($($arg)*))
    };
}

/// ERROR 级别日志宏
///
/// 用于导出函数边界处报告失败（分配失败、非法长度等）
#[macro_export]
macro_rules! error {
    ($host:expr, $($arg:tt)*) => {
        $crate::logging::log($host, $crate::LogLevel::Error, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use crate::testing::RecordingHost;

    #[test]
    fn test_host_print_is_verbatim() {
        let host = RecordingHost::new();
        host_print!(&host, "value={}", 42);
        assert_eq!(host.prints(), vec!["value=42".to_string()]);
    }

    #[test]
    fn test_leveled_macros_prefix_lines() {
        let host = RecordingHost::new();
        warn!(&host, "counter wrapped at {}", 7);
        error!(&host, "malloc failed");
        assert_eq!(
            host.prints(),
            vec![
                "[WARN] counter wrapped at 7\n".to_string(),
                "[ERROR] malloc failed\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_interior_nul_truncates() {
        let host = RecordingHost::new();
        super::print_str(&host, "abc\0def");
        assert_eq!(host.prints(), vec!["abc".to_string()]);
    }
}
