//! Guest 日志行的级别前缀
//!
//! Guest 只有一个 `HostPrint` 出口，所以级别编码在行首：`[WARN] message`。
//! Host 侧再把前缀解析回来，映射到自己的日志系统。

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// 解析行首的 `[LEVEL] `，返回级别和剩余内容。没有前缀时返回 `None`。
    pub fn parse_line(line: &str) -> Option<(LogLevel, &str)> {
        let rest = line.strip_prefix('[')?;
        let (tag, msg) = rest.split_once("] ")?;
        let level = Self::ALL.into_iter().find(|l| l.as_str() == tag)?;
        Some((level, msg))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_roundtrip() {
        let line = format!("{}counter wrapped", LogLevel::Warn);
        assert_eq!(line, "[WARN] counter wrapped");
        assert_eq!(
            LogLevel::parse_line(&line),
            Some((LogLevel::Warn, "counter wrapped"))
        );
    }

    #[test]
    fn test_plain_line_has_no_level() {
        assert_eq!(LogLevel::parse_line("Hello World from Wasm!\n"), None);
        assert_eq!(LogLevel::parse_line("[NOTICE] something"), None);
        assert_eq!(LogLevel::parse_line("[INFO]missing space"), None);
    }
}
