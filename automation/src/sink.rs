use std::fmt;
use std::sync::Mutex;

/// 日志级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Success,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        };
        f.write_str(tag)
    }
}

/// 日志接收端，由宿主注入。
///
/// 引擎只往接口里写，不关心展示方式，宿主可以接到控制台、UI 或缓存。
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// 输出到标准输出的默认实现。
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{level}] {message}");
    }
}

/// 缓存全部日志的实现，供嵌入方展示或测试断言。
#[derive(Default)]
#[allow(dead_code)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

#[allow(dead_code)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// 是否存在包含 `needle` 的日志行。
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::{LogLevel, LogSink, MemorySink};

    #[test]
    fn memory_sink_keeps_order_and_level() {
        let sink = MemorySink::new();
        sink.log(LogLevel::Info, "第一条");
        sink.log(LogLevel::Error, "第二条");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (LogLevel::Info, "第一条".to_string()));
        assert_eq!(entries[1].0, LogLevel::Error);
        assert!(sink.contains("第二条"));
    }
}
