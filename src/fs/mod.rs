//! 日志存储模块
//!
//! 消费者通过 `LogSink` 追加记录，特性：
//! - 追加与刷盘分离，刷盘间隔由调用方决定
//! - 基于 embedded-storage NOR Flash 接口的只追加日志
//! - 重启后从已有日志末尾继续追加

pub mod flash_log;
pub mod storage;

pub use flash_log::FlashLog;
pub use storage::{FlashLogConfig, LogSink, StorageError};
