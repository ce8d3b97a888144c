//! 日志记录与时间戳
//!
//! 每条记录序列化为一行 `"<tick_count>, <average_value>\n"`，
//! 无表头、无轮转，只追加。

use core::fmt::{self, Write};

use embassy_time::Instant;
use heapless::String;

use crate::config::{RECORD_MAX_LEN, TICK_MS};
use crate::sensor::SampleValue;

/// 自启动以来的 tick 数
pub type TickCount = u64;

/// tick 时间源
pub trait TickSource {
    /// 当前 tick 数
    fn now(&self) -> TickCount;
}

/// 基于 Embassy 时间驱动的系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TickSource for SystemClock {
    #[inline]
    fn now(&self) -> TickCount {
        Instant::now().as_millis() / TICK_MS
    }
}

impl<T: TickSource + ?Sized> TickSource for &T {
    #[inline]
    fn now(&self) -> TickCount {
        (**self).now()
    }
}

/// 一条持久化记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub struct LogRecord {
    /// 消费者收到平均值时的 tick 数
    pub timestamp: TickCount,
    /// 平均值
    pub value: SampleValue,
}

impl LogRecord {
    /// 创建记录
    pub const fn new(timestamp: TickCount, value: SampleValue) -> Self {
        Self { timestamp, value }
    }

    /// 序列化为一行文本
    pub fn to_line(&self) -> String<RECORD_MAX_LEN> {
        let mut line = String::new();
        // 最长的 u64/i32 组合也放得下，写入不会失败
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}, {}", self.timestamp, self.value)
    }
}
