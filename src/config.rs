//! 流水线配置
//!
//! 任务周期、平均窗口、看门狗超时和刷盘间隔均为编译期常量，
//! `PipelineConfig` 允许在构造任务时覆盖它们 (主要用于测试和板级调优)。

use embassy_time::Duration;

// ===== 时基 =====

/// 1 tick 对应的毫秒数
pub const TICK_MS: u64 = 1;

/// 生产者采样周期 (tick)
pub const SAMPLE_PERIOD_TICKS: u64 = 1;

// ===== 生产者 =====

/// 每个平均值包含的采样数
pub const WINDOW_SIZE: usize = 100;

// ===== 看门狗 =====

/// 看门狗等待窗口 (tick)
///
/// 最慢的签到者 (消费者) 每 100 tick 签到一次，再加上裕量
pub const CHECKIN_TIMEOUT_TICKS: u64 = 1000;

// ===== 消费者 =====

/// 两次 flush 之间的最小间隔 (tick)
pub const FLUSH_INTERVAL_TICKS: u64 = 1000;

/// 单条日志记录的最大字节数
///
/// `"18446744073709551615, -2147483648\n"` 为 34 字节
pub const RECORD_MAX_LEN: usize = 40;

// ===== 存储 =====

/// 日志 RAM 缓冲区大小 (字节)
pub const LOG_BUFFER_SIZE: usize = 256;

/// 日志分区在 Flash 中的偏移
pub const LOG_PARTITION_OFFSET: u32 = 0x410000;

/// 日志分区大小 (1MB)
pub const LOG_PARTITION_SIZE: u32 = 0x100000;

/// 将 tick 数转换为 Embassy 时长
#[inline]
pub const fn ticks(n: u64) -> Duration {
    Duration::from_millis(n * TICK_MS)
}

/// 流水线运行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 生产者采样周期
    pub sample_period: Duration,
    /// 平均窗口大小
    pub window_size: usize,
    /// 看门狗等待窗口
    pub checkin_timeout: Duration,
    /// 刷盘间隔 (tick)
    pub flush_interval_ticks: u64,
}

impl PipelineConfig {
    /// 使用编译期默认值创建
    pub const fn new() -> Self {
        Self {
            sample_period: ticks(SAMPLE_PERIOD_TICKS),
            window_size: WINDOW_SIZE,
            checkin_timeout: ticks(CHECKIN_TIMEOUT_TICKS),
            flush_interval_ticks: FLUSH_INTERVAL_TICKS,
        }
    }

    /// 设置采样周期
    pub const fn with_sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period;
        self
    }

    /// 设置平均窗口 (至少为 1)
    pub const fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = if window_size == 0 { 1 } else { window_size };
        self
    }

    /// 设置看门狗等待窗口
    pub const fn with_checkin_timeout(mut self, timeout: Duration) -> Self {
        self.checkin_timeout = timeout;
        self
    }

    /// 设置刷盘间隔
    pub const fn with_flush_interval(mut self, ticks: u64) -> Self {
        self.flush_interval_ticks = ticks;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_period, Duration::from_millis(1));
        assert_eq!(config.window_size, 100);
        assert_eq!(config.checkin_timeout, Duration::from_millis(1000));
        assert_eq!(config.flush_interval_ticks, 1000);
    }

    #[test]
    fn test_zero_window_clamped() {
        let config = PipelineConfig::new().with_window_size(0);
        assert_eq!(config.window_size, 1);
    }
}
