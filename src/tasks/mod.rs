//! 任务模块
//!
//! 固定的三任务拓扑:
//! - `producer`: 采样并求平均，放入交接槽
//! - `consumer`: 取出平均值并追加到日志
//! - `watchdog`: 检查两者是否按时签到
//!
//! 任务间共享的只有 `PipelineResources` 中的交接槽和签到位组，
//! 由调用方显式构造后以引用传给每个任务。

pub mod consumer;
pub mod producer;
pub mod watchdog;

pub use consumer::Consumer;
pub use producer::Producer;
pub use watchdog::{HealthReport, LivenessMonitor};

use crate::sync::{CheckinState, HandoffChannel};

/// 任务间共享资源
pub struct PipelineResources {
    /// 生产者 → 消费者交接槽
    pub handoff: HandoffChannel,
    /// 看门狗签到位
    pub checkin: CheckinState,
}

impl PipelineResources {
    /// 创建共享资源
    pub const fn new() -> Self {
        Self {
            handoff: HandoffChannel::new(),
            checkin: CheckinState::new(),
        }
    }
}

impl Default for PipelineResources {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use core::cell::Cell;
    use std::string::String;
    use std::vec::Vec;

    use crate::fs::{LogSink, StorageError};
    use crate::record::{TickCount, TickSource};

    /// 手动推进的时钟
    pub struct ManualClock {
        now: Cell<TickCount>,
    }

    impl ManualClock {
        pub fn new(now: TickCount) -> Self {
            Self { now: Cell::new(now) }
        }

        pub fn set(&self, now: TickCount) {
            self.now.set(now);
        }
    }

    impl TickSource for ManualClock {
        fn now(&self) -> TickCount {
            self.now.get()
        }
    }

    /// 内存日志，可注入失败
    #[derive(Default)]
    pub struct MemorySink {
        pub data: Vec<u8>,
        pub flushed_len: usize,
        pub flushes: usize,
        pub fail_next_append: bool,
        pub fail_flush: bool,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn text(&self) -> String {
            String::from_utf8_lossy(&self.data).into_owned()
        }
    }

    impl LogSink for MemorySink {
        fn append(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
            if self.fail_next_append {
                self.fail_next_append = false;
                return Err(StorageError::WriteError);
            }
            self.data.extend_from_slice(bytes);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), StorageError> {
            if self.fail_flush {
                return Err(StorageError::WriteError);
            }
            self.flushes += 1;
            self.flushed_len = self.data.len();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ManualClock, MemorySink};
    use super::*;
    use crate::config::PipelineConfig;
    use crate::record::{LogRecord, SystemClock};
    use embassy_futures::block_on;
    use embassy_futures::select::select4;
    use embassy_time::{Duration, Timer};

    #[test]
    fn test_window_of_constant_samples_end_to_end() {
        let resources = PipelineResources::new();
        let config = PipelineConfig::default();
        let clock = ManualClock::new(0);
        let mut sink = MemorySink::new();

        let mut producer = Producer::new(|| 42, &resources, &config);
        let mut consumer = Consumer::new(&mut sink, &clock, &resources, &config);
        let mut monitor = LivenessMonitor::new(&resources, &config);

        let mut sent = 0;
        for tick in 1..=100 {
            clock.set(tick);
            if let Some(average) = producer.on_tick().unwrap() {
                assert_eq!(average, 42);
                sent += 1;
            }
        }
        assert_eq!(sent, 1);
        assert_eq!(resources.handoff.sent(), 1);

        let record = block_on(consumer.step()).unwrap();
        assert_eq!(record, LogRecord::new(100, 42));
        assert_eq!(consumer.sink().text(), "100, 42\n");

        // 两者都已签到
        assert_eq!(block_on(monitor.check()), HealthReport::Healthy);
    }

    #[test]
    fn test_tasks_run_concurrently() {
        let resources = PipelineResources::new();
        let config = PipelineConfig::default();
        let mut sink = MemorySink::new();

        let mut producer = Producer::new(|| 42, &resources, &config);
        let mut consumer = Consumer::new(&mut sink, SystemClock, &resources, &config);
        let mut monitor = LivenessMonitor::new(&resources, &config);

        block_on(select4(
            producer.run(),
            consumer.run(),
            monitor.run(),
            Timer::after(Duration::from_millis(350)),
        ));

        assert!(consumer.appended() >= 1);
        for line in consumer.sink().text().lines() {
            let (_, value) = line.split_once(", ").unwrap();
            assert_eq!(value, "42");
        }

        assert!(monitor.checks() >= 1);
        assert_eq!(monitor.last_report(), Some(HealthReport::Healthy));
        assert_eq!(monitor.stalls(), 0);
    }
}
