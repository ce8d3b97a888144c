//! 消费者任务
//!
//! 阻塞等待交接槽中的平均值，每收到一个就追加一条记录；
//! 按时间间隔 (而不是每条记录) 刷盘，用少量写放大换取有界的掉电丢失窗口。
//! 存储失败只丢弃当前记录并上报，任务继续运行。

use super::PipelineResources;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::fs::LogSink;
use crate::record::{LogRecord, TickCount, TickSource};
use crate::sync::{CheckinState, HandoffChannel};
use crate::util::log::*;

/// 消费者
pub struct Consumer<'a, W, C> {
    sink: W,
    clock: C,
    handoff: &'a HandoffChannel,
    checkin: &'a CheckinState,
    flush_interval: u64,
    last_flush: TickCount,
    appended: u64,
    dropped: u64,
}

impl<'a, W: LogSink, C: TickSource> Consumer<'a, W, C> {
    /// 创建消费者
    pub fn new(
        sink: W,
        clock: C,
        resources: &'a PipelineResources,
        config: &PipelineConfig,
    ) -> Self {
        let last_flush = clock.now();
        Self {
            sink,
            clock,
            handoff: &resources.handoff,
            checkin: &resources.checkin,
            flush_interval: config.flush_interval_ticks,
            last_flush,
            appended: 0,
            dropped: 0,
        }
    }

    /// 处理一个平均值
    ///
    /// 等待交接槽 (唯一的挂起点)，追加记录，到期则刷盘，最后签到。
    /// 追加失败时记录被丢弃并返回 `Err`；刷盘失败同样返回 `Err`，
    /// 两者同时失败时刷盘错误只写日志。
    pub async fn step(&mut self) -> Result<LogRecord, PipelineError> {
        let value = self.handoff.recv().await;
        let record = LogRecord::new(self.clock.now(), value);
        log_debug!("Average: {}", value);

        let appended = self.sink.append(record.to_line().as_bytes());
        match appended {
            Ok(()) => self.appended += 1,
            Err(_) => self.dropped += 1,
        }

        let flushed = self.flush_if_due(record.timestamp);

        self.checkin.checkin_consumer();

        if let (Err(_), Err(e)) = (&appended, &flushed) {
            log_warn!("Consumer: flush failed: {}", e);
        }
        appended?;
        flushed?;
        Ok(record)
    }

    /// 距上次刷盘超过间隔时刷盘
    fn flush_if_due(&mut self, now: TickCount) -> Result<(), PipelineError> {
        if now.saturating_sub(self.last_flush) < self.flush_interval {
            return Ok(());
        }

        // 失败也推进时间，下一个间隔再重试
        self.last_flush = now;
        self.sink.flush()?;
        Ok(())
    }

    /// 立即刷盘
    pub fn flush(&mut self) -> Result<(), PipelineError> {
        self.last_flush = self.clock.now();
        self.sink.flush()?;
        Ok(())
    }

    /// 成功追加的记录数
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// 因存储失败丢弃的记录数
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// 底层存储
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// 底层存储 (可变)
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// 主循环，永不返回
    pub async fn run(&mut self) -> ! {
        log_info!(
            "Consumer task started (flush every {} ticks)",
            self.flush_interval
        );

        loop {
            if let Err(e) = self.step().await {
                log_warn!("Consumer: {}", e);
            }
        }
    }
}
