//! 生产者任务
//!
//! 每个 tick 读取一次采样源并累加，窗口满时把平均值非阻塞地放入交接槽。
//! 无论发送是否成功都会签到: 签到只表示 "任务循环还活着"，
//! 消费者积压不会被误判为生产者故障。

use embassy_time::{Duration, Ticker};

use super::PipelineResources;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::sensor::{Averager, SampleSource, SampleValue};
use crate::sync::{CheckinState, HandoffChannel};
use crate::util::log::*;

/// 生产者
pub struct Producer<'a, S> {
    source: S,
    averager: Averager,
    handoff: &'a HandoffChannel,
    checkin: &'a CheckinState,
    period: Duration,
}

impl<'a, S: SampleSource> Producer<'a, S> {
    /// 创建生产者
    pub fn new(source: S, resources: &'a PipelineResources, config: &PipelineConfig) -> Self {
        Self {
            source,
            averager: Averager::with_window(config.window_size),
            handoff: &resources.handoff,
            checkin: &resources.checkin,
            period: config.sample_period,
        }
    }

    /// 执行一个 tick 的工作 (不含休眠)
    ///
    /// # Returns
    /// - `Ok(Some(avg))`: 窗口满，平均值已放入交接槽
    /// - `Ok(None)`: 窗口未满
    /// - `Err(ChannelFull)`: 窗口满但槽已占用，平均值被丢弃
    pub fn on_tick(&mut self) -> Result<Option<SampleValue>, PipelineError> {
        let sample = self.source.read();
        self.averager.accumulate(sample);

        let outcome = match self.averager.drain_average() {
            Some(average) => {
                if self.handoff.try_send(average) {
                    Ok(Some(average))
                } else {
                    Err(PipelineError::ChannelFull { dropped: average })
                }
            }
            None => Ok(None),
        };

        self.checkin.checkin_producer();
        outcome
    }

    /// 平均器状态
    pub fn averager(&self) -> &Averager {
        &self.averager
    }

    /// 周期循环，永不返回
    pub async fn run(&mut self) -> ! {
        log_info!(
            "Producer task started (window {}, period {}ms)",
            self.averager.window(),
            self.period.as_millis()
        );

        let mut ticker = Ticker::every(self.period);

        loop {
            match self.on_tick() {
                Ok(Some(average)) => log_trace!("Average {} queued", average),
                Ok(None) => {}
                Err(e) => log_warn!("Producer: {}", e),
            }

            ticker.next().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::checkin::{CONSUMER_BIT, PRODUCER_BIT};

    #[test]
    fn test_one_average_per_window() {
        let resources = PipelineResources::new();
        let mut producer = Producer::new(|| 42, &resources, &PipelineConfig::default());

        for _ in 0..99 {
            assert_eq!(producer.on_tick(), Ok(None));
        }
        assert_eq!(producer.on_tick(), Ok(Some(42)));
        assert_eq!(resources.handoff.sent(), 1);
        assert_eq!(resources.handoff.try_receive(), Some(42));
        assert_eq!(producer.averager().count(), 0);
    }

    #[test]
    fn test_checkin_every_tick() {
        let resources = PipelineResources::new();
        let mut producer = Producer::new(|| 1, &resources, &PipelineConfig::default());

        producer.on_tick().unwrap();
        assert_eq!(resources.checkin.take(PRODUCER_BIT), PRODUCER_BIT);

        producer.on_tick().unwrap();
        assert_eq!(resources.checkin.peek() & PRODUCER_BIT, PRODUCER_BIT);
        assert_eq!(resources.checkin.peek() & CONSUMER_BIT, 0);
    }

    #[test]
    fn test_full_slot_drops_new_average_and_still_checks_in() {
        let resources = PipelineResources::new();
        let config = PipelineConfig::default().with_window_size(2);

        let mut next = 0;
        let mut producer = Producer::new(
            || {
                next += 10;
                next
            },
            &resources,
            &config,
        );

        // 10, 20 -> 15
        producer.on_tick().unwrap();
        assert_eq!(producer.on_tick(), Ok(Some(15)));

        // 30, 40 -> 35，槽中仍是 15
        producer.on_tick().unwrap();
        resources.checkin.take(PRODUCER_BIT);
        assert_eq!(
            producer.on_tick(),
            Err(PipelineError::ChannelFull { dropped: 35 })
        );
        assert_eq!(resources.checkin.peek() & PRODUCER_BIT, PRODUCER_BIT);

        // 生产继续
        assert_eq!(resources.handoff.try_receive(), Some(15));
        producer.on_tick().unwrap();
        assert_eq!(producer.on_tick(), Ok(Some(55)));
        assert_eq!(resources.handoff.rejected(), 1);
    }
}
