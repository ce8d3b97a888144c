//! 看门狗任务
//!
//! 在一个窗口 (最慢签到周期 + 裕量) 内等待生产者和消费者都签到，
//! 然后根据观察到的签到位给出健康报告。只上报，不做任何恢复动作，
//! 也永远不会让系统停机。

use embassy_time::Duration;

use super::PipelineResources;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Stall};
use crate::sync::checkin::{ALL_BITS, CONSUMER_BIT, PRODUCER_BIT};
use crate::util::log::*;

/// 每隔多少次检查输出一次统计
const STATS_EVERY: u64 = 10;

/// 健康报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub enum HealthReport {
    /// 两个任务都在窗口内签到
    Healthy,
    /// 只有生产者签到
    ConsumerStalled,
    /// 只有消费者签到
    ProducerStalled,
    /// 都未签到
    BothStalled,
}

impl HealthReport {
    /// 根据窗口结束时的签到位评估
    pub fn from_bits(bits: u32) -> Self {
        match (bits & PRODUCER_BIT != 0, bits & CONSUMER_BIT != 0) {
            (true, true) => Self::Healthy,
            (true, false) => Self::ConsumerStalled,
            (false, true) => Self::ProducerStalled,
            (false, false) => Self::BothStalled,
        }
    }

    /// 是否健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// 停止签到的任务
    pub fn stall(&self) -> Option<Stall> {
        match self {
            Self::Healthy => None,
            Self::ConsumerStalled => Some(Stall::Consumer),
            Self::ProducerStalled => Some(Stall::Producer),
            Self::BothStalled => Some(Stall::Both),
        }
    }

    /// 转换为错误形式，便于统一上报
    pub fn into_result(self) -> Result<(), PipelineError> {
        match self.stall() {
            None => Ok(()),
            Some(stall) => Err(PipelineError::LivenessTimeout(stall)),
        }
    }
}

/// 活性监视器
pub struct LivenessMonitor<'a> {
    resources: &'a PipelineResources,
    timeout: Duration,
    last: Option<HealthReport>,
    checks: u64,
    stalls: u64,
}

impl<'a> LivenessMonitor<'a> {
    /// 创建监视器
    pub fn new(resources: &'a PipelineResources, config: &PipelineConfig) -> Self {
        Self {
            resources,
            timeout: config.checkin_timeout,
            last: None,
            checks: 0,
            stalls: 0,
        }
    }

    /// 一次完整的等待 + 评估
    ///
    /// 两个签到位都到齐时提前返回，否则在超时后返回
    pub async fn check(&mut self) -> HealthReport {
        let bits = self.resources.checkin.wait_all(ALL_BITS, self.timeout).await;
        let report = HealthReport::from_bits(bits);

        self.checks += 1;
        if !report.is_healthy() {
            self.stalls += 1;
        }
        self.last = Some(report);
        report
    }

    /// 最近一次报告
    pub fn last_report(&self) -> Option<HealthReport> {
        self.last
    }

    /// 已完成的检查次数
    pub fn checks(&self) -> u64 {
        self.checks
    }

    /// 不健康的检查次数
    pub fn stalls(&self) -> u64 {
        self.stalls
    }

    /// 主循环，永不返回
    pub async fn run(&mut self) -> ! {
        log_info!(
            "Watchdog task started (timeout {}ms)",
            self.timeout.as_millis()
        );

        loop {
            let report = self.check().await;

            match report.into_result() {
                Ok(()) => log_trace!("Watchdog: all good"),
                Err(e) => log_warn!("Watchdog: {}", e),
            }

            if self.checks % STATS_EVERY == 0 {
                log_info!(
                    "Watchdog: {} checks, {} stalls, {} averages sent, {} dropped",
                    self.checks,
                    self.stalls,
                    self.resources.handoff.sent(),
                    self.resources.handoff.rejected()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    fn short_config() -> PipelineConfig {
        PipelineConfig::default().with_checkin_timeout(Duration::from_millis(10))
    }

    #[test]
    fn test_report_from_bits() {
        assert_eq!(HealthReport::from_bits(ALL_BITS), HealthReport::Healthy);
        assert_eq!(HealthReport::from_bits(PRODUCER_BIT), HealthReport::ConsumerStalled);
        assert_eq!(HealthReport::from_bits(CONSUMER_BIT), HealthReport::ProducerStalled);
        assert_eq!(HealthReport::from_bits(0), HealthReport::BothStalled);
    }

    #[test]
    fn test_report_into_result() {
        assert_eq!(HealthReport::Healthy.into_result(), Ok(()));
        assert_eq!(
            HealthReport::ConsumerStalled.into_result(),
            Err(PipelineError::LivenessTimeout(Stall::Consumer))
        );
        assert_eq!(
            HealthReport::BothStalled.into_result(),
            Err(PipelineError::LivenessTimeout(Stall::Both))
        );
    }

    #[test]
    fn test_healthy_when_both_check_in() {
        let resources = PipelineResources::new();
        let mut monitor = LivenessMonitor::new(&resources, &short_config());

        resources.checkin.checkin_producer();
        resources.checkin.checkin_consumer();
        assert_eq!(block_on(monitor.check()), HealthReport::Healthy);
        assert_eq!(monitor.stalls(), 0);

        // 位已被清除，下个窗口无人签到
        assert_eq!(block_on(monitor.check()), HealthReport::BothStalled);
        assert_eq!(monitor.stalls(), 1);
    }

    #[test]
    fn test_consumer_not_working() {
        let resources = PipelineResources::new();
        let mut monitor = LivenessMonitor::new(&resources, &short_config());

        resources.checkin.checkin_producer();
        assert_eq!(block_on(monitor.check()), HealthReport::ConsumerStalled);
        assert_eq!(monitor.last_report(), Some(HealthReport::ConsumerStalled));
    }

    #[test]
    fn test_producer_not_working() {
        let resources = PipelineResources::new();
        let mut monitor = LivenessMonitor::new(&resources, &short_config());

        resources.checkin.checkin_consumer();
        assert_eq!(block_on(monitor.check()), HealthReport::ProducerStalled);
    }

    #[test]
    fn test_neither_reports_both() {
        let resources = PipelineResources::new();
        let mut monitor = LivenessMonitor::new(&resources, &short_config());

        assert_eq!(block_on(monitor.check()), HealthReport::BothStalled);
        assert_eq!(monitor.checks(), 1);
        assert_eq!(monitor.stalls(), 1);
    }
}
