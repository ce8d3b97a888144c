//! 生产者 → 消费者单槽交接通道
//!
//! 容量为 1: 任何时刻最多只有一个未读平均值。
//! 槽已占用时发送立即失败并保留旧值 (丢新保旧)，
//! 慢消费者不会因为快生产者而悄悄丢掉它尚未读取的值。

use embassy_time::{with_timeout, Duration};

use super::primitives::{AtomicCounter, CriticalChannel};
use crate::sensor::SampleValue;

/// 接收等待时长
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvTimeout {
    /// 一直等待直到有值
    Infinite,
    /// 最多等待指定时长
    After(Duration),
}

/// 单槽交接通道
///
/// 一个发送者 (生产者) 一个接收者 (消费者)
pub struct HandoffChannel {
    slot: CriticalChannel<SampleValue, 1>,
    sent: AtomicCounter,
    rejected: AtomicCounter,
}

impl HandoffChannel {
    /// 创建空通道
    pub const fn new() -> Self {
        Self {
            slot: CriticalChannel::new(),
            sent: AtomicCounter::new(),
            rejected: AtomicCounter::new(),
        }
    }

    /// 非阻塞发送
    ///
    /// # Returns
    /// - `true`: 值已放入槽中
    /// - `false`: 槽已占用，`value` 被丢弃，槽中旧值不变
    pub fn try_send(&self, value: SampleValue) -> bool {
        match self.slot.try_send(value) {
            Ok(()) => {
                self.sent.increment();
                true
            }
            Err(_) => {
                self.rejected.increment();
                false
            }
        }
    }

    /// 等待并取出槽中的值
    ///
    /// 槽中已有值时立即返回；超时返回 `None`，`Infinite` 永不返回 `None`
    pub async fn receive(&self, timeout: RecvTimeout) -> Option<SampleValue> {
        match timeout {
            RecvTimeout::Infinite => Some(self.recv().await),
            RecvTimeout::After(duration) => with_timeout(duration, self.slot.receive()).await.ok(),
        }
    }

    /// 无限期等待并取出槽中的值
    pub async fn recv(&self) -> SampleValue {
        self.slot.receive().await
    }

    /// 非阻塞取值
    pub fn try_receive(&self) -> Option<SampleValue> {
        self.slot.try_receive().ok()
    }

    /// 槽是否被占用
    pub fn is_full(&self) -> bool {
        self.slot.is_full()
    }

    /// 成功发送次数
    pub fn sent(&self) -> u64 {
        self.sent.get()
    }

    /// 因槽占用被拒绝的次数
    pub fn rejected(&self) -> u64 {
        self.rejected.get()
    }
}

impl Default for HandoffChannel {
    fn default() -> Self {
        Self::new()
    }
}
