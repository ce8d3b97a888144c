//! 签到事件位组
//!
//! 生产者和消费者每个周期各置位一次，看门狗等待两个位全部置位或超时。
//! 看门狗每次等待结束都会原子地读出并清除这两位，
//! 因此每个评估窗口只反映该窗口内的活动。

use embassy_time::{with_deadline, Duration, Instant};
use portable_atomic::{AtomicU32, Ordering};

use super::primitives::CriticalSignal;

/// 生产者签到位
pub const PRODUCER_BIT: u32 = 1 << 1;

/// 消费者签到位
pub const CONSUMER_BIT: u32 = 1 << 0;

/// 全部签到位
pub const ALL_BITS: u32 = PRODUCER_BIT | CONSUMER_BIT;

/// 签到状态
pub struct CheckinState {
    bits: AtomicU32,
    /// 有新位被置位时唤醒等待者
    changed: CriticalSignal<()>,
}

impl CheckinState {
    /// 创建全部清零的签到状态
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
            changed: CriticalSignal::new(),
        }
    }

    /// 置位
    ///
    /// 只有新置位时才唤醒等待者，重复签到不会反复唤醒看门狗
    #[inline]
    pub fn set(&self, bits: u32) {
        let prev = self.bits.fetch_or(bits, Ordering::AcqRel);
        if prev & bits != bits {
            self.changed.signal(());
        }
    }

    /// 生产者签到
    #[inline]
    pub fn checkin_producer(&self) {
        self.set(PRODUCER_BIT);
    }

    /// 消费者签到
    #[inline]
    pub fn checkin_consumer(&self) {
        self.set(CONSUMER_BIT);
    }

    /// 读取当前位 (不清除)
    #[inline]
    pub fn peek(&self) -> u32 {
        self.bits.load(Ordering::Acquire)
    }

    /// 读取并清除 `mask` 中的位
    #[inline]
    pub fn take(&self, mask: u32) -> u32 {
        self.bits.fetch_and(!mask, Ordering::AcqRel) & mask
    }

    /// 等待 `mask` 中的位全部置位，最多等待 `timeout`
    ///
    /// 返回等待结束时观察到的位 (`& mask`)，并清除它们。
    /// 返回值等于 `mask` 表示窗口内全部签到。
    pub async fn wait_all(&self, mask: u32, timeout: Duration) -> u32 {
        let deadline = Instant::now() + timeout;

        loop {
            if self.peek() & mask == mask {
                return self.take(mask);
            }

            if with_deadline(deadline, self.changed.wait()).await.is_err() {
                return self.take(mask);
            }
        }
    }
}

impl Default for CheckinState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_all_set_returns_immediately_and_clears() {
        let checkin = CheckinState::new();
        checkin.checkin_producer();
        checkin.checkin_consumer();

        let start = std::time::Instant::now();
        let bits = block_on(checkin.wait_all(ALL_BITS, Duration::from_secs(5)));
        assert_eq!(bits, ALL_BITS);
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(checkin.peek(), 0);
    }

    #[test]
    fn test_partial_set_times_out() {
        let checkin = CheckinState::new();
        checkin.checkin_producer();

        let start = std::time::Instant::now();
        let bits = block_on(checkin.wait_all(ALL_BITS, Duration::from_millis(20)));
        assert_eq!(bits, PRODUCER_BIT);
        // std 时间驱动按 tick 取整，允许 1ms 误差
        assert!(start.elapsed() >= std::time::Duration::from_millis(19));

        // 超时也会清除，下一个窗口从零开始
        assert_eq!(checkin.peek(), 0);
    }

    #[test]
    fn test_nothing_set_times_out() {
        let checkin = CheckinState::new();
        let bits = block_on(checkin.wait_all(ALL_BITS, Duration::from_millis(10)));
        assert_eq!(bits, 0);
    }

    #[test]
    fn test_wakes_when_last_bit_arrives() {
        let checkin = CheckinState::new();
        checkin.checkin_producer();

        std::thread::scope(|s| {
            s.spawn(|| {
                std::thread::sleep(std::time::Duration::from_millis(10));
                checkin.checkin_consumer();
            });

            let start = std::time::Instant::now();
            let bits = block_on(checkin.wait_all(ALL_BITS, Duration::from_secs(5)));
            assert_eq!(bits, ALL_BITS);
            assert!(start.elapsed() < std::time::Duration::from_secs(2));
        });
    }

    #[test]
    fn test_take_only_clears_mask() {
        let checkin = CheckinState::new();
        checkin.set(ALL_BITS | 0b100);
        assert_eq!(checkin.take(ALL_BITS), ALL_BITS);
        assert_eq!(checkin.peek(), 0b100);
    }
}
