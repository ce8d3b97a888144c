//! 同步原语封装
//!
//! 基于 embassy-sync 提供的同步原语，统一使用 CriticalSectionRawMutex
//! 以确保在 ESP32-S3 单核/双核环境下的正确性

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::Channel,
    signal::Signal,
};
use portable_atomic::{AtomicU64, Ordering};

// ===== 类型别名: 简化使用 =====

/// 临界区信号量 - 用于任务间单值通知
///
/// 发送方可以发送一个值，接收方异步等待
/// 多次发送只保留最后一个值
///
/// # Example
/// ```ignore
/// static SIGNAL: CriticalSignal<u32> = CriticalSignal::new();
///
/// // 发送方
/// SIGNAL.signal(42);
///
/// // 接收方 (异步)
/// let value = SIGNAL.wait().await;
/// ```
pub type CriticalSignal<T> = Signal<CriticalSectionRawMutex, T>;

/// 临界区通道 - 固定容量消息队列
///
/// # Type Parameters
/// * `T` - 消息类型
/// * `N` - 队列容量
pub type CriticalChannel<T, const N: usize> = Channel<CriticalSectionRawMutex, T, N>;

// ===== 优化的原子操作封装 =====

/// 原子计数器 - 用于统计
pub struct AtomicCounter {
    count: AtomicU64,
}

impl AtomicCounter {
    /// 创建新的计数器
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// 增加并返回新值
    #[inline(always)]
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 获取当前值
    #[inline(always)]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }
}
