//! 窗口平均器
//!
//! 累加固定数量的读数后给出一个截断整数平均值，随后清零重新开始。
//! 仅由生产者持有，不跨任务共享。

use super::SampleValue;
use crate::config::WINDOW_SIZE;

/// 窗口平均器
///
/// 不变量: `0 <= count <= window`
#[derive(Debug, Clone)]
pub struct Averager {
    sum: i64,
    count: usize,
    window: usize,
}

impl Averager {
    /// 使用默认窗口 (`WINDOW_SIZE`) 创建
    pub const fn new() -> Self {
        Self::with_window(WINDOW_SIZE)
    }

    /// 使用指定窗口创建 (窗口至少为 1)
    pub const fn with_window(window: usize) -> Self {
        Self {
            sum: 0,
            count: 0,
            window: if window == 0 { 1 } else { window },
        }
    }

    /// 累加一个读数
    ///
    /// 窗口已满时忽略读数，调用方应先 `drain_average`
    #[inline]
    pub fn accumulate(&mut self, sample: SampleValue) {
        if self.count >= self.window {
            return;
        }
        self.sum += sample as i64;
        self.count += 1;
    }

    /// 窗口是否已满
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.count == self.window
    }

    /// 取出平均值并清零
    ///
    /// 截断除法 (`sum / count`)。窗口未满时返回 `None`，状态不变。
    pub fn drain_average(&mut self) -> Option<SampleValue> {
        if !self.is_ready() {
            return None;
        }

        let average = self.sum / self.count as i64;
        self.reset();
        Some(average as SampleValue)
    }

    /// 当前已累加的读数个数
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// 窗口大小
    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }

    /// 丢弃已累加的读数
    #[inline]
    pub fn reset(&mut self) {
        self.sum = 0;
        self.count = 0;
    }
}

impl Default for Averager {
    fn default() -> Self {
        Self::new()
    }
}
