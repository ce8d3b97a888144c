//! 传感器采样
//!
//! - `SampleSource`: 每次调用返回一个原始读数的采样源
//! - `Averager`: 把一个窗口的读数归约为一个平均值
//! - `SimulatedSensor`: 没有真实 ADC 时使用的伪随机采样源

pub mod averager;

pub use averager::Averager;

/// 传感器读数
pub type SampleValue = i32;

/// 采样源
///
/// 生产者每个 tick 调用一次 `read`，实现不应阻塞
pub trait SampleSource {
    /// 读取一个原始值
    fn read(&mut self) -> SampleValue;
}

impl<F> SampleSource for F
where
    F: FnMut() -> SampleValue,
{
    #[inline]
    fn read(&mut self) -> SampleValue {
        self()
    }
}

/// 模拟传感器
///
/// 实际使用时替换为真实 ADC/I2C/SPI 读取
pub struct SimulatedSensor {
    seed: u32,
}

impl SimulatedSensor {
    /// 创建模拟传感器
    pub const fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(12345)
    }
}

impl SampleSource for SimulatedSensor {
    #[inline]
    fn read(&mut self) -> SampleValue {
        // 简单的伪随机数生成 (LCG)，输出 0..=0xFFFF
        self.seed = self.seed.wrapping_mul(1103515245).wrapping_add(12345);
        ((self.seed >> 16) & 0xFFFF) as SampleValue
    }
}
