//! 存储抽象层
//!
//! 消费者只依赖 `LogSink` 的追加/刷盘两个原语，具体介质
//! (内部 Flash、外部 SPI Flash、测试用内存) 由实现者决定。

use core::fmt;
use embedded_storage::nor_flash::{NorFlashError, NorFlashErrorKind};

/// 存储操作错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub enum StorageError {
    /// 读取失败
    ReadError,
    /// 写入失败
    WriteError,
    /// 擦除失败
    EraseError,
    /// 地址越界
    OutOfBounds,
    /// 对齐错误
    AlignmentError,
    /// 日志区域已写满
    Full,
    /// 单次追加超过缓冲区容量
    TooLarge,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadError => write!(f, "Flash read error"),
            Self::WriteError => write!(f, "Flash write error"),
            Self::EraseError => write!(f, "Flash erase error"),
            Self::OutOfBounds => write!(f, "Address out of bounds"),
            Self::AlignmentError => write!(f, "Address alignment error"),
            Self::Full => write!(f, "Log region full"),
            Self::TooLarge => write!(f, "Record larger than log buffer"),
        }
    }
}

impl StorageError {
    /// 将 NOR Flash 驱动错误映射为存储错误
    ///
    /// `fallback` 为无法细分时使用的错误 (读/写/擦除)
    pub fn from_flash<E: NorFlashError>(e: E, fallback: StorageError) -> Self {
        match e.kind() {
            NorFlashErrorKind::NotAligned => Self::AlignmentError,
            NorFlashErrorKind::OutOfBounds => Self::OutOfBounds,
            _ => fallback,
        }
    }
}

/// 只追加的日志存储
///
/// `append` 每条记录调用一次，`flush` 按更粗的间隔调用；
/// 两次 flush 之间追加的数据在掉电时可能丢失。
pub trait LogSink {
    /// 追加字节
    fn append(&mut self, bytes: &[u8]) -> Result<(), StorageError>;

    /// 将缓存数据写入持久介质
    fn flush(&mut self) -> Result<(), StorageError>;
}

impl<T: LogSink + ?Sized> LogSink for &mut T {
    fn append(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).append(bytes)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        (**self).flush()
    }
}

/// 日志区域配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashLogConfig {
    /// 区域起始偏移 (必须按擦除扇区对齐)
    pub offset: u32,
    /// 区域大小 (必须为擦除扇区的整数倍)
    pub size: u32,
}

impl Default for FlashLogConfig {
    fn default() -> Self {
        Self {
            offset: crate::config::LOG_PARTITION_OFFSET,
            size: crate::config::LOG_PARTITION_SIZE,
        }
    }
}

impl FlashLogConfig {
    /// 创建配置
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// 校验区域是否落在 Flash 容量内且与擦除扇区对齐
    pub fn validate(&self, capacity: usize, erase_size: usize) -> Result<(), StorageError> {
        let end = self.offset as u64 + self.size as u64;
        if self.size == 0 || end > capacity as u64 {
            return Err(StorageError::OutOfBounds);
        }

        let erase_size = erase_size as u32;
        if erase_size == 0 || self.offset % erase_size != 0 || self.size % erase_size != 0 {
            return Err(StorageError::AlignmentError);
        }

        Ok(())
    }

    /// 将区域内偏移转换为 Flash 绝对地址
    pub fn address(&self, relative: u32) -> Result<u32, StorageError> {
        if relative > self.size {
            return Err(StorageError::OutOfBounds);
        }
        Ok(self.offset + relative)
    }
}
