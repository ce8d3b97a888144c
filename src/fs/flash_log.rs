//! NOR Flash 只追加日志
//!
//! 在一段按扇区对齐的 Flash 区域上实现 `LogSink`:
//! - 追加先写入 RAM 缓冲区，flush 时才编程到 Flash (降低写放大)
//! - 日志文本不含 `0xFF`，挂载时扫描第一个擦除态字节即可找到日志末尾
//! - 未对齐的尾字用 `0xFF` 填充，下次 flush 时原样重写 (要求 `MultiwriteNorFlash`)
//! - 扇区在日志增长到该处时才擦除

use embedded_storage::nor_flash::MultiwriteNorFlash;
use heapless::Vec;

use super::storage::{FlashLogConfig, LogSink, StorageError};
use crate::config::LOG_BUFFER_SIZE;

/// 支持的最大写入粒度 (字节)
const MAX_WRITE_SIZE: usize = 32;

/// 挂载扫描时每次读取的字节数
const SCAN_CHUNK: usize = 64;

/// NOR Flash 擦除态
const ERASED: u8 = 0xFF;

#[inline]
const fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// Flash 日志
pub struct FlashLog<F> {
    flash: F,
    config: FlashLogConfig,
    /// 已编程到 Flash 的字节数 (区域内偏移)
    written: u32,
    /// 从区域起始到此处的扇区已擦除
    erased_end: u32,
    /// 尚未 flush 的数据
    buffer: Vec<u8, LOG_BUFFER_SIZE>,
}

impl<F: MultiwriteNorFlash> FlashLog<F> {
    /// 挂载日志区域
    ///
    /// 校验区域配置并扫描已有数据，后续追加接在已有日志之后
    pub fn mount(mut flash: F, config: FlashLogConfig) -> Result<Self, StorageError> {
        config.validate(flash.capacity(), F::ERASE_SIZE)?;

        if F::WRITE_SIZE == 0
            || F::WRITE_SIZE > MAX_WRITE_SIZE
            || F::ERASE_SIZE % F::WRITE_SIZE != 0
            || F::WRITE_SIZE % F::READ_SIZE != 0
            || SCAN_CHUNK % F::READ_SIZE != 0
        {
            return Err(StorageError::AlignmentError);
        }

        let mut written = scan_end(&mut flash, &config)?;
        let mut erased_end = round_up(written, F::ERASE_SIZE as u32);

        // 日志末尾所在扇区的剩余部分必须是擦除态，否则区域里是别的数据
        if !is_erased(&mut flash, &config, written, erased_end)? {
            crate::log_warn!(
                "Log region at 0x{:X} holds foreign data, formatting",
                config.offset
            );
            flash
                .erase(config.address(0)?, config.address(config.size)?)
                .map_err(|e| StorageError::from_flash(e, StorageError::EraseError))?;
            written = 0;
            erased_end = config.size;
        }

        crate::log_info!(
            "Log mounted at 0x{:X}: {} of {} bytes used",
            config.offset,
            written,
            config.size
        );

        Ok(Self {
            flash,
            config,
            written,
            erased_end,
            buffer: Vec::new(),
        })
    }

    /// 擦除整个日志区域
    pub fn format(&mut self) -> Result<(), StorageError> {
        let from = self.config.address(0)?;
        let to = self.config.address(self.config.size)?;
        self.flash
            .erase(from, to)
            .map_err(|e| StorageError::from_flash(e, StorageError::EraseError))?;

        self.written = 0;
        self.erased_end = self.config.size;
        self.buffer.clear();
        Ok(())
    }

    /// 日志总长度 (含未 flush 数据)
    pub fn len(&self) -> u32 {
        self.written + self.buffer.len() as u32
    }

    /// 日志是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已持久化的字节数
    pub fn persisted(&self) -> u32 {
        self.written
    }

    /// 缓冲区中等待 flush 的字节数
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// 区域容量
    pub fn capacity(&self) -> u32 {
        self.config.size
    }

    /// 区域配置
    pub fn config(&self) -> &FlashLogConfig {
        &self.config
    }

    /// 取回底层 Flash (未 flush 的数据被丢弃)
    pub fn into_inner(self) -> F {
        self.flash
    }

    /// 确保 `[0, end)` 范围内的扇区均已擦除
    fn ensure_erased(&mut self, end: u32) -> Result<(), StorageError> {
        if end <= self.erased_end {
            return Ok(());
        }

        let to = round_up(end, F::ERASE_SIZE as u32);
        let from_addr = self.config.address(self.erased_end)?;
        let to_addr = self.config.address(to)?;

        crate::log_trace!("Erasing log sectors 0x{:X}..0x{:X}", from_addr, to_addr);
        self.flash
            .erase(from_addr, to_addr)
            .map_err(|e| StorageError::from_flash(e, StorageError::EraseError))?;

        self.erased_end = to;
        Ok(())
    }
}

impl<F: MultiwriteNorFlash> LogSink for FlashLog<F> {
    fn append(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if bytes.len() > LOG_BUFFER_SIZE {
            return Err(StorageError::TooLarge);
        }

        if self.len() as usize + bytes.len() > self.config.size as usize {
            return Err(StorageError::Full);
        }

        // 缓冲区放不下时先落盘
        if self.buffer.len() + bytes.len() > LOG_BUFFER_SIZE {
            self.flush()?;
        }

        self.buffer
            .extend_from_slice(bytes)
            .map_err(|_| StorageError::TooLarge)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let write_size = F::WRITE_SIZE as u32;
        let aligned_start = self.written - self.written % write_size;
        let prefix = (self.written - aligned_start) as usize;

        let mut stage = [ERASED; LOG_BUFFER_SIZE + 2 * MAX_WRITE_SIZE];

        // 尾字已编程的部分需要原样重写
        if prefix > 0 {
            let addr = self.config.address(aligned_start)?;
            self.flash
                .read(addr, &mut stage[..F::WRITE_SIZE])
                .map_err(|e| StorageError::from_flash(e, StorageError::ReadError))?;
            stage[prefix..F::WRITE_SIZE].fill(ERASED);
        }

        let end = prefix + self.buffer.len();
        stage[prefix..end].copy_from_slice(&self.buffer);
        let padded = round_up(end as u32, write_size);

        self.ensure_erased(aligned_start + padded)?;

        let addr = self.config.address(aligned_start)?;
        self.flash
            .write(addr, &stage[..padded as usize])
            .map_err(|e| StorageError::from_flash(e, StorageError::WriteError))?;

        self.written += self.buffer.len() as u32;
        self.buffer.clear();
        Ok(())
    }
}

/// `[from, to)` 范围内是否全部为擦除态
fn is_erased<F: MultiwriteNorFlash>(
    flash: &mut F,
    config: &FlashLogConfig,
    from: u32,
    to: u32,
) -> Result<bool, StorageError> {
    let mut chunk = [0u8; SCAN_CHUNK];
    // 读取地址需按 READ_SIZE 对齐
    let mut pos = from - from % F::READ_SIZE as u32;

    while pos < to {
        let len = core::cmp::min(SCAN_CHUNK as u32, to - pos) as usize;
        let addr = config.address(pos)?;
        flash
            .read(addr, &mut chunk[..len])
            .map_err(|e| StorageError::from_flash(e, StorageError::ReadError))?;

        let skip = from.saturating_sub(pos) as usize;
        if chunk[skip..len].iter().any(|&b| b != ERASED) {
            return Ok(false);
        }
        pos += len as u32;
    }

    Ok(true)
}

/// 扫描区域，返回第一个擦除态字节的偏移
fn scan_end<F: MultiwriteNorFlash>(
    flash: &mut F,
    config: &FlashLogConfig,
) -> Result<u32, StorageError> {
    let mut chunk = [0u8; SCAN_CHUNK];
    let mut pos: u32 = 0;

    while pos < config.size {
        let len = core::cmp::min(SCAN_CHUNK as u32, config.size - pos) as usize;
        let addr = config.address(pos)?;
        flash
            .read(addr, &mut chunk[..len])
            .map_err(|e| StorageError::from_flash(e, StorageError::ReadError))?;

        if let Some(idx) = chunk[..len].iter().position(|&b| b == ERASED) {
            return Ok(pos + idx as u32);
        }
        pos += len as u32;
    }

    Ok(config.size)
}
