//! 条件编译日志系统
//!
//! 根据 feature 选择不同的日志后端:
//! - `log-defmt`: 使用 defmt (高效二进制日志)
//! - `dev` / `log-println`: 使用 esp-println (文本日志)
//! - 主机单元测试: 使用 std println (与 esp-println 相同的文本格式)
//! - 默认 (release): 完全禁用日志 (零开销)
//!
//! 流水线中所有非致命错误 (队列满、存储失败、看门狗超时) 都只通过这些宏上报，
//! 不向上传播。

// ===================================================================
// defmt 后端 (feature = "log-defmt")
// ===================================================================
#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

// ===================================================================
// esp-println 后端 (feature = "dev" 或 "log-println")
// ===================================================================
#[cfg(all(any(feature = "dev", feature = "log-println"), not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { esp_println::println!("[INFO] {}", format_args!($($arg)*)) };
}

#[cfg(all(any(feature = "dev", feature = "log-println"), not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { esp_println::println!("[DEBUG] {}", format_args!($($arg)*)) };
}

#[cfg(all(any(feature = "dev", feature = "log-println"), not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { esp_println::println!("[WARN] {}", format_args!($($arg)*)) };
}

#[cfg(all(any(feature = "dev", feature = "log-println"), not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { esp_println::println!("[ERROR] {}", format_args!($($arg)*)) };
}

#[cfg(all(any(feature = "dev", feature = "log-println"), not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { esp_println::println!("[TRACE] {}", format_args!($($arg)*)) };
}

// ===================================================================
// 主机测试后端 (cfg(test)，无日志 feature)
// ===================================================================
#[cfg(all(test, not(any(feature = "dev", feature = "log-defmt", feature = "log-println"))))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { std::println!("[INFO] {}", format_args!($($arg)*)) };
}

#[cfg(all(test, not(any(feature = "dev", feature = "log-defmt", feature = "log-println"))))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { std::println!("[DEBUG] {}", format_args!($($arg)*)) };
}

#[cfg(all(test, not(any(feature = "dev", feature = "log-defmt", feature = "log-println"))))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { std::println!("[WARN] {}", format_args!($($arg)*)) };
}

#[cfg(all(test, not(any(feature = "dev", feature = "log-defmt", feature = "log-println"))))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { std::println!("[ERROR] {}", format_args!($($arg)*)) };
}

#[cfg(all(test, not(any(feature = "dev", feature = "log-defmt", feature = "log-println"))))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { std::println!("[TRACE] {}", format_args!($($arg)*)) };
}

// ===================================================================
// 空实现 (release 模式，无日志 feature)
// ===================================================================
#[cfg(not(any(test, feature = "dev", feature = "log-defmt", feature = "log-println")))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(any(test, feature = "dev", feature = "log-defmt", feature = "log-println")))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(any(test, feature = "dev", feature = "log-defmt", feature = "log-println")))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(any(test, feature = "dev", feature = "log-defmt", feature = "log-println")))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(any(test, feature = "dev", feature = "log-defmt", feature = "log-println")))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{}};
}

// ===================================================================
// 便捷重导出
// ===================================================================
pub use log_info;
pub use log_debug;
pub use log_warn;
pub use log_error;
pub use log_trace;
