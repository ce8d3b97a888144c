//! 工具模块
//!
//! - `log`: 条件编译日志宏

pub mod log;
