//! sensorlog - ESP32-S3 周期采样流水线
//!
//! 三个并发任务组成的固定拓扑:
//! - 生产者: 周期采样，窗口满时求平均，放入单槽交接通道
//! - 消费者: 阻塞取出平均值，以 "tick, value" 行追加到 Flash 日志
//! - 看门狗: 在超时窗口内等待两者签到，上报停滞的任务
//!
//! 核心逻辑与硬件无关，可在主机上测试；板级入口见 `src/main.rs`。

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod fs;
pub mod record;
pub mod sensor;
pub mod sync;
pub mod tasks;
pub mod util;

// ===== 重导出常用类型 =====
pub use config::PipelineConfig;
pub use error::{PipelineError, Stall};
pub use fs::{FlashLog, FlashLogConfig, LogSink, StorageError};
pub use record::{LogRecord, SystemClock, TickCount, TickSource};
pub use sensor::{Averager, SampleSource, SampleValue, SimulatedSensor};
pub use sync::{CheckinState, HandoffChannel, RecvTimeout};
pub use tasks::{Consumer, HealthReport, LivenessMonitor, PipelineResources, Producer};

// ===== 版本信息 =====
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
