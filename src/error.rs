//! 流水线错误
//!
//! 所有错误都是非致命的: 由所属任务在本地处理并通过日志上报，
//! 不会导致任务退出。

use core::fmt;

use crate::fs::StorageError;
use crate::sensor::SampleValue;

/// 停止签到的任务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub enum Stall {
    /// 生产者未签到
    Producer,
    /// 消费者未签到
    Consumer,
    /// 两者都未签到
    Both,
}

impl fmt::Display for Stall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => write!(f, "producer not working"),
            Self::Consumer => write!(f, "consumer not working"),
            Self::Both => write!(f, "producer and consumer not working"),
        }
    }
}

/// 流水线错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
pub enum PipelineError {
    /// 交接槽已被占用，新平均值被丢弃
    ChannelFull {
        /// 被丢弃的平均值
        dropped: SampleValue,
    },
    /// 存储追加或刷盘失败
    Storage(StorageError),
    /// 看门狗窗口内缺少签到
    LivenessTimeout(Stall),
}

impl From<StorageError> for PipelineError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelFull { dropped } => {
                write!(f, "Handoff slot full, dropped average {}", dropped)
            }
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::LivenessTimeout(stall) => write!(f, "Liveness timeout: {}", stall),
        }
    }
}
