//! 同步原语模块
//!
//! 流水线中仅有的两个共享对象，均基于 embassy-sync 封装:
//! - `HandoffChannel`: 生产者到消费者的单槽队列
//! - `CheckinState`: 看门狗签到事件位组

pub mod checkin;
pub mod handoff;
pub mod primitives;

pub use checkin::CheckinState;
pub use handoff::{HandoffChannel, RecvTimeout};
pub use primitives::{AtomicCounter, CriticalChannel, CriticalSignal};
