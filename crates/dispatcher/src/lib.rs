//! # Dispatcher
//!
//! 多事件源锁步调度模块。
//!
//! 负责：
//! - 按优先级注册 subject（稳定插入，去重）
//! - 每轮计算最小待发时间戳，分发历史与实时 subject
//! - 生命周期：start → rounds → stop → join
//! - `run()` 阻塞运行与 `step()` 外部驱动两种模式
//!
//! ## 使用示例
//!
//! ```ignore
//! use dispatcher::Dispatcher;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_subject(bars.clone());
//! dispatcher.add_subject(ticker.clone());
//! dispatcher.idle_signal().subscribe(|| tracing::trace!("idle"));
//!
//! dispatcher.run()?;
//! ```

pub mod dispatcher;
pub mod lifecycle;
pub mod metrics;
pub mod registry;
pub mod round;

pub use contracts::{DispatchContext, DispatchPriority, Subject, SubjectRef, Timestamp};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use lifecycle::LifecycleState;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use registry::SubjectRegistry;
pub use round::RoundOutcome;

#[cfg(test)]
pub(crate) mod testing;
