//! 运动命令执行器
//!
//! 本 crate 提供一个单 worker 的运动命令执行器，包括：
//! - 公平锁保护的 FIFO 命令队列（有界，带重试）
//! - 计数唤醒信号 + 排空广播（`wait_for_completion`）
//! - 迭代任务的协作式打断（`interrupt_move` / `reset_queue`）
//! - 两种睡眠策略：定时器线程池调度 / 自旋混合睡眠
//! - 幂等关闭（`kill`，`Drop` 时自动调用）
//!
//! # 使用场景
//!
//! 控制逻辑在任意线程提交高层运动任务，执行器在专用线程上按提交顺序
//! 逐个执行，并通过 [`Actuator`] 下发底层指令。
//!
//! ```rust
//! use mover_core::{Mover, MoverConfig};
//!
//! let mover = Mover::new(MoverConfig {
//!     tick_ms: 1,
//!     warmup_rounds: 0,
//!     ..MoverConfig::default()
//! })
//! .unwrap();
//!
//! mover.move_to(5.0, 5.0);
//! mover.kick();
//! mover.wait_for_completion();
//! ```

mod actuator;
mod builder;
mod config;
mod context;
mod error;
mod job;
pub mod metrics;
mod motion;
mod mover;
pub mod position;
pub mod queue;
pub mod recording;
pub mod signal;
pub mod sleep;
pub mod state;
mod worker;

pub use actuator::{Actuator, ActuatorCommand, LoggingActuator};
pub use builder::MoverBuilder;
pub use config::{MoverConfig, SleepStrategy};
pub use error::MoverError;
pub use job::{JobKind, MovementJob};
pub use metrics::{MetricsSnapshot, MoverMetrics};
pub use mover::Mover;
pub use position::{DirectPlanner, FixedPose, PathPlanner, Point, Pose, PositionSource};
pub use queue::CommandQueue;
pub use recording::{RecordingActuator, TimestampedCommand};
pub use signal::{CompletionSignal, WakeSignal};
pub use sleep::SleepTimer;
pub use state::{AtomicWorkerState, WorkerState};
