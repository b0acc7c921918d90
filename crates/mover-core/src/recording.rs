//! 指令录制执行机构
//!
//! 把 worker 下发的每条指令连同时间戳送入有界 Channel，
//! 用于测试断言、CLI 的干跑模式和离线分析。
//!
//! - **Bounded Queue**: 默认容量 100,000 条，防止 OOM
//! - **非阻塞**: 使用 `try_send`，队列满时丢弃并计数，不阻塞 worker
//!
//! # 使用示例
//!
//! ```rust
//! use mover_core::recording::RecordingActuator;
//! use mover_core::{Actuator, ActuatorCommand};
//!
//! let (actuator, rx) = RecordingActuator::new();
//! actuator.send(ActuatorCommand::Kick).unwrap();
//!
//! let recorded: Vec<_> = rx.try_iter().map(|c| c.command).collect();
//! assert_eq!(recorded, vec![ActuatorCommand::Kick]);
//! ```

use crate::actuator::{Actuator, ActuatorCommand};
use crate::error::MoverError;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// 默认录制容量
pub const DEFAULT_RECORDING_CAPACITY: usize = 100_000;

/// 带时间戳的指令
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedCommand {
    /// 下发时刻（单调时钟）
    pub at: Instant,
    pub command: ActuatorCommand,
}

/// 录制执行机构
pub struct RecordingActuator {
    tx: Sender<TimestampedCommand>,
    /// 丢弃计数（队列满）
    dropped: Arc<AtomicU64>,
    /// 成功录制计数
    recorded: Arc<AtomicU64>,
}

impl RecordingActuator {
    /// 创建默认容量的录制执行机构
    pub fn new() -> (Self, Receiver<TimestampedCommand>) {
        Self::with_capacity(DEFAULT_RECORDING_CAPACITY)
    }

    /// 指定容量
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<TimestampedCommand>) {
        let (tx, rx) = bounded(capacity);
        (
            Self {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
                recorded: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    /// 丢弃计数器（直接持有 Arc 以便跨线程监控）
    pub fn dropped(&self) -> &Arc<AtomicU64> {
        &self.dropped
    }

    /// 录制计数器
    pub fn recorded(&self) -> &Arc<AtomicU64> {
        &self.recorded
    }
}

impl Actuator for RecordingActuator {
    fn send(&self, command: ActuatorCommand) -> Result<(), MoverError> {
        let entry = TimestampedCommand {
            at: Instant::now(),
            command,
        };
        if self.tx.try_send(entry).is_err() {
            // 队列满或接收端已关闭：丢弃，不影响执行
            self.dropped.fetch_add(1, Ordering::Relaxed);
        } else {
            self.recorded.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let (actuator, rx) = RecordingActuator::new();
        actuator.send(ActuatorCommand::Stop).unwrap();
        actuator.send(ActuatorCommand::Kick).unwrap();
        actuator
            .send(ActuatorCommand::Drive {
                speed_x: 1.0,
                speed_y: 2.0,
            })
            .unwrap();

        let recorded: Vec<_> = rx.try_iter().collect();
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0].command, ActuatorCommand::Stop);
        assert_eq!(recorded[1].command, ActuatorCommand::Kick);
        assert!(recorded[0].at <= recorded[2].at);
        assert_eq!(actuator.recorded().load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_full_queue_drops_without_error() {
        let (actuator, rx) = RecordingActuator::with_capacity(2);
        for _ in 0..5 {
            assert!(actuator.send(ActuatorCommand::Kick).is_ok());
        }
        assert_eq!(actuator.dropped().load(Ordering::Relaxed), 3);
        assert_eq!(rx.try_iter().count(), 2);
    }
}
