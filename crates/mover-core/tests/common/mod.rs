//! 测试辅助函数
//!
//! 提供快速创建测试环境的工具函数和故障注入用的执行机构。

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use mover_core::recording::{RecordingActuator, TimestampedCommand};
use mover_core::{
    Actuator, ActuatorCommand, FixedPose, Mover, MoverBuilder, MoverConfig, MoverError, Pose,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// 初始化测试日志（重复调用无副作用）
///
/// 用 `RUST_LOG=mover_core=debug cargo test` 查看 worker 日志。
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 测试用配置：短节拍、无预热
pub fn fast_config() -> MoverConfig {
    MoverConfig {
        tick_ms: 2,
        warmup_rounds: 0,
        join_timeout_ms: 5000,
        ..MoverConfig::default()
    }
}

/// 创建带录制执行机构的 Mover（位姿固定在原点）
pub fn recording_mover(config: MoverConfig) -> (Mover, Receiver<TimestampedCommand>) {
    let (actuator, rx) = RecordingActuator::new();
    let mover = MoverBuilder::new()
        .config(config)
        .actuator(Arc::new(actuator))
        .position_source(Arc::new(FixedPose::new(Pose::new(0.0, 0.0, 0.0))))
        .build()
        .expect("failed to build mover");
    (mover, rx)
}

/// 取出目前已录制的全部指令
pub fn drain(rx: &Receiver<TimestampedCommand>) -> Vec<ActuatorCommand> {
    rx.try_iter().map(|c| c.command).collect()
}

pub fn count_drives(commands: &[ActuatorCommand]) -> usize {
    commands
        .iter()
        .filter(|c| matches!(c, ActuatorCommand::Drive { .. }))
        .count()
}

/// 故障注入执行机构
///
/// - `Kick`: 返回错误
/// - `Rotate`: panic
/// - 其他指令：记录
#[derive(Default)]
pub struct FaultyActuator {
    pub sent: Mutex<Vec<ActuatorCommand>>,
}

impl Actuator for FaultyActuator {
    fn send(&self, command: ActuatorCommand) -> Result<(), MoverError> {
        match command {
            ActuatorCommand::Kick => Err(MoverError::Actuator("kicker jammed".to_string())),
            ActuatorCommand::Rotate { .. } => panic!("rotation motor exploded"),
            other => {
                self.sent.lock().push(other);
                Ok(())
            },
        }
    }
}

/// 轮询直到条件满足或超时
pub fn wait_for(mut condition: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
