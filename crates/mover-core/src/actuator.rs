//! 执行机构接口
//!
//! 每个任务处理函数通过 [`Actuator`] 下发指令。实现必须立即返回（fire-and-forget），
//! 实际的硬件传输不在本 crate 范围内。

use crate::error::MoverError;
use std::fmt;
use tracing::info;

/// 下发给执行机构的单条指令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCommand {
    /// 机体坐标系速度（每个分量 [-100, 100]）
    Drive { speed_x: f64, speed_y: f64 },
    /// 沿机体坐标系方向（弧度）全速移动
    DriveAngle { angle: f64 },
    /// 原地旋转（弧度）
    Rotate { angle: f64 },
    Stop,
    Kick,
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorCommand::Drive { speed_x, speed_y } => {
                write!(f, "drive(x={:.2}, y={:.2})", speed_x, speed_y)
            },
            ActuatorCommand::DriveAngle { angle } => write!(f, "drive(angle={:.3})", angle),
            ActuatorCommand::Rotate { angle } => write!(f, "rotate({:.3})", angle),
            ActuatorCommand::Stop => write!(f, "stop"),
            ActuatorCommand::Kick => write!(f, "kick"),
        }
    }
}

/// 执行机构 Trait
///
/// # 要求
///
/// - **非阻塞**: 只负责把指令交给下层，不等待执行结果
/// - **线程安全**: 由 worker 线程调用，但实例可能被其他线程共享
pub trait Actuator: Send + Sync {
    /// 下发指令
    ///
    /// 返回错误会被 worker 视为任务异常：清空队列，循环继续。
    fn send(&self, command: ActuatorCommand) -> Result<(), MoverError>;
}

/// 只打日志的执行机构（无硬件时的默认实现）
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingActuator;

impl Actuator for LoggingActuator {
    fn send(&self, command: ActuatorCommand) -> Result<(), MoverError> {
        info!("Actuator command: {}", command);
        Ok(())
    }
}
