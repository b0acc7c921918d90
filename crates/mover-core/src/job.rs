//! 运动任务类型定义
//!
//! 每种任务只携带自身需要的字段，避免"模式 + 字段包"带来的非法组合。

use crate::error::MoverError;
use std::fmt;

/// 运动任务
///
/// 由 [`Mover`](crate::Mover) 的提交接口创建，在执行完成或队列重置时销毁。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementJob {
    /// 立即停止
    Stop,
    /// 踢球
    Kick,
    /// 等待指定毫秒（执行中不可打断）
    Delay { ms: u64 },
    /// 以速度向量移动（每个分量范围 [-100, 100]）
    MoveVector { speed_x: f64, speed_y: f64 },
    /// 沿给定方向（弧度）移动
    MoveAngle { angle: f64 },
    /// 迭代修正移动到目标点
    MoveTo { x: f64, y: f64 },
    /// 移动到目标点后停止
    MoveToAndStop { x: f64, y: f64 },
    /// 朝目标点方向迭代修正
    MoveTowards { x: f64, y: f64 },
    /// 经路径规划器逐航点移动到目标点
    MoveToAStar {
        x: f64,
        y: f64,
        avoid_ball: bool,
        avoid_enemy: bool,
    },
    /// 原地旋转（弧度）
    Rotate { angle: f64 },
}

/// 任务类别（无字段，用于日志和统计）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Stop,
    Kick,
    Delay,
    MoveVector,
    MoveAngle,
    MoveTo,
    MoveToAndStop,
    MoveTowards,
    MoveToAStar,
    Rotate,
}

impl JobKind {
    pub const COUNT: usize = 10;

    pub const ALL: [JobKind; JobKind::COUNT] = [
        JobKind::Stop,
        JobKind::Kick,
        JobKind::Delay,
        JobKind::MoveVector,
        JobKind::MoveAngle,
        JobKind::MoveTo,
        JobKind::MoveToAndStop,
        JobKind::MoveTowards,
        JobKind::MoveToAStar,
        JobKind::Rotate,
    ];

    /// 在 [`JobKind::ALL`] 中的下标（按类别统计用）
    pub fn index(self) -> usize {
        self as usize
    }
}

impl MovementJob {
    pub fn kind(&self) -> JobKind {
        match self {
            MovementJob::Stop => JobKind::Stop,
            MovementJob::Kick => JobKind::Kick,
            MovementJob::Delay { .. } => JobKind::Delay,
            MovementJob::MoveVector { .. } => JobKind::MoveVector,
            MovementJob::MoveAngle { .. } => JobKind::MoveAngle,
            MovementJob::MoveTo { .. } => JobKind::MoveTo,
            MovementJob::MoveToAndStop { .. } => JobKind::MoveToAndStop,
            MovementJob::MoveTowards { .. } => JobKind::MoveTowards,
            MovementJob::MoveToAStar { .. } => JobKind::MoveToAStar,
            MovementJob::Rotate { .. } => JobKind::Rotate,
        }
    }

    /// 是否为有界迭代任务（可被 `interrupt_move()` 提前结束）
    pub fn is_iterative(&self) -> bool {
        matches!(
            self.kind(),
            JobKind::MoveTo | JobKind::MoveToAndStop | JobKind::MoveTowards | JobKind::MoveToAStar
        )
    }

    /// 入队前校验参数
    ///
    /// # 错误
    /// - `InvalidInput`: 坐标/角度非有限值，或速度分量超出 `[-max_speed, max_speed]`
    pub fn validate(&self, max_speed: f64) -> Result<(), MoverError> {
        match *self {
            MovementJob::Stop | MovementJob::Kick | MovementJob::Delay { .. } => Ok(()),
            MovementJob::MoveVector { speed_x, speed_y } => {
                check_speed("speed_x", speed_x, max_speed)?;
                check_speed("speed_y", speed_y, max_speed)
            },
            MovementJob::MoveAngle { angle } | MovementJob::Rotate { angle } => {
                check_finite("angle", angle)
            },
            MovementJob::MoveTo { x, y }
            | MovementJob::MoveToAndStop { x, y }
            | MovementJob::MoveTowards { x, y }
            | MovementJob::MoveToAStar { x, y, .. } => {
                check_finite("x", x)?;
                check_finite("y", y)
            },
        }
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), MoverError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(MoverError::InvalidInput(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}

fn check_speed(name: &str, value: f64, max_speed: f64) -> Result<(), MoverError> {
    check_finite(name, value)?;
    if value.abs() > max_speed {
        return Err(MoverError::InvalidInput(format!(
            "{} = {} out of range [-{}, {}]",
            name, value, max_speed, max_speed
        )));
    }
    Ok(())
}

impl fmt::Display for MovementJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementJob::Stop => write!(f, "stop"),
            MovementJob::Kick => write!(f, "kick"),
            MovementJob::Delay { ms } => write!(f, "delay({} ms)", ms),
            MovementJob::MoveVector { speed_x, speed_y } => {
                write!(f, "move({}, {})", speed_x, speed_y)
            },
            MovementJob::MoveAngle { angle } => write!(f, "move(angle={:.3} rad)", angle),
            MovementJob::MoveTo { x, y } => write!(f, "moveTo({}, {})", x, y),
            MovementJob::MoveToAndStop { x, y } => write!(f, "moveToAndStop({}, {})", x, y),
            MovementJob::MoveTowards { x, y } => write!(f, "moveTowards({}, {})", x, y),
            MovementJob::MoveToAStar {
                x,
                y,
                avoid_ball,
                avoid_enemy,
            } => write!(
                f,
                "moveToAStar({}, {}, avoid_ball={}, avoid_enemy={})",
                x, y, avoid_ball, avoid_enemy
            ),
            MovementJob::Rotate { angle } => write!(f, "rotate({:.3} rad)", angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_kind() {
        assert_eq!(MovementJob::Stop.kind(), JobKind::Stop);
        assert_eq!(MovementJob::Delay { ms: 5 }.kind(), JobKind::Delay);
        assert_eq!(
            MovementJob::MoveToAStar {
                x: 1.0,
                y: 2.0,
                avoid_ball: true,
                avoid_enemy: false
            }
            .kind(),
            JobKind::MoveToAStar
        );
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in JobKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_is_iterative() {
        assert!(MovementJob::MoveTo { x: 0.0, y: 0.0 }.is_iterative());
        assert!(MovementJob::MoveTowards { x: 0.0, y: 0.0 }.is_iterative());
        assert!(!MovementJob::Delay { ms: 100 }.is_iterative());
        assert!(!MovementJob::Kick.is_iterative());
        assert!(!MovementJob::Rotate { angle: 1.0 }.is_iterative());
    }

    #[test]
    fn test_validate_speed_range() {
        let ok = MovementJob::MoveVector {
            speed_x: -100.0,
            speed_y: 100.0,
        };
        assert!(ok.validate(100.0).is_ok());

        let too_fast = MovementJob::MoveVector {
            speed_x: 100.5,
            speed_y: 0.0,
        };
        assert!(matches!(
            too_fast.validate(100.0),
            Err(MoverError::InvalidInput(msg)) if msg.contains("speed_x")
        ));
    }

    #[test]
    fn test_validate_non_finite() {
        assert!(MovementJob::MoveTo { x: f64::NAN, y: 0.0 }.validate(100.0).is_err());
        assert!(
            MovementJob::Rotate {
                angle: f64::INFINITY
            }
            .validate(100.0)
            .is_err()
        );
        assert!(MovementJob::Delay { ms: 0 }.validate(100.0).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            MovementJob::MoveVector {
                speed_x: 10.0,
                speed_y: 20.0
            }
            .to_string(),
            "move(10, 20)"
        );
        assert_eq!(MovementJob::Delay { ms: 100 }.to_string(), "delay(100 ms)");
    }
}
