//! 任务处理函数
//!
//! | 任务 | 行为 |
//! |---|---|
//! | Stop / Kick / MoveVector / MoveAngle | 一条指令，立即返回 |
//! | Delay | `SleepTimer::sleep`，不可打断 |
//! | MoveTo / MoveTowards | 最多 `move_to_iterations` 次：检查打断 → 睡一个节拍 → 读位姿 → 修正 |
//! | MoveToAndStop | MoveTo 后追加 Stop（被打断也会停车） |
//! | MoveToAStar | 最多 `astar_iterations` 次：取下一个航点，执行 MoveTo |
//! | Rotate | 一条旋转指令，然后按角度等待 |
//!
//! 打断标志只在每次迭代开始时检查一次。

use crate::actuator::ActuatorCommand;
use crate::context::MoverContext;
use crate::error::MoverError;
use crate::job::MovementJob;
use crate::position::{Point, Pose};
use std::sync::atomic::Ordering;
use tracing::trace;

/// 任务执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobOutcome {
    Completed,
    /// 迭代任务被 `interrupt` 提前结束
    Interrupted,
}

pub(crate) struct JobRunner<'a> {
    ctx: &'a MoverContext,
}

impl<'a> JobRunner<'a> {
    pub fn new(ctx: &'a MoverContext) -> Self {
        Self { ctx }
    }

    pub fn run(&self, job: MovementJob) -> Result<JobOutcome, MoverError> {
        match job {
            MovementJob::Stop => self.send_once(ActuatorCommand::Stop),
            MovementJob::Kick => self.send_once(ActuatorCommand::Kick),
            MovementJob::Delay { ms } => {
                self.ctx.timer.sleep_ms(ms)?;
                Ok(JobOutcome::Completed)
            },
            MovementJob::MoveVector { speed_x, speed_y } => {
                self.send_once(ActuatorCommand::Drive { speed_x, speed_y })
            },
            MovementJob::MoveAngle { angle } => {
                self.send_once(ActuatorCommand::DriveAngle { angle })
            },
            MovementJob::MoveTo { x, y } => self.move_to(Point::new(x, y)),
            MovementJob::MoveToAndStop { x, y } => {
                let outcome = self.move_to(Point::new(x, y))?;
                self.send(ActuatorCommand::Stop)?;
                Ok(outcome)
            },
            MovementJob::MoveTowards { x, y } => self.move_towards(Point::new(x, y)),
            MovementJob::MoveToAStar {
                x,
                y,
                avoid_ball,
                avoid_enemy,
            } => self.move_to_astar(Point::new(x, y), avoid_ball, avoid_enemy),
            MovementJob::Rotate { angle } => {
                self.send(ActuatorCommand::Rotate { angle })?;
                self.ctx.timer.sleep(self.ctx.config.rotate_duration(angle))?;
                Ok(JobOutcome::Completed)
            },
        }
    }

    fn send(&self, command: ActuatorCommand) -> Result<(), MoverError> {
        trace!("-> {}", command);
        self.ctx.actuator.send(command)
    }

    fn send_once(&self, command: ActuatorCommand) -> Result<JobOutcome, MoverError> {
        self.send(command)?;
        Ok(JobOutcome::Completed)
    }

    fn interrupted(&self) -> bool {
        self.ctx.interrupt.load(Ordering::Acquire)
    }

    /// 有界节拍循环
    ///
    /// 到达目标半径内提前完成；定时器被取消视为打断。
    fn paced_loop(
        &self,
        target: Point,
        correction: impl Fn(&Pose) -> ActuatorCommand,
    ) -> Result<JobOutcome, MoverError> {
        let tick = self.ctx.config.tick();
        for _ in 0..self.ctx.config.move_to_iterations {
            if self.interrupted() {
                return Ok(JobOutcome::Interrupted);
            }
            match self.ctx.timer.sleep(tick) {
                Ok(()) => {},
                Err(MoverError::Cancelled) => return Ok(JobOutcome::Interrupted),
                Err(e) => return Err(e),
            }

            let pose = self.ctx.position.pose();
            if pose.position.distance_to(target) <= self.ctx.config.arrival_tolerance {
                return Ok(JobOutcome::Completed);
            }
            self.send(correction(&pose))?;
        }
        Ok(JobOutcome::Completed)
    }

    fn move_to(&self, target: Point) -> Result<JobOutcome, MoverError> {
        let gain = self.ctx.config.approach_gain;
        let max_speed = self.ctx.config.max_speed;
        self.paced_loop(target, |pose| approach_command(pose, target, gain, max_speed))
    }

    fn move_towards(&self, target: Point) -> Result<JobOutcome, MoverError> {
        self.paced_loop(target, |pose| ActuatorCommand::DriveAngle {
            angle: pose.relative_bearing(target),
        })
    }

    fn move_to_astar(
        &self,
        target: Point,
        avoid_ball: bool,
        avoid_enemy: bool,
    ) -> Result<JobOutcome, MoverError> {
        for _ in 0..self.ctx.config.astar_iterations {
            if self.interrupted() {
                return Ok(JobOutcome::Interrupted);
            }
            let pose = self.ctx.position.pose();
            let Some(waypoint) =
                self.ctx
                    .planner
                    .next_waypoint(pose, target, avoid_ball, avoid_enemy)
            else {
                return Ok(JobOutcome::Completed);
            };
            trace!("A* waypoint ({:.2}, {:.2})", waypoint.x, waypoint.y);
            if self.move_to(waypoint)? == JobOutcome::Interrupted {
                return Ok(JobOutcome::Interrupted);
            }
        }
        Ok(JobOutcome::Completed)
    }
}

/// 比例修正：速度 = min(距离 × 增益, 上限)，方向指向目标，转换到机体坐标系
pub(crate) fn approach_command(
    pose: &Pose,
    target: Point,
    gain: f64,
    max_speed: f64,
) -> ActuatorCommand {
    let dx = target.x - pose.position.x;
    let dy = target.y - pose.position.y;
    let distance = dx.hypot(dy);
    if distance <= f64::EPSILON {
        return ActuatorCommand::Drive {
            speed_x: 0.0,
            speed_y: 0.0,
        };
    }

    let speed = (distance * gain).min(max_speed);
    let (body_x, body_y) = pose.to_body_frame(dx / distance * speed, dy / distance * speed);
    ActuatorCommand::Drive {
        speed_x: body_x.clamp(-max_speed, max_speed),
        speed_y: body_y.clamp(-max_speed, max_speed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_command_points_at_target() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        match approach_command(&pose, Point::new(10.0, 0.0), 2.0, 100.0) {
            ActuatorCommand::Drive { speed_x, speed_y } => {
                assert!((speed_x - 20.0).abs() < 1e-9);
                assert!(speed_y.abs() < 1e-9);
            },
            other => panic!("Expected Drive, got {:?}", other),
        }
    }

    #[test]
    fn test_approach_command_saturates() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        match approach_command(&pose, Point::new(0.0, -500.0), 2.0, 100.0) {
            ActuatorCommand::Drive { speed_x, speed_y } => {
                assert!(speed_x.abs() < 1e-9);
                assert!((speed_y + 100.0).abs() < 1e-9);
            },
            other => panic!("Expected Drive, got {:?}", other),
        }
    }

    #[test]
    fn test_approach_command_in_body_frame() {
        // 朝向 +y，目标在世界 +y 方向 → 机体正前方
        let pose = Pose::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        match approach_command(&pose, Point::new(0.0, 5.0), 2.0, 100.0) {
            ActuatorCommand::Drive { speed_x, speed_y } => {
                assert!((speed_x - 10.0).abs() < 1e-9, "{}", speed_x);
                assert!(speed_y.abs() < 1e-9, "{}", speed_y);
            },
            other => panic!("Expected Drive, got {:?}", other),
        }
    }

    #[test]
    fn test_approach_command_at_target() {
        let pose = Pose::new(3.0, 4.0, 1.0);
        assert_eq!(
            approach_command(&pose, Point::new(3.0, 4.0), 2.0, 100.0),
            ActuatorCommand::Drive {
                speed_x: 0.0,
                speed_y: 0.0
            }
        );
    }
}
