//! 定位与路径规划接口
//!
//! 迭代运动（MoveTo/MoveTowards/MoveToAStar）每个节拍读取一次当前位姿。
//! 视觉定位和 A* 规划不在本 crate 范围内，这里只定义接口和最小实现。

use parking_lot::RwLock;

/// 平面坐标点
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// 机器人位姿（位置 + 朝向，弧度）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Point,
    pub heading: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: Point::new(x, y),
            heading,
        }
    }

    /// 世界坐标系下到 `target` 的方位角减去自身朝向，得到机体坐标系下的方向
    pub fn relative_bearing(&self, target: Point) -> f64 {
        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        normalize_angle(dy.atan2(dx) - self.heading)
    }

    /// 把世界坐标系向量旋转到机体坐标系
    pub fn to_body_frame(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        let (sin, cos) = (-self.heading).sin_cos();
        (world_x * cos - world_y * sin, world_x * sin + world_y * cos)
    }
}

/// 归一化到 (-π, π]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// 位姿来源
///
/// 实现必须快速返回（每个节拍调用一次）。
pub trait PositionSource: Send + Sync {
    fn pose(&self) -> Pose;
}

/// 固定位姿（无定位输入时的替身，可由外部更新）
#[derive(Debug, Default)]
pub struct FixedPose {
    pose: RwLock<Pose>,
}

impl FixedPose {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose: RwLock::new(pose),
        }
    }

    /// 更新位姿（测试或外部定位线程使用）
    pub fn set(&self, pose: Pose) {
        *self.pose.write() = pose;
    }
}

impl PositionSource for FixedPose {
    fn pose(&self) -> Pose {
        *self.pose.read()
    }
}

/// 路径规划器
pub trait PathPlanner: Send + Sync {
    /// 返回从 `from` 到 `target` 的下一个航点；`None` 表示已到达或无路可走
    fn next_waypoint(
        &self,
        from: Pose,
        target: Point,
        avoid_ball: bool,
        avoid_enemy: bool,
    ) -> Option<Point>;
}

/// 直线规划器：忽略障碍，航点即目标点
#[derive(Debug, Clone, Copy)]
pub struct DirectPlanner {
    /// 到达判定半径
    pub tolerance: f64,
}

impl Default for DirectPlanner {
    fn default() -> Self {
        Self { tolerance: 1.0 }
    }
}

impl PathPlanner for DirectPlanner {
    fn next_waypoint(
        &self,
        from: Pose,
        target: Point,
        _avoid_ball: bool,
        _avoid_enemy: bool,
    ) -> Option<Point> {
        if from.position.distance_to(target) <= self.tolerance {
            None
        } else {
            Some(target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-9);
        assert!((normalize_angle(2.0 * PI)).abs() < 1e-9);
    }

    #[test]
    fn test_relative_bearing() {
        // 朝向 +x，目标在正左方（+y）
        let pose = Pose::new(0.0, 0.0, 0.0);
        assert!((pose.relative_bearing(Point::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-9);

        // 朝向 +y 时目标在正前方
        let pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        assert!(pose.relative_bearing(Point::new(0.0, 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_to_body_frame() {
        let pose = Pose::new(0.0, 0.0, FRAC_PI_2);
        // 世界 +y 在机体坐标系中是正前方 +x
        let (bx, by) = pose.to_body_frame(0.0, 10.0);
        assert!((bx - 10.0).abs() < 1e-9 && by.abs() < 1e-9, "({}, {})", bx, by);
    }

    #[test]
    fn test_fixed_pose_update() {
        let source = FixedPose::default();
        assert_eq!(source.pose(), Pose::default());
        source.set(Pose::new(1.0, 2.0, 0.5));
        assert_eq!(source.pose(), Pose::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_direct_planner() {
        let planner = DirectPlanner { tolerance: 0.5 };
        let target = Point::new(3.0, 0.0);
        assert_eq!(
            planner.next_waypoint(Pose::default(), target, true, true),
            Some(target)
        );
        assert_eq!(
            planner.next_waypoint(Pose::new(2.8, 0.0, 0.0), target, false, false),
            None
        );
    }
}
