//! Builder 模式实现
//!
//! 提供链式构造 `Mover` 的方式，支持注入执行机构、位姿源和路径规划器。

use crate::actuator::{Actuator, LoggingActuator};
use crate::config::MoverConfig;
use crate::context::MoverContext;
use crate::error::MoverError;
use crate::mover::Mover;
use crate::position::{DirectPlanner, FixedPose, PathPlanner, PositionSource};
use std::sync::Arc;

/// Mover Builder
///
/// # 示例
///
/// ```rust
/// use mover_core::recording::RecordingActuator;
/// use mover_core::{MoverBuilder, MoverConfig};
/// use std::sync::Arc;
///
/// let (actuator, rx) = RecordingActuator::new();
/// let mover = MoverBuilder::new()
///     .config(MoverConfig {
///         tick_ms: 1,
///         warmup_rounds: 0,
///         ..MoverConfig::default()
///     })
///     .actuator(Arc::new(actuator))
///     .build()
///     .unwrap();
///
/// mover.kick();
/// mover.wait_for_completion();
/// assert_eq!(rx.try_iter().count(), 1);
/// ```
#[derive(Default)]
pub struct MoverBuilder {
    config: MoverConfig,
    actuator: Option<Arc<dyn Actuator>>,
    position: Option<Arc<dyn PositionSource>>,
    planner: Option<Arc<dyn PathPlanner>>,
}

impl MoverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置运行参数
    pub fn config(mut self, config: MoverConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置执行机构（默认：[`LoggingActuator`]）
    pub fn actuator(mut self, actuator: Arc<dyn Actuator>) -> Self {
        self.actuator = Some(actuator);
        self
    }

    /// 设置位姿源（默认：原点处的 [`FixedPose`]）
    pub fn position_source(mut self, position: Arc<dyn PositionSource>) -> Self {
        self.position = Some(position);
        self
    }

    /// 设置路径规划器（默认：[`DirectPlanner`]）
    pub fn planner(mut self, planner: Arc<dyn PathPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// 校验配置、创建定时器并启动 worker 线程
    pub fn build(self) -> Result<Mover, MoverError> {
        let tolerance = self.config.arrival_tolerance;
        let actuator = self.actuator.unwrap_or_else(|| Arc::new(LoggingActuator));
        let position = self.position.unwrap_or_else(|| Arc::new(FixedPose::default()));
        let planner = self
            .planner
            .unwrap_or_else(|| Arc::new(DirectPlanner { tolerance }));

        let ctx = MoverContext::new(self.config, actuator, position, planner)?;
        Mover::spawn(ctx)
    }
}
