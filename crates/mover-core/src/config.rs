//! 执行器配置
//!
//! 所有时间参数以毫秒为单位，默认值对应足球机器人上的实际调参结果。

use crate::error::MoverError;
use std::time::Duration;

/// 定时等待策略
///
/// 两种策略都保证：不忙等、单次调用私有的唤醒通道、提前唤醒后按剩余时间重新等待。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SleepStrategy {
    /// 定时器线程池调度一次性回调，唤醒调用者私有的单次通道（默认）
    #[default]
    Scheduled,
    /// 直接使用 OS 睡眠（`spin_sleep`，不自旋），外层按单调时钟复查
    Native,
}

/// Mover 配置
///
/// # Example
///
/// ```
/// use mover_core::MoverConfig;
///
/// // 使用默认配置（42ms 节拍，MoveTo 最多 20 次迭代）
/// let config = MoverConfig::default();
/// assert_eq!(config.tick_ms, 42);
///
/// // 测试时缩短节拍
/// let config = MoverConfig {
///     tick_ms: 2,
///     warmup_rounds: 0,
///     ..MoverConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoverConfig {
    /// 队列容量（超过后入队会重试，最终返回 `QueueInsertExhausted`）
    pub queue_capacity: usize,
    /// 入队最大尝试次数
    pub push_attempts: u32,
    /// MoveTo/MoveTowards 每次迭代的节拍（毫秒）
    pub tick_ms: u64,
    /// MoveTo/MoveTowards 最大迭代次数
    pub move_to_iterations: u32,
    /// MoveToAStar 外层最大迭代次数
    pub astar_iterations: u32,
    /// Rotate 每度耗时（毫秒）
    pub rotate_ms_per_degree: u64,
    /// 启动预热次数（避免首次定时等待的延迟尖峰）
    pub warmup_rounds: u32,
    /// 每次预热等待时长（毫秒）
    pub warmup_sleep_ms: u64,
    /// 到达判定半径（与位置源同单位）
    pub arrival_tolerance: f64,
    /// 速度上限（速度指令范围为 [-max_speed, max_speed]）
    pub max_speed: f64,
    /// MoveTo 比例增益：速度 = 距离 × 增益，再钳位到 `max_speed`
    pub approach_gain: f64,
    /// 定时等待策略
    pub sleep_strategy: SleepStrategy,
    /// 定时器线程数（仅 `Scheduled` 策略）
    pub timer_threads: usize,
    /// `kill()` 等待 worker 线程 join 的超时（毫秒）
    pub join_timeout_ms: u64,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            push_attempts: 10,
            tick_ms: 42,
            move_to_iterations: 20,
            astar_iterations: 10,
            rotate_ms_per_degree: 5,
            warmup_rounds: 3,
            warmup_sleep_ms: 10,
            arrival_tolerance: 1.0,
            max_speed: 100.0,
            approach_gain: 2.0,
            sleep_strategy: SleepStrategy::Scheduled,
            timer_threads: 1,
            join_timeout_ms: 2000,
        }
    }
}

impl MoverConfig {
    /// 校验配置
    ///
    /// # 错误
    /// - `InvalidInput`: 容量/尝试次数/线程数为 0，或浮点参数非有限/非正
    pub fn validate(&self) -> Result<(), MoverError> {
        if self.queue_capacity == 0 {
            return Err(MoverError::InvalidInput(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.push_attempts == 0 {
            return Err(MoverError::InvalidInput(
                "push_attempts must be at least 1".to_string(),
            ));
        }
        if self.sleep_strategy == SleepStrategy::Scheduled && self.timer_threads == 0 {
            return Err(MoverError::InvalidInput(
                "timer_threads must be at least 1 for the scheduled strategy".to_string(),
            ));
        }
        for (name, value) in [
            ("arrival_tolerance", self.arrival_tolerance),
            ("max_speed", self.max_speed),
            ("approach_gain", self.approach_gain),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MoverError::InvalidInput(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn warmup_sleep(&self) -> Duration {
        Duration::from_millis(self.warmup_sleep_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    /// 旋转 `angle`（弧度）所需的等待时间
    pub fn rotate_duration(&self, angle: f64) -> Duration {
        let degrees = angle.to_degrees().abs();
        if !degrees.is_finite() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(degrees * self.rotate_ms_per_degree as f64 / 1000.0)
            .unwrap_or(Duration::MAX)
    }
}
