//! 共享状态上下文
//!
//! 由 [`Mover`](crate::Mover) 和 worker 线程通过 `Arc` 共同持有。

use crate::actuator::Actuator;
use crate::config::MoverConfig;
use crate::error::MoverError;
use crate::metrics::MoverMetrics;
use crate::position::{PathPlanner, PositionSource};
use crate::queue::CommandQueue;
use crate::signal::CompletionSignal;
use crate::sleep::SleepTimer;
use crate::state::{AtomicWorkerState, WorkerState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct MoverContext {
    pub config: MoverConfig,
    pub queue: CommandQueue,
    /// 队列排空广播（也在 worker 退出时广播）
    pub completion: CompletionSignal,
    /// 关闭完成广播（唤醒所有 `kill()` 调用者）
    pub shutdown: CompletionSignal,
    /// 当前迭代任务应提前结束
    pub interrupt: AtomicBool,
    /// 请求关闭（单调：置位后永不清除）
    pub die: AtomicBool,
    /// worker 已退出并释放定时器
    pub dead: AtomicBool,
    pub state: AtomicWorkerState,
    pub timer: SleepTimer,
    pub actuator: Arc<dyn Actuator>,
    pub position: Arc<dyn PositionSource>,
    pub planner: Arc<dyn PathPlanner>,
    pub metrics: MoverMetrics,
}

impl MoverContext {
    pub fn new(
        config: MoverConfig,
        actuator: Arc<dyn Actuator>,
        position: Arc<dyn PositionSource>,
        planner: Arc<dyn PathPlanner>,
    ) -> Result<Self, MoverError> {
        config.validate()?;
        let timer = SleepTimer::new(config.sleep_strategy, config.timer_threads)?;
        Ok(Self {
            queue: CommandQueue::new(config.queue_capacity, config.push_attempts),
            completion: CompletionSignal::new(),
            shutdown: CompletionSignal::new(),
            interrupt: AtomicBool::new(false),
            die: AtomicBool::new(false),
            dead: AtomicBool::new(false),
            state: AtomicWorkerState::new(WorkerState::Booting),
            timer,
            actuator,
            position,
            planner,
            metrics: MoverMetrics::new(),
            config,
        })
    }

    /// 队列为空且没有任务在执行，或 worker 已退出
    pub fn is_settled(&self) -> bool {
        self.dead.load(Ordering::SeqCst) || self.queue.is_idle()
    }

    /// 打断当前迭代任务并丢弃所有排队任务，返回丢弃数量
    pub fn reset_queue(&self) -> usize {
        self.interrupt.store(true, Ordering::Release);
        let discarded = self.queue.clear();
        self.after_discard(discarded);
        discarded
    }

    /// 关闭队列（拒绝后续提交）并丢弃所有排队任务
    pub fn close_queue(&self) -> usize {
        self.interrupt.store(true, Ordering::Release);
        let discarded = self.queue.close();
        self.after_discard(discarded);
        discarded
    }

    fn after_discard(&self, discarded: usize) {
        self.metrics
            .jobs_discarded
            .fetch_add(discarded as u64, Ordering::Relaxed);
        // 被丢弃的任务可能从未被 worker 认领，worker 不会再为它们广播
        self.completion.broadcast();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::LoggingActuator;
    use crate::job::MovementJob;
    use crate::position::{DirectPlanner, FixedPose};
    use std::time::Duration;

    fn context() -> MoverContext {
        let config = MoverConfig {
            warmup_rounds: 0,
            ..MoverConfig::default()
        };
        MoverContext::new(
            config,
            Arc::new(LoggingActuator),
            Arc::new(FixedPose::default()),
            Arc::new(DirectPlanner::default()),
        )
        .unwrap()
    }

    /// 按 worker 的步骤手动推进：第一个任务结束后、取下一个许可前重置
    #[test]
    fn test_reset_between_jobs_settles() {
        let ctx = context();
        ctx.queue.push(MovementJob::Delay { ms: 50 }).unwrap();
        ctx.queue.push(MovementJob::Kick).unwrap();

        ctx.queue.acquire_permit();
        assert!(ctx.queue.try_pop(false).is_some());
        assert!(!ctx.is_settled());

        // 队列里还有 Kick，不广播
        assert!(!ctx.completion.broadcast_if(|| ctx.queue.finish_job()));
        assert!(!ctx.is_settled());

        assert_eq!(ctx.reset_queue(), 1);
        assert!(ctx.is_settled());
        assert!(ctx.completion.wait_until_timeout(|| ctx.is_settled(), Duration::from_millis(10)));
        assert_eq!(ctx.queue.pending_permits(), 0);
    }

    /// 任务执行中重置：要等 worker 结束当前任务
    #[test]
    fn test_reset_during_job_waits_for_finish() {
        let ctx = context();
        ctx.queue.push(MovementJob::Delay { ms: 50 }).unwrap();
        ctx.queue.push(MovementJob::Kick).unwrap();

        ctx.queue.acquire_permit();
        assert!(ctx.queue.try_pop(false).is_some());
        assert_eq!(ctx.reset_queue(), 1);
        assert!(ctx.interrupt.load(Ordering::Acquire));
        assert!(!ctx.is_settled());

        assert!(ctx.completion.broadcast_if(|| ctx.queue.finish_job()));
        assert!(ctx.is_settled());
    }
}
