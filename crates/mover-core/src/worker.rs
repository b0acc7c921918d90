//! Worker 线程主循环
//!
//! 唯一的执行线程：串行消费队列，任务之间永远不会重叠。
//!
//! ```text
//! Booting ─→ Idle ─(许可)→ Executing ─→ Draining ─┐
//!              ↑                                  │
//!              └──────────────────────────────────┘
//!   (任意循环顶部观察到 die) ─→ Dying ─→ Dead
//! ```
//!
//! 任务内的错误或 panic 就地捕获：清空队列、记录日志，循环继续。

use crate::context::MoverContext;
use crate::error::MoverError;
use crate::job::MovementJob;
use crate::motion::{JobOutcome, JobRunner};
use crate::state::WorkerState;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, warn};

pub(crate) fn worker_loop(ctx: Arc<MoverContext>) {
    info!("Mover worker started");
    ctx.state.set(WorkerState::Booting);
    warm_up(&ctx);

    while !ctx.die.load(Ordering::Acquire) {
        ctx.state.set(WorkerState::Idle);
        ctx.queue.acquire_permit();

        let dying = ctx.die.load(Ordering::Acquire);
        ctx.interrupt.store(false, Ordering::Release);
        ctx.state.set(WorkerState::Executing);

        match ctx.queue.try_pop(dying) {
            Some(job) => execute(&ctx, job),
            None if !dying => {
                // 许可对应的任务已被重置丢弃
                ctx.metrics.empty_wakeups.fetch_add(1, Ordering::Relaxed);
            },
            None => {},
        }

        ctx.state.set(WorkerState::Draining);
        // 每个任务结束都清除执行标记；队列排空时唤醒等待者
        let drained = ctx.completion.broadcast_if(|| ctx.queue.finish_job());
        if drained {
            debug!("Queue drained, waking waiters");
        }
    }

    shut_down(&ctx);
}

/// 预热定时器，避免首次定时等待的延迟尖峰
fn warm_up(ctx: &MoverContext) {
    for _ in 0..ctx.config.warmup_rounds {
        if let Err(e) = ctx.timer.sleep(ctx.config.warmup_sleep()) {
            warn!("Timer warm-up aborted: {}", e);
            break;
        }
    }
}

fn execute(ctx: &MoverContext, job: MovementJob) {
    let kind = job.kind();
    debug!("Executing {} ({:?})", job, kind);
    let runner = JobRunner::new(ctx);

    match panic::catch_unwind(AssertUnwindSafe(|| runner.run(job))) {
        Ok(Ok(JobOutcome::Completed)) => ctx.metrics.record_executed(kind),
        Ok(Ok(JobOutcome::Interrupted)) => {
            // 只有迭代任务会观察打断标志
            debug_assert!(job.is_iterative(), "{} cannot be interrupted", job);
            debug!("{} interrupted", job);
            ctx.metrics.record_executed(kind);
            ctx.metrics.jobs_interrupted.fetch_add(1, Ordering::Relaxed);
        },
        Ok(Err(e)) => handle_fault(ctx, job, e.to_string()),
        Err(payload) => handle_fault(ctx, job, panic_message(payload.as_ref())),
    }
}

fn handle_fault(ctx: &MoverContext, job: MovementJob, reason: String) {
    ctx.metrics.job_faults.fetch_add(1, Ordering::Relaxed);
    let fault = MoverError::JobExecutionFault(reason);
    error!("{} failed: {}", job, fault);

    let discarded = ctx.reset_queue();
    if discarded > 0 {
        warn!("Discarded {} queued jobs after fault", discarded);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Dying → Dead：释放定时器，唤醒所有等待者和 `kill()` 调用者
fn shut_down(ctx: &MoverContext) {
    ctx.state.set(WorkerState::Dying);
    info!("Mover worker shutting down");

    let leftover = ctx.close_queue();
    if leftover > 0 {
        debug!("Dropped {} jobs during shutdown", leftover);
    }
    ctx.timer.shutdown();
    ctx.state.set(WorkerState::Dead);

    ctx.completion.broadcast_if(|| {
        ctx.dead.store(true, Ordering::SeqCst);
        true
    });
    ctx.shutdown.broadcast();
    info!("Mover worker stopped");
}
