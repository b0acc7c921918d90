//! Mover API 模块
//!
//! 提供对外的 `Mover` 结构体，封装 worker 线程、命令队列和通知原语。
//! 所有方法都是 `&self`，可通过 `Arc<Mover>` 在任意多个线程间并发调用。

use crate::builder::MoverBuilder;
use crate::config::MoverConfig;
use crate::context::MoverContext;
use crate::error::MoverError;
use crate::job::MovementJob;
use crate::metrics::MetricsSnapshot;
use crate::state::WorkerState;
use crate::worker::worker_loop;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{JoinHandle, ThreadId};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Extension trait for timeout-capable thread joins
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        // 看门狗线程负责真正的 join
        std::thread::spawn(move || {
            let result = self.join();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(Box::new(
                std::io::Error::new(std::io::ErrorKind::TimedOut, "Thread join timeout"),
            )),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(Box::new(
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "Thread panicked during join",
                ),
            )),
        }
    }
}

/// 运动命令执行器（对外 API）
///
/// 一个专用 worker 线程按提交顺序串行执行运动任务。
///
/// # 示例
///
/// ```rust
/// use mover_core::{Mover, MoverConfig};
///
/// let mover = Mover::new(MoverConfig {
///     tick_ms: 1,
///     warmup_rounds: 0,
///     ..MoverConfig::default()
/// })
/// .unwrap();
///
/// assert!(mover.move_vector(10.0, 20.0));
/// assert!(mover.delay(5));
/// assert!(mover.stop());
///
/// mover.wait_for_completion();
/// assert_eq!(mover.num_queued_jobs(), 0);
///
/// mover.kill();
/// ```
pub struct Mover {
    ctx: Arc<MoverContext>,
    /// worker 线程句柄（第一个完成 `kill()` 的调用者 join）
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl Mover {
    /// 使用默认执行机构（日志）和默认位姿源创建
    pub fn new(config: MoverConfig) -> Result<Self, MoverError> {
        MoverBuilder::new().config(config).build()
    }

    /// 启动 worker 线程（由 Builder 调用）
    pub(crate) fn spawn(ctx: MoverContext) -> Result<Self, MoverError> {
        let ctx = Arc::new(ctx);
        let ctx_worker = ctx.clone();

        let handle = std::thread::Builder::new()
            .name("mover".to_string())
            .spawn(move || worker_loop(ctx_worker))?;
        let worker_id = handle.thread().id();

        info!(
            "Mover started (queue capacity {}, tick {} ms)",
            ctx.config.queue_capacity, ctx.config.tick_ms
        );

        Ok(Self {
            ctx,
            worker: Mutex::new(Some(handle)),
            worker_id,
        })
    }

    /// 提交任务
    ///
    /// # 错误
    /// - `InvalidInput`: 参数非法
    /// - `ShutdownInProgress`: `kill()` 已开始
    /// - `QueueInsertExhausted`: 队列持续满
    pub fn submit(&self, job: MovementJob) -> Result<(), MoverError> {
        let result = job
            .validate(self.ctx.config.max_speed)
            .and_then(|()| {
                if self.ctx.die.load(Ordering::Acquire) {
                    Err(MoverError::ShutdownInProgress)
                } else {
                    self.ctx.queue.push(job)
                }
            });

        match &result {
            Ok(()) => {
                self.ctx.metrics.jobs_submitted.fetch_add(1, Ordering::Relaxed);
                debug!("Queued {}", job);
            },
            Err(_) => {
                self.ctx.metrics.jobs_rejected.fetch_add(1, Ordering::Relaxed);
            },
        }
        result
    }

    /// 提交并把错误折叠为 `bool`
    fn enqueue(&self, job: MovementJob) -> bool {
        match self.submit(job) {
            Ok(()) => true,
            Err(e) => {
                warn!("Rejected {}: {}", job, e);
                false
            },
        }
    }

    /// 以速度向量移动（每个分量范围 [-100, 100]）
    pub fn move_vector(&self, speed_x: f64, speed_y: f64) -> bool {
        self.enqueue(MovementJob::MoveVector { speed_x, speed_y })
    }

    /// 沿给定方向（弧度）移动
    pub fn move_angle(&self, angle: f64) -> bool {
        self.enqueue(MovementJob::MoveAngle { angle })
    }

    pub fn move_to(&self, x: f64, y: f64) -> bool {
        self.enqueue(MovementJob::MoveTo { x, y })
    }

    pub fn move_to_and_stop(&self, x: f64, y: f64) -> bool {
        self.enqueue(MovementJob::MoveToAndStop { x, y })
    }

    pub fn move_towards(&self, x: f64, y: f64) -> bool {
        self.enqueue(MovementJob::MoveTowards { x, y })
    }

    pub fn move_to_astar(&self, x: f64, y: f64, avoid_ball: bool, avoid_enemy: bool) -> bool {
        self.enqueue(MovementJob::MoveToAStar {
            x,
            y,
            avoid_ball,
            avoid_enemy,
        })
    }

    /// 原地旋转（弧度）
    pub fn rotate(&self, angle: f64) -> bool {
        self.enqueue(MovementJob::Rotate { angle })
    }

    pub fn stop(&self) -> bool {
        self.enqueue(MovementJob::Stop)
    }

    pub fn kick(&self) -> bool {
        self.enqueue(MovementJob::Kick)
    }

    /// 在队列中插入等待（执行时不可打断）
    pub fn delay(&self, ms: u64) -> bool {
        self.enqueue(MovementJob::Delay { ms })
    }

    /// 打断当前迭代任务并丢弃所有排队任务，返回丢弃数量
    ///
    /// 不会抢占正在执行的立即任务或 Delay。与入队共用同一把公平锁，
    /// 并发提交要么完整落在重置之前（被丢弃），要么完整落在之后（被执行）。
    pub fn reset_queue(&self) -> usize {
        let discarded = self.ctx.reset_queue();
        if discarded > 0 {
            info!("Queue reset, discarded {} jobs", discarded);
        }
        discarded
    }

    /// 打断当前正在执行的迭代任务（不影响队列）
    pub fn interrupt_move(&self) {
        self.ctx.interrupt.store(true, Ordering::Release);
    }

    /// 关闭执行器，阻塞直到 worker 线程退出并释放定时器
    ///
    /// 幂等：任意多个线程并发调用都会返回。
    pub fn kill(&self) {
        if !self.ctx.die.swap(true, Ordering::AcqRel) {
            info!("Killing mover");
        }

        let discarded = self.ctx.close_queue();
        if discarded > 0 {
            debug!("Discarded {} jobs on kill", discarded);
        }
        // worker 可能阻塞在空队列上，补发一个许可让它看到 die
        self.ctx.queue.wake_worker();

        if std::thread::current().id() == self.worker_id {
            // 从任务回调内部调用：worker 会在当前任务结束后退出
            warn!("kill() called from the worker thread, not waiting for shutdown");
            return;
        }

        self.ctx
            .shutdown
            .wait_until(|| self.ctx.dead.load(Ordering::SeqCst));

        let handle = self.worker.lock().take();
        if let Some(handle) = handle
            && let Err(_e) = handle.join_timeout(self.ctx.config.join_timeout())
        {
            error!(
                "Mover worker panicked or failed to exit within {:?}",
                self.ctx.config.join_timeout()
            );
        }
    }

    /// 阻塞直到队列为空且没有任务在执行
    ///
    /// 已经空闲时立即返回；worker 退出后也会返回。
    pub fn wait_for_completion(&self) {
        if self.on_worker_thread("wait_for_completion") {
            return;
        }
        self.ctx.completion.wait_until(|| self.ctx.is_settled());
    }

    /// 带超时版本，返回是否已排空
    pub fn wait_for_completion_timeout(&self, timeout: Duration) -> bool {
        if self.on_worker_thread("wait_for_completion_timeout") {
            return self.ctx.is_settled();
        }
        self.ctx
            .completion
            .wait_until_timeout(|| self.ctx.is_settled(), timeout)
    }

    fn on_worker_thread(&self, method: &str) -> bool {
        let on_worker = std::thread::current().id() == self.worker_id;
        if on_worker {
            warn!("{}() called from the worker thread, returning immediately", method);
        }
        on_worker
    }

    /// 是否有任务正在执行
    pub fn is_running(&self) -> bool {
        self.ctx.queue.is_running()
    }

    pub fn num_queued_jobs(&self) -> usize {
        self.ctx.queue.len()
    }

    pub fn has_queued_jobs(&self) -> bool {
        !self.ctx.queue.is_empty()
    }

    /// 未被 worker 消费的唤醒许可数（诊断用）
    ///
    /// 空闲时不超过排队任务数 + 1（`kill()` 补发的那一个）。
    pub fn pending_permits(&self) -> usize {
        self.ctx.queue.pending_permits()
    }

    /// worker 当前状态
    pub fn worker_state(&self) -> WorkerState {
        self.ctx.state.get()
    }

    /// worker 是否已退出
    pub fn is_dead(&self) -> bool {
        self.ctx.dead.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    pub fn config(&self) -> &MoverConfig {
        &self.ctx.config
    }
}

impl Drop for Mover {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn fast_config() -> MoverConfig {
        MoverConfig {
            tick_ms: 1,
            warmup_rounds: 0,
            ..MoverConfig::default()
        }
    }

    #[test]
    fn test_mover_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mover>();
    }

    #[test]
    fn test_rejects_invalid_speed() {
        let mover = Mover::new(fast_config()).unwrap();
        assert!(!mover.move_vector(150.0, 0.0));
        assert!(matches!(
            mover.submit(MovementJob::MoveVector {
                speed_x: 0.0,
                speed_y: f64::NAN
            }),
            Err(MoverError::InvalidInput(_))
        ));
        assert_eq!(mover.metrics().jobs_rejected, 2);
        assert_eq!(mover.num_queued_jobs(), 0);
    }

    #[test]
    fn test_wait_for_completion_fast_path() {
        let mover = Mover::new(fast_config()).unwrap();
        assert!(!mover.is_running());
        assert!(!mover.has_queued_jobs());

        let start = Instant::now();
        mover.wait_for_completion();
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_kill_is_idempotent() {
        let mover = Mover::new(fast_config()).unwrap();
        mover.kill();
        assert!(mover.is_dead());
        assert_eq!(mover.worker_state(), WorkerState::Dead);
        mover.kill();
        assert!(mover.is_dead());
    }

    #[test]
    fn test_submit_after_kill_is_rejected() {
        let mover = Mover::new(fast_config()).unwrap();
        mover.kill();
        assert!(!mover.stop());
        assert!(matches!(
            mover.submit(MovementJob::Kick),
            Err(MoverError::ShutdownInProgress)
        ));
    }

    #[test]
    fn test_wait_after_kill_returns() {
        let mover = Mover::new(fast_config()).unwrap();
        mover.kill();
        assert!(mover.wait_for_completion_timeout(Duration::from_millis(10)));
        mover.wait_for_completion();
    }

    #[test]
    fn test_reset_empty_queue() {
        let mover = Mover::new(fast_config()).unwrap();
        assert_eq!(mover.reset_queue(), 0);
        assert_eq!(mover.num_queued_jobs(), 0);
    }
}
