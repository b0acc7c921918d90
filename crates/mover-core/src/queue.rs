//! 命令队列
//!
//! FIFO 任务队列 + 计数唤醒信号，二者的修改顺序固定为：先队列锁，再许可计数。
//! 入队、重置、出队都遵守同一顺序，避免锁顺序死锁。
//!
//! 队列锁使用 `parking_lot::FairMutex`：严格按到达顺序交接，
//! 高竞争下任何调用者都不会饿死。

use crate::error::MoverError;
use crate::job::MovementJob;
use crate::signal::WakeSignal;
use parking_lot::FairMutex;
use std::collections::VecDeque;

struct QueueState {
    jobs: VecDeque<MovementJob>,
    /// worker 持有一个已出队、尚未结束的任务
    running: bool,
    /// 关闭后拒绝所有入队（`kill()` 之后）
    closed: bool,
}

/// 有界命令队列
pub struct CommandQueue {
    state: FairMutex<QueueState>,
    wake: WakeSignal,
    capacity: usize,
    push_attempts: u32,
}

impl CommandQueue {
    /// 创建队列
    ///
    /// `capacity` 和 `push_attempts` 至少为 1（由 `MoverConfig::validate` 保证）。
    pub fn new(capacity: usize, push_attempts: u32) -> Self {
        Self {
            state: FairMutex::new(QueueState {
                jobs: VecDeque::with_capacity(capacity.min(1024)),
                running: false,
                closed: false,
            }),
            wake: WakeSignal::new(),
            capacity: capacity.max(1),
            push_attempts: push_attempts.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 入队（有界重试）
    ///
    /// 队列满时释放锁、让出 CPU 再重试，给 worker 出队的机会；
    /// 成功时恰好释放一个唤醒许可。
    ///
    /// # 错误
    /// - `ShutdownInProgress`: 队列已关闭
    /// - `QueueInsertExhausted`: 重试次数耗尽
    pub fn push(&self, job: MovementJob) -> Result<(), MoverError> {
        for _ in 0..self.push_attempts {
            {
                let mut state = self.state.lock();
                if state.closed {
                    return Err(MoverError::ShutdownInProgress);
                }
                if state.jobs.len() < self.capacity {
                    state.jobs.push_back(job);
                    // 持有队列锁时调整许可，与 clear() 顺序一致
                    self.wake.release(1);
                    return Ok(());
                }
            }
            std::thread::yield_now();
        }

        Err(MoverError::QueueInsertExhausted {
            attempts: self.push_attempts,
            capacity: self.capacity,
        })
    }

    /// 阻塞等待一个唤醒许可（worker 专用）
    pub fn acquire_permit(&self) {
        self.wake.acquire();
    }

    /// 额外释放一个许可，用于唤醒空闲的 worker（关闭流程）
    pub fn wake_worker(&self) {
        self.wake.release(1);
    }

    /// 取出队首任务（worker 专用）
    ///
    /// 取到任务时在同一把锁内标记为执行中，任务不会出现"既不在队列、也不在执行"的间隙。
    /// `dying` 为真时不取任务，任务留给随后的 `clear()` 丢弃。
    pub fn try_pop(&self, dying: bool) -> Option<MovementJob> {
        let mut state = self.state.lock();
        if dying {
            return None;
        }
        let job = state.jobs.pop_front();
        state.running = job.is_some();
        job
    }

    /// 结束当前任务（worker 专用），返回队列是否已排空
    pub fn finish_job(&self) -> bool {
        let mut state = self.state.lock();
        state.running = false;
        state.jobs.is_empty()
    }

    /// worker 是否持有任务
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// 队列为空且没有任务在执行
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.jobs.is_empty() && !state.running
    }

    /// 丢弃所有待执行任务，返回丢弃数量
    ///
    /// 同时收回最多同等数量的唤醒许可：若 worker 已持有某个被丢弃任务的许可，
    /// 它取队列时会发现为空并直接跳过。
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let discarded = state.jobs.len();
        self.wake.try_acquire_many(discarded);
        state.jobs.clear();
        discarded
    }

    /// 关闭队列并丢弃所有任务，返回丢弃数量
    pub fn close(&self) -> usize {
        let mut state = self.state.lock();
        state.closed = true;
        let discarded = state.jobs.len();
        self.wake.try_acquire_many(discarded);
        state.jobs.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().jobs.is_empty()
    }

    /// 当前可用唤醒许可（诊断用）
    pub fn pending_permits(&self) -> usize {
        self.wake.permits()
    }
}
