//! 线程安全的定时等待（SleepTimer）
//!
//! 提供不忙等、无漂移、调用间互相隔离的阻塞等待，用于 Delay 任务和迭代运动的节拍。
//!
//! # 设计要点
//!
//! - **单次私有通道**: 每次 `sleep` 都创建自己的 `bounded(1)` 通道，
//!   并发的无关调用永远不会收到彼此的唤醒
//! - **复查剩余时间**: 记录单调时钟起点，每次唤醒后重新计算剩余时长，不足则继续等待
//! - **可取消**: 定时器池关闭后，私有通道的发送端被丢弃，等待方得到 `Cancelled`
//!
//! # 策略
//!
//! - [`SleepStrategy::Scheduled`]: 定时器线程池维护一个最小堆，到期时触发一次性回调
//! - [`SleepStrategy::Native`]: 直接 OS 睡眠（`spin_sleep`，不自旋），外层复查

use crate::config::SleepStrategy;
use crate::error::MoverError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// 超出 `Instant` 表示范围时的等待上限
const FAR_FUTURE: Duration = Duration::from_secs(365 * 24 * 3600);

/// 调度请求：在 `deadline` 唤醒 `waker`
struct TimerRequest {
    deadline: Instant,
    waker: Sender<()>,
}

/// 堆中的待触发条目（按截止时间排序，最早的在堆顶）
struct Pending {
    deadline: Instant,
    seq: u64,
    waker: Sender<()>,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // BinaryHeap 是最大堆，反转后堆顶为最早截止
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn deadline_after(remaining: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(remaining).unwrap_or(now + FAR_FUTURE)
}

/// 定时器线程主循环
///
/// 所有发送端被丢弃时退出，堆中剩余的唤醒端随之丢弃，等待方收到 `Disconnected`。
fn timer_loop(requests: Receiver<TimerRequest>) {
    let mut heap: BinaryHeap<Pending> = BinaryHeap::new();
    let mut seq: u64 = 0;

    loop {
        let received = match heap.peek() {
            Some(next) => requests.recv_deadline(next.deadline),
            None => requests.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(request) => {
                seq = seq.wrapping_add(1);
                heap.push(Pending {
                    deadline: request.deadline,
                    seq,
                    waker: request.waker,
                });
            },
            Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        while heap.peek().is_some_and(|p| p.deadline <= now) {
            if let Some(due) = heap.pop() {
                // 等待方可能已放弃（接收端已丢弃），忽略发送失败
                let _ = due.waker.try_send(());
            }
        }
    }

    debug!("Timer thread exiting, dropping {} pending wake-ups", heap.len());
}

/// 定时等待器
///
/// 可被任意多个线程并发使用（`&self`）。
///
/// # 示例
///
/// ```
/// use mover_core::{SleepStrategy, SleepTimer};
/// use std::time::{Duration, Instant};
///
/// let timer = SleepTimer::new(SleepStrategy::Scheduled, 1).unwrap();
/// let start = Instant::now();
/// timer.sleep(Duration::from_millis(5)).unwrap();
/// assert!(start.elapsed() >= Duration::from_millis(5));
/// timer.shutdown();
/// ```
pub struct SleepTimer {
    strategy: SleepStrategy,
    /// 定时器线程的请求通道（`None` 表示已关闭）
    pool: RwLock<Option<Vec<Sender<TimerRequest>>>>,
    /// 定时器线程句柄（shutdown 时 join）
    handles: Mutex<Vec<JoinHandle<()>>>,
    /// 轮询分配下标
    next: AtomicUsize,
    shut_down: AtomicBool,
}

impl SleepTimer {
    /// 创建定时等待器
    ///
    /// # 参数
    /// - `strategy`: 等待策略
    /// - `threads`: 定时器线程数（`Native` 策略忽略此参数）
    ///
    /// # 错误
    /// - `InvalidInput`: `Scheduled` 策略下 `threads == 0`
    /// - `ThreadSpawn`: 定时器线程创建失败
    pub fn new(strategy: SleepStrategy, threads: usize) -> Result<Self, MoverError> {
        let mut senders = Vec::new();
        let mut handles = Vec::new();

        if strategy == SleepStrategy::Scheduled {
            if threads == 0 {
                return Err(MoverError::InvalidInput(
                    "scheduled sleep timer needs at least one thread".to_string(),
                ));
            }
            for i in 0..threads {
                let (tx, rx) = crossbeam_channel::unbounded::<TimerRequest>();
                let handle = std::thread::Builder::new()
                    .name(format!("mover-timer-{}", i))
                    .spawn(move || timer_loop(rx))?;
                senders.push(tx);
                handles.push(handle);
            }
        }

        Ok(Self {
            strategy,
            pool: RwLock::new(Some(senders)),
            handles: Mutex::new(handles),
            next: AtomicUsize::new(0),
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn strategy(&self) -> SleepStrategy {
        self.strategy
    }

    /// 阻塞至少 `duration`
    ///
    /// `duration` 为 0 时立即返回。
    ///
    /// # 错误
    /// - `Cancelled`: 等待前或等待期间定时器已关闭
    pub fn sleep(&self, duration: Duration) -> Result<(), MoverError> {
        if duration.is_zero() {
            return Ok(());
        }

        let start = Instant::now();
        loop {
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return Ok(());
            }
            let remaining = duration - elapsed;

            match self.strategy {
                SleepStrategy::Scheduled => self.wait_scheduled(remaining)?,
                SleepStrategy::Native => self.wait_native(remaining)?,
            }
        }
    }

    /// 以毫秒为单位的便捷版本
    pub fn sleep_ms(&self, ms: u64) -> Result<(), MoverError> {
        self.sleep(Duration::from_millis(ms))
    }

    fn wait_scheduled(&self, remaining: Duration) -> Result<(), MoverError> {
        // 私有的一次性唤醒通道
        let (waker, woken) = crossbeam_channel::bounded::<()>(1);
        let request = TimerRequest {
            deadline: deadline_after(remaining),
            waker,
        };

        {
            let pool = self.pool.read();
            let senders = match pool.as_ref() {
                Some(senders) if !senders.is_empty() => senders,
                _ => return Err(MoverError::Cancelled),
            };
            let index = self.next.fetch_add(1, Ordering::Relaxed) % senders.len();
            senders[index].send(request).map_err(|_| MoverError::Cancelled)?;
        }

        woken.recv().map_err(|_| MoverError::Cancelled)
    }

    fn wait_native(&self, remaining: Duration) -> Result<(), MoverError> {
        if self.is_shut_down() {
            return Err(MoverError::Cancelled);
        }
        spin_sleep::SpinSleeper::new(0)
            .with_spin_strategy(spin_sleep::SpinStrategy::YieldThread)
            .sleep(remaining);
        if self.is_shut_down() {
            return Err(MoverError::Cancelled);
        }
        Ok(())
    }

    /// 关闭定时器（幂等）
    ///
    /// 丢弃请求通道并 join 所有定时器线程；正在等待的调用返回 `Cancelled`。
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }

        // 先丢弃发送端，定时器线程才能收到 Disconnected
        drop(self.pool.write().take());

        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                error!("Timer thread panicked during shutdown");
            }
        }
        debug!("Sleep timer shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl Drop for SleepTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
