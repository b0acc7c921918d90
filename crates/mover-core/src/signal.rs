//! 通知原语
//!
//! - [`WakeSignal`]: 计数唤醒信号，每个入队任务一个许可，worker 每次出队消耗一个
//! - [`CompletionSignal`]: 广播信号，一次唤醒所有阻塞的等待者（队列排空 / worker 退出）
//!
//! 两者都基于 `parking_lot::Mutex` + `Condvar`，没有轮询。

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// 计数唤醒信号（计数信号量）
#[derive(Debug, Default)]
pub struct WakeSignal {
    permits: Mutex<usize>,
    available: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 释放 `n` 个许可
    pub fn release(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut permits = self.permits.lock();
        *permits += n;
        if n == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
    }

    /// 阻塞直到获得一个许可
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// 非阻塞地收回最多 `n` 个许可，返回实际收回数量
    ///
    /// 队列重置时使用：worker 可能已经拿走了一个许可但还没取到任务，
    /// 此时可用许可比被丢弃的任务少一个，阻塞等待会永远等不到。
    pub fn try_acquire_many(&self, n: usize) -> usize {
        let mut permits = self.permits.lock();
        let taken = n.min(*permits);
        *permits -= taken;
        taken
    }

    /// 当前可用许可数
    pub fn permits(&self) -> usize {
        *self.permits.lock()
    }
}

/// 广播完成信号
///
/// 等待条件在信号锁内求值，通知方在同一把锁内修改状态后 `notify_all`，
/// 因此不会丢失唤醒；谓词已满足时 `wait_until` 立即返回。
#[derive(Debug, Default)]
pub struct CompletionSignal {
    lock: Mutex<()>,
    cond: Condvar,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在信号锁内执行 `update`，返回 `true` 时唤醒所有等待者
    ///
    /// 返回 `update` 的结果。
    pub fn broadcast_if(&self, update: impl FnOnce() -> bool) -> bool {
        let _guard = self.lock.lock();
        let fire = update();
        if fire {
            self.cond.notify_all();
        }
        fire
    }

    /// 无条件唤醒所有等待者，让它们重新检查各自的条件
    pub fn broadcast(&self) {
        self.broadcast_if(|| true);
    }

    /// 阻塞直到 `ready()` 为真
    pub fn wait_until(&self, mut ready: impl FnMut() -> bool) {
        let mut guard = self.lock.lock();
        while !ready() {
            self.cond.wait(&mut guard);
        }
    }

    /// 带超时版本，返回条件最终是否满足
    pub fn wait_until_timeout(&self, mut ready: impl FnMut() -> bool, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_until(ready);
            return true;
        };
        let mut guard = self.lock.lock();
        while !ready() {
            if self.cond.wait_until(&mut guard, deadline).timed_out() {
                return ready();
            }
        }
        true
    }
}
