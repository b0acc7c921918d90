//! Worker 状态定义
//!
//! worker 线程在每次状态转换时发布当前状态，其他线程可无锁读取。

use std::sync::atomic::{AtomicU8, Ordering};

/// Worker 状态机
///
/// ```text
/// Booting → Idle → Executing → Draining → Idle → … → Dying → Dead
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WorkerState {
    /// 启动预热（只进入一次）
    #[default]
    Booting = 0,
    /// 阻塞等待唤醒许可
    Idle = 1,
    /// 取出并执行一个任务
    Executing = 2,
    /// 执行完成，检查队列是否排空
    Draining = 3,
    /// 观察到关闭请求，正在释放资源
    Dying = 4,
    /// 终态：线程已退出
    Dead = 5,
}

impl WorkerState {
    /// 从 u8 转换
    ///
    /// 无效值视为 Dead。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Booting,
            1 => Self::Idle,
            2 => Self::Executing,
            3 => Self::Draining,
            4 => Self::Dying,
            _ => Self::Dead,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Worker 状态（原子版本，用于线程间共享）
#[derive(Debug, Default)]
pub struct AtomicWorkerState {
    inner: AtomicU8,
}

impl AtomicWorkerState {
    pub fn new(state: WorkerState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, state: WorkerState) {
        self.inner.store(state.as_u8(), Ordering::Release);
    }
}
