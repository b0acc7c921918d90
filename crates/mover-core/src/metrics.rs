//! 执行器指标
//!
//! 原子计数器，任何线程都可以无锁读取。

use crate::job::JobKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Mover 实时指标
///
/// # 使用示例
///
/// ```rust
/// use mover_core::MoverMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = MoverMetrics::new();
/// metrics.jobs_submitted.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.jobs_submitted, 1);
/// ```
#[derive(Debug, Default)]
pub struct MoverMetrics {
    /// 成功入队的任务数
    pub jobs_submitted: AtomicU64,

    /// 被拒绝的提交数（参数非法、队列满、正在关闭）
    pub jobs_rejected: AtomicU64,

    /// 已执行完成的任务数（包括被打断提前结束的）
    pub jobs_executed: AtomicU64,

    /// 被 `interrupt` 提前结束的迭代任务数
    pub jobs_interrupted: AtomicU64,

    /// 被重置丢弃、从未执行的任务数
    pub jobs_discarded: AtomicU64,

    /// 任务异常次数（错误或 panic）
    pub job_faults: AtomicU64,

    /// 空唤醒次数（拿到许可但队列已空）
    pub empty_wakeups: AtomicU64,

    /// 按任务类别统计的执行次数（下标为 [`JobKind::index`]）
    pub executed_by_kind: [AtomicU64; JobKind::COUNT],
}

impl MoverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个结束的任务
    pub fn record_executed(&self, kind: JobKind) {
        self.jobs_executed.fetch_add(1, Ordering::Relaxed);
        self.executed_by_kind[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_submitted: self.jobs_submitted.load(Ordering::Relaxed),
            jobs_rejected: self.jobs_rejected.load(Ordering::Relaxed),
            jobs_executed: self.jobs_executed.load(Ordering::Relaxed),
            jobs_interrupted: self.jobs_interrupted.load(Ordering::Relaxed),
            jobs_discarded: self.jobs_discarded.load(Ordering::Relaxed),
            job_faults: self.job_faults.load(Ordering::Relaxed),
            empty_wakeups: self.empty_wakeups.load(Ordering::Relaxed),
            executed_by_kind: std::array::from_fn(|i| {
                self.executed_by_kind[i].load(Ordering::Relaxed)
            }),
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub jobs_submitted: u64,
    pub jobs_rejected: u64,
    pub jobs_executed: u64,
    pub jobs_interrupted: u64,
    pub jobs_discarded: u64,
    pub job_faults: u64,
    pub empty_wakeups: u64,
    pub executed_by_kind: [u64; JobKind::COUNT],
}

impl MetricsSnapshot {
    /// 已入队但尚未结束也未被丢弃的任务数（含正在执行的）
    pub fn jobs_outstanding(&self) -> u64 {
        self.jobs_submitted
            .saturating_sub(self.jobs_executed)
            .saturating_sub(self.job_faults)
            .saturating_sub(self.jobs_discarded)
    }

    pub fn executed(&self, kind: JobKind) -> u64 {
        self.executed_by_kind[kind.index()]
    }
}
