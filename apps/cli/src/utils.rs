//! 命令共用的工具函数

use anyhow::{Context, Result};
use mover_core::{JobKind, MetricsSnapshot, Mover};
use std::sync::Arc;

/// Ctrl+C 时关闭执行器（当前任务结束后退出，排队任务被丢弃）
pub fn install_ctrlc(mover: &Arc<Mover>) -> Result<()> {
    let mover = mover.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("🛑 收到 Ctrl+C，正在关闭执行器...");
        mover.kill();
    })
    .context("设置 Ctrl+C 处理器失败")
}

/// 打印指标快照
pub fn print_metrics(metrics: &MetricsSnapshot) {
    println!("📈 执行器指标:");
    println!("  已提交: {}", metrics.jobs_submitted);
    println!("  已拒绝: {}", metrics.jobs_rejected);
    println!("  已执行: {}", metrics.jobs_executed);
    println!("  被打断: {}", metrics.jobs_interrupted);
    println!("  被丢弃: {}", metrics.jobs_discarded);
    println!("  异常: {}", metrics.job_faults);

    for kind in JobKind::ALL {
        let count = metrics.executed(kind);
        if count > 0 {
            println!("    {:?}: {}", kind, count);
        }
    }
}
