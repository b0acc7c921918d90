//! demo 命令
//!
//! 演示场景：队列中的长等待、速度移动、点位移动，最后等待完成并关闭。
//! `--scale` 按比例缩放所有时间参数（含节拍），便于快速试跑。

use anyhow::{Context, Result, bail};
use clap::Args;
use mover_core::{Mover, MoverConfig, SleepStrategy, SleepTimer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::commands::config::load_config;
use crate::utils::{install_ctrlc, print_metrics};

/// 演示命令参数
#[derive(Args, Debug)]
pub struct DemoCommand {
    /// 时间缩放系数（1.0 = 原始时长）
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// 配置文件路径（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 按比例缩放毫秒数（至少 1 ms）
fn scaled(ms: u64, scale: f64) -> u64 {
    ((ms as f64 * scale).round() as u64).max(1)
}

impl DemoCommand {
    pub fn execute(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("--scale 必须为正数，当前: {}", self.scale);
        }
        let s = |ms: u64| scaled(ms, self.scale);

        let base = load_config(self.config.as_deref())?;
        let config = MoverConfig {
            tick_ms: s(base.tick_ms),
            ..base
        };

        let mover = Arc::new(Mover::new(config)?);
        install_ctrlc(&mover)?;
        let timer = SleepTimer::new(SleepStrategy::Native, 0).context("创建定时器失败")?;
        println!("🚀 执行器已启动");

        // 1. 调用方睡眠不应被队列中的等待阻塞
        println!("⏱️  检查睡眠互不干扰");
        let before = Instant::now();
        mover.delay(s(1000));
        println!("  已加入 {} ms 等待", s(1000));
        for _ in 0..3 {
            timer.sleep_ms(s(100))?;
        }
        mover.delay(s(1000));
        println!("  已加入 {} ms 等待", s(1000));
        println!("  调用方耗时 {} ms", before.elapsed().as_millis());
        mover.wait_for_completion();

        // 2. 速度移动
        println!("➡️  速度移动");
        for i in 0..5 {
            let x = 10.0 * i as f64;
            mover.move_vector(x, 100.0 - x);
            mover.delay(s(1000));
        }
        timer.sleep_ms(s(2500))?;

        // 3. 点位移动
        println!("📍 点位移动");
        for i in 0..5 {
            let x = 10.0 * i as f64;
            mover.move_to(x, 100.0 - x);
            mover.delay(s(1000));
        }
        println!("  排队任务: {}", mover.num_queued_jobs());
        println!("  等待完成...");
        mover.wait_for_completion();

        println!("✅ 完成，关闭执行器");
        mover.kill();
        print_metrics(&mover.metrics());

        if mover.metrics().job_faults > 0 {
            bail!("演示过程中出现任务异常");
        }
        Ok(())
    }
}
