//! run 命令
//!
//! 执行脚本文件

use anyhow::{Result, bail};
use clap::Args;
use mover_core::recording::RecordingActuator;
use mover_core::{Actuator, LoggingActuator, MoverBuilder};
use std::path::PathBuf;
use std::sync::Arc;

use crate::commands::config::load_config;
use crate::script::ScriptExecutor;
use crate::utils::{install_ctrlc, print_metrics};

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径（JSON）
    pub script: PathBuf,

    /// 配置文件路径（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,

    /// 结束后打印下发给执行机构的指令
    #[arg(long)]
    pub show_commands: bool,
}

impl RunCommand {
    /// 执行脚本
    pub fn execute(&self) -> Result<()> {
        println!("📜 加载脚本: {}", self.script.display());

        let script = ScriptExecutor::load_script(&self.script)?;
        let config = load_config(self.config.as_deref())?;

        println!("📋 脚本: {}", script.name);
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }
        println!("    {} 个命令", script.commands.len());
        println!();

        let mut recorded = None;
        let actuator: Arc<dyn Actuator> = if self.show_commands {
            let (actuator, rx) = RecordingActuator::new();
            recorded = Some(rx);
            Arc::new(actuator)
        } else {
            Arc::new(LoggingActuator)
        };

        let mover = Arc::new(MoverBuilder::new().config(config).actuator(actuator).build()?);
        install_ctrlc(&mover)?;

        let result = ScriptExecutor::new(&mover, self.continue_on_error)?.execute(&script);
        mover.kill();

        println!();
        println!("📊 执行结果:");
        println!("  总命令数: {}", result.total_commands);
        println!("  成功: {}", result.succeeded.len());
        println!("  失败: {}", result.failed.len());
        if result.discarded > 0 {
            println!("  重置丢弃: {}", result.discarded);
        }
        println!("  耗时: {:.2} 秒", result.duration_secs);
        print_metrics(&mover.metrics());

        if let Some(rx) = recorded {
            println!();
            println!("🎮 下发指令:");
            let mut start = None;
            for entry in rx.try_iter() {
                let start = *start.get_or_insert(entry.at);
                let offset = entry.at.duration_since(start);
                println!("  +{:>8.1} ms  {}", offset.as_secs_f64() * 1000.0, entry.command);
            }
        }

        if !result.failed.is_empty() {
            println!();
            println!("❌ 失败的命令:");
            for (idx, err) in &result.failed {
                println!("  命令 {}: {}", idx + 1, err);
            }
            bail!("{} 个命令失败", result.failed.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_creation() {
        let cmd = RunCommand {
            script: PathBuf::from("test.json"),
            config: Some(PathBuf::from("mover.toml")),
            continue_on_error: true,
            show_commands: false,
        };

        assert_eq!(cmd.script, PathBuf::from("test.json"));
        assert!(cmd.continue_on_error);
    }

    #[test]
    fn test_missing_script_fails() {
        let cmd = RunCommand {
            script: PathBuf::from("/nonexistent/script.json"),
            config: None,
            continue_on_error: false,
            show_commands: false,
        };

        assert!(cmd.execute().is_err());
    }
}
