//! # Mover CLI
//!
//! 基于 `mover-core` 的命令行工具。
//!
//! ```bash
//! # 执行 JSON 脚本
//! mover-cli run demo.json --config mover.toml
//!
//! # 快速试跑演示场景（时间缩放到 1%）
//! mover-cli demo --scale 0.01
//!
//! # 查看生效的配置
//! mover-cli config --config mover.toml
//! ```
//!
//! 日志级别通过 `RUST_LOG` 控制，例如 `RUST_LOG=mover_core=debug`。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod script;
mod utils;

use commands::{ConfigCommand, DemoCommand, RunCommand};

/// Mover CLI - 运动命令执行器工具
#[derive(Parser, Debug)]
#[command(name = "mover-cli")]
#[command(about = "Command-line script runner for the movement executor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 执行脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 运行演示场景
    Demo {
        #[command(flatten)]
        args: DemoCommand,
    },

    /// 打印生效的配置
    Config {
        #[command(flatten)]
        args: ConfigCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mover_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Demo { args } => args.execute(),
        Commands::Config { args } => args.execute(),
    }
}
