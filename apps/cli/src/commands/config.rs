//! 配置管理命令
//!
//! 从 TOML 文件加载执行器配置，缺省字段使用默认值。

use anyhow::{Context, Result};
use clap::Args;
use mover_core::MoverConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// 加载配置（未指定文件时使用默认配置）
pub fn load_config(path: Option<&Path>) -> Result<MoverConfig> {
    let Some(path) = path else {
        return Ok(MoverConfig::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
    let config: MoverConfig = toml::from_str(&content).context("解析配置 TOML 失败")?;
    config.validate().context("配置无效")?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// 配置命令参数
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// 配置文件路径（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigCommand {
    /// 打印生效的配置
    pub fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;

        match &self.config {
            Some(path) => println!("# 配置文件: {}", path.display()),
            None => println!("# 默认配置"),
        }
        print!("{}", toml::to_string_pretty(&config).context("序列化配置失败")?);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mover_core::SleepStrategy;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: MoverConfig = toml::from_str(
            r#"
            tick_ms = 10
            sleep_strategy = "native"
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_ms, 10);
        assert_eq!(config.sleep_strategy, SleepStrategy::Native);
        assert_eq!(config.queue_capacity, MoverConfig::default().queue_capacity);
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = toml::to_string_pretty(&MoverConfig::default()).unwrap();
        let parsed: MoverConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, MoverConfig::default());
    }

    #[test]
    fn test_load_config_without_path() {
        assert_eq!(load_config(None).unwrap(), MoverConfig::default());
    }
}
