//! 脚本系统
//!
//! JSON 脚本：按顺序把命令提交给执行器，支持队列控制命令（等待、重置、打断）。

use anyhow::{Context, Result, bail};
use mover_core::{MovementJob, Mover, SleepStrategy, SleepTimer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Instant;

/// 脚本命令序列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 命令序列
    pub commands: Vec<ScriptCommand>,
}

/// 脚本命令
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptCommand {
    /// 速度向量移动
    Move { speed_x: f64, speed_y: f64 },

    /// 沿方向移动（弧度）
    MoveAngle { angle: f64 },

    MoveTo { x: f64, y: f64 },

    MoveToAndStop { x: f64, y: f64 },

    MoveTowards { x: f64, y: f64 },

    MoveToAStar {
        x: f64,
        y: f64,
        #[serde(default)]
        avoid_ball: bool,
        #[serde(default)]
        avoid_enemy: bool,
    },

    /// 原地旋转（弧度）
    Rotate { angle: f64 },

    Stop,

    Kick,

    /// 在队列中插入等待
    Delay { ms: u64 },

    /// 阻塞直到队列排空
    Wait,

    /// 丢弃所有排队任务并打断当前迭代任务
    Reset,

    /// 打断当前迭代任务
    Interrupt,

    /// 脚本本身暂停（不进入队列）
    Sleep { ms: u64 },
}

impl ScriptCommand {
    /// 需要入队的命令转换为任务
    fn to_job(&self) -> Option<MovementJob> {
        let job = match *self {
            ScriptCommand::Move { speed_x, speed_y } => MovementJob::MoveVector { speed_x, speed_y },
            ScriptCommand::MoveAngle { angle } => MovementJob::MoveAngle { angle },
            ScriptCommand::MoveTo { x, y } => MovementJob::MoveTo { x, y },
            ScriptCommand::MoveToAndStop { x, y } => MovementJob::MoveToAndStop { x, y },
            ScriptCommand::MoveTowards { x, y } => MovementJob::MoveTowards { x, y },
            ScriptCommand::MoveToAStar {
                x,
                y,
                avoid_ball,
                avoid_enemy,
            } => MovementJob::MoveToAStar {
                x,
                y,
                avoid_ball,
                avoid_enemy,
            },
            ScriptCommand::Rotate { angle } => MovementJob::Rotate { angle },
            ScriptCommand::Stop => MovementJob::Stop,
            ScriptCommand::Kick => MovementJob::Kick,
            ScriptCommand::Delay { ms } => MovementJob::Delay { ms },
            ScriptCommand::Wait
            | ScriptCommand::Reset
            | ScriptCommand::Interrupt
            | ScriptCommand::Sleep { .. } => return None,
        };
        Some(job)
    }
}

/// 脚本执行器
pub struct ScriptExecutor<'a> {
    mover: &'a Mover,
    /// 失败时是否继续
    continue_on_error: bool,
    /// `Sleep` 命令使用的定时器
    timer: SleepTimer,
}

impl<'a> ScriptExecutor<'a> {
    pub fn new(mover: &'a Mover, continue_on_error: bool) -> Result<Self> {
        let timer = SleepTimer::new(SleepStrategy::Native, 0).context("创建定时器失败")?;
        Ok(Self {
            mover,
            continue_on_error,
            timer,
        })
    }

    /// 加载脚本文件
    pub fn load_script<P: AsRef<std::path::Path>>(path: P) -> Result<Script> {
        let content = fs::read_to_string(path).context("读取脚本文件失败")?;

        let script: Script = serde_json::from_str(&content).context("解析脚本 JSON 失败")?;

        Ok(script)
    }

    /// 执行脚本
    ///
    /// 所有命令提交完毕后等待队列排空。
    pub fn execute(&self, script: &Script) -> ScriptResult {
        let start = Instant::now();
        let mut result = ScriptResult {
            total_commands: script.commands.len(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            discarded: 0,
            duration_secs: 0.0,
        };

        for (i, cmd) in script.commands.iter().enumerate() {
            match self.execute_command(cmd, &mut result) {
                Ok(()) => {
                    println!("  ✅ [{}/{}] {:?}", i + 1, result.total_commands, cmd);
                    result.succeeded.push(i);
                },

                Err(err) => {
                    println!("  ❌ [{}/{}] {:?}: {}", i + 1, result.total_commands, cmd, err);
                    result.failed.push((i, err.to_string()));

                    if !self.continue_on_error {
                        println!();
                        println!("❌ 脚本执行失败，停止提交");
                        break;
                    }
                },
            }
        }

        self.mover.wait_for_completion();
        result.duration_secs = start.elapsed().as_secs_f64();
        result
    }

    /// 执行单个命令
    fn execute_command(&self, cmd: &ScriptCommand, result: &mut ScriptResult) -> Result<()> {
        if let Some(job) = cmd.to_job() {
            self.mover.submit(job)?;
            return Ok(());
        }

        match cmd {
            ScriptCommand::Wait => {
                self.mover.wait_for_completion();
                if self.mover.is_dead() {
                    bail!("执行器已关闭");
                }
            },
            ScriptCommand::Reset => {
                result.discarded += self.mover.reset_queue();
            },
            ScriptCommand::Interrupt => self.mover.interrupt_move(),
            ScriptCommand::Sleep { ms } => self.timer.sleep_ms(*ms)?,
            _ => {},
        }
        Ok(())
    }
}

/// 脚本执行结果
#[derive(Debug)]
pub struct ScriptResult {
    /// 总命令数
    pub total_commands: usize,

    /// 成功的命令索引
    pub succeeded: Vec<usize>,

    /// 失败的命令索引和错误
    pub failed: Vec<(usize, String)>,

    /// `Reset` 丢弃的任务数
    pub discarded: usize,

    /// 脚本执行时长（秒）
    pub duration_secs: f64,
}
