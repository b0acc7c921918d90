//! 执行器错误类型定义

use thiserror::Error;

/// 执行器错误类型
///
/// 除 `kill()` 外，任何错误都不会终止进程或 worker 线程。
#[derive(Error, Debug)]
pub enum MoverError {
    /// 入队重试次数耗尽（队列持续满）
    #[error("Queue insert exhausted after {attempts} attempts (capacity: {capacity})")]
    QueueInsertExhausted { attempts: u32, capacity: usize },

    /// 阻塞等待被取消（定时器池已关闭）
    #[error("Operation cancelled")]
    Cancelled,

    /// 任务执行期间发生异常（错误或 panic）
    ///
    /// 由 worker 就地捕获：清空队列、记录日志，循环继续。
    #[error("Job execution fault: {0}")]
    JobExecutionFault(String),

    /// `kill()` 已开始，新的提交被拒绝
    #[error("Shutdown in progress")]
    ShutdownInProgress,

    /// 无效输入（速度越界、坐标非有限值、配置非法）
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 执行机构（Actuator）返回错误
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// 后台线程创建失败
    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::MoverError;

    /// 测试 MoverError 的 Display 实现
    #[test]
    fn test_mover_error_display() {
        let err = MoverError::QueueInsertExhausted {
            attempts: 10,
            capacity: 64,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("10 attempts") && msg.contains("capacity: 64"));

        assert_eq!(format!("{}", MoverError::Cancelled), "Operation cancelled");
        assert_eq!(
            format!("{}", MoverError::ShutdownInProgress),
            "Shutdown in progress"
        );

        let err = MoverError::JobExecutionFault("boom".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Job execution fault") && msg.contains("boom"));

        let err = MoverError::InvalidInput("speed_x".to_string());
        assert!(format!("{}", err).contains("speed_x"));
    }

    /// 测试 From<std::io::Error> 转换
    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::other("no threads left");
        let err: MoverError = io.into();
        match err {
            MoverError::ThreadSpawn(e) => assert!(e.to_string().contains("no threads left")),
            _ => panic!("Expected ThreadSpawn variant"),
        }
    }
}
