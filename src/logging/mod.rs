//! 日志系统

use crate::error::StateError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: String,
    /// 日志文件路径
    pub file_path: Option<String>,
    /// 是否启用彩色输出
    pub colored: bool,
    /// 是否显示线程ID
    pub show_thread_id: bool,
    /// 是否显示目标模块
    pub show_target: bool,
    /// 日志轮转配置
    pub rotation: LogRotation,
}

/// 日志轮转配置
#[derive(Debug, Clone, PartialEq)]
pub enum LogRotation {
    /// 不轮转
    Never,
    /// 每小时轮转
    Hourly,
    /// 每天轮转
    Daily,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            colored: true,
            show_thread_id: false,
            show_target: true,
            rotation: LogRotation::Daily,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> tracing::Level {
        match self.level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

/// 初始化日志系统
///
/// 返回的 guard 必须在程序运行期间保持存活，否则文件日志会丢失。
pub fn init_logging(config: LogConfig) -> Result<Option<WorkerGuard>, StateError> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::from_level(config.level_filter()).into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // 控制台输出层
    let console_layer = fmt::layer()
        .with_ansi(config.colored)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_id)
        .boxed();

    // 文件输出层
    if let Some(file_path) = config.file_path {
        let file_path = Path::new(&file_path);
        let directory = file_path.parent().unwrap_or(Path::new("."));
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("rigctl.log");

        let (non_blocking_appender, guard) = match config.rotation {
            LogRotation::Never => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path)
                    .map_err(|e| StateError::System(format!("Failed to open log file: {}", e)))?;

                non_blocking(file)
            }
            LogRotation::Hourly => non_blocking(rolling::hourly(directory, file_name)),
            LogRotation::Daily => non_blocking(rolling::daily(directory, file_name)),
        };

        let file_layer = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .json();

        registry
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| StateError::System(format!("Failed to install logger: {}", e)))?;

        Ok(Some(guard))
    } else {
        registry
            .with(console_layer)
            .try_init()
            .map_err(|e| StateError::System(format!("Failed to install logger: {}", e)))?;

        Ok(None)
    }
}

/// 状态变更日志宏
#[macro_export]
macro_rules! state_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "state", $($arg)*)
    };
}

#[macro_export]
macro_rules! state_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "state", $($arg)*)
    };
}

#[macro_export]
macro_rules! state_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "state", $($arg)*)
    };
}

/// 会话日志宏
#[macro_export]
macro_rules! session_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "session", $($arg)*)
    };
}
