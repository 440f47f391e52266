// 日志系统设置

use crate::config::LoggingConfig;
use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 日志系统初始化器
pub struct LoggingSetup;

impl LoggingSetup {
    /// 初始化日志系统
    ///
    /// 启用文件日志时返回写入线程的 guard，调用方需持有到进程退出，
    /// 否则缓冲区中的日志会丢失。
    pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
        let env_filter = Self::build_filter(&config.level);

        let stdout_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            "pretty" => fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            _ => fmt::layer().compact().with_target(true).boxed(),
        };

        let (file_layer, guard) = match (config.file_enabled, config.file_path.as_deref()) {
            (true, Some(path)) => {
                let (directory, prefix) = Self::split_log_path(path);
                let appender = tracing_appender::rolling::daily(directory, prefix);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed();
                (Some(layer), Some(guard))
            }
            _ => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()?;

        tracing::info!(level = %config.level, format = %config.format, "日志系统初始化完成");
        if let Some(path) = config.file_path.as_deref().filter(|_| config.file_enabled) {
            tracing::info!(path = %path, "文件日志已启用（按天滚动）");
        }

        Ok(guard)
    }

    /// RUST_LOG 优先，其次是配置的级别，都无效时退回 info
    pub fn build_filter(level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(Self::default_directives(level)))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// 默认过滤指令：应用使用配置级别，SQL 语句日志压到 warn
    pub fn default_directives(level: &str) -> String {
        format!("{level},sqlx=warn,sea_orm=warn")
    }

    /// 把 `./logs/agentdesk.log` 拆成目录和文件名前缀
    pub fn split_log_path(path: &str) -> (String, String) {
        let path = Path::new(path);
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        let prefix = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "agentdesk.log".to_string());
        (directory, prefix)
    }

    /// 创建测试环境日志配置
    pub fn test_config() -> LoggingConfig {
        LoggingConfig {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file_enabled: false,
            file_path: None,
        }
    }
}
