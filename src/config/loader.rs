// 配置加载器
// 处理 .env 文件加载、配置解析与验证

use crate::config::AppConfig;
use agentdesk_common::CommonError;
use config::ConfigError;
use dotenvy::dotenv;
use tracing::{info, warn};

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 加载并验证配置
    ///
    /// 此时日志系统尚未初始化，`.env` 缺失的提示会在日志系统就绪后补记。
    pub fn init() -> Result<AppConfig, CommonError> {
        let dotenv_missing = dotenv().is_err();

        let config = AppConfig::load().map_err(convert_config_error)?;
        config.validate()?;

        if dotenv_missing {
            warn!("未找到 .env 文件，仅使用默认配置、config.toml 与环境变量");
        }

        Ok(config)
    }

    /// 打印配置摘要
    pub fn log_summary(config: &AppConfig) {
        info!(
            environment = %config.environment.name,
            version = %config.environment.version,
            debug = config.environment.debug,
            "配置加载成功"
        );
        info!(
            host = %config.server.host,
            port = config.server.port,
            workers = ?config.server.workers,
            "服务器配置"
        );
        info!(
            min_connections = config.database.min_connections,
            max_connections = config.database.max_connections,
            auto_migrate = config.database.auto_migrate,
            "数据库连接池"
        );
        info!(
            storage_path = %config.storage.path,
            max_file_size = config.storage.max_file_size,
            google_oauth_enabled = !config.oauth.google.client_id.is_empty(),
            "存储与 OAuth 配置"
        );
    }
}

/// 配置错误转换辅助函数
pub fn convert_config_error(err: ConfigError) -> CommonError {
    CommonError::configuration(format!("配置错误: {}", err))
}
