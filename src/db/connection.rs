// 数据库连接管理
// 处理数据库连接池和连接配置

use crate::config::DatabaseConfig;
use crate::errors::AgentDeskError;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::{error, info, instrument};

/// 数据库连接管理器
pub struct DatabaseManager {
    connection: DatabaseConnection,
    config: DatabaseConfig,
}

impl DatabaseManager {
    /// 建立连接池并执行一次健康检查
    #[instrument(skip(config))]
    pub async fn connect(config: DatabaseConfig) -> Result<Self, AgentDeskError> {
        let mut opt = ConnectOptions::new(config.url.clone());

        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .sqlx_logging(true)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        info!(
            url = %Self::mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "连接数据库"
        );

        let connection = Database::connect(opt)
            .await
            .map_err(|e| AgentDeskError::database(format!("数据库连接失败: {}", e)))?;

        let manager = Self { connection, config };
        manager.health_check().await?;
        Ok(manager)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// 取出连接，交给应用状态持有
    pub fn into_connection(self) -> DatabaseConnection {
        self.connection
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// 数据库健康检查
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AgentDeskError> {
        ping(&self.connection).await
    }

    /// 查询数据库版本
    #[instrument(skip(self))]
    pub async fn check_version(&self) -> Result<String, AgentDeskError> {
        let row = self
            .connection
            .query_one(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT version()".to_string(),
            ))
            .await?
            .ok_or_else(|| AgentDeskError::database("无法获取数据库版本"))?;

        let version: String = row
            .try_get("", "version")
            .map_err(|e| AgentDeskError::database(format!("解析版本信息失败: {}", e)))?;
        info!(version = %version, "数据库版本");
        Ok(version)
    }

    /// 关闭数据库连接
    #[instrument(skip(self))]
    pub async fn close(self) -> Result<(), AgentDeskError> {
        self.connection
            .close()
            .await
            .map_err(|e| AgentDeskError::database(format!("关闭数据库连接失败: {}", e)))?;
        info!("数据库连接已关闭");
        Ok(())
    }

    /// 屏蔽密码信息用于日志记录
    pub fn mask_password(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "***".to_string(),
        }
    }
}

/// 执行 `SELECT 1` 检查连接是否可用
pub async fn ping<C: ConnectionTrait>(db: &C) -> Result<(), AgentDeskError> {
    let result = db
        .execute(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            error!(error = %e, "数据库健康检查失败");
            Err(AgentDeskError::service_unavailable(format!("数据库不可用: {}", e)))
        }
    }
}
