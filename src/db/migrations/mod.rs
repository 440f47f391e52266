// 数据库迁移模块
// 维护 schema_migrations 表并按版本顺序应用 SQL 脚本

use crate::errors::AgentDeskError;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub mod scripts;


pub use scripts::get_all_migrations;

/// 架构验证时要求存在的表
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "organizations",
    "organization_members",
    "workspaces",
    "workspace_members",
    "ai_agents",
    "file_uploads",
    "file_summaries",
    "external_connections",
    "oauth_tokens",
    "workspace_data_sources",
    "database_connections",
];

/// 迁移信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    pub version: String,
    pub name: String,
    pub description: String,
    pub up_sql: String,
    pub down_sql: String,
}

impl Migration {
    /// 计算迁移校验和（SHA-256，覆盖 up 与 down 脚本）
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.up_sql.as_bytes());
        hasher.update(self.down_sql.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// 迁移状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub version: String,
    pub name: String,
    pub applied_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_applied: bool,
    pub checksum: String,
    /// 已应用的脚本在之后被修改过
    pub checksum_mismatch: bool,
}

/// 架构验证结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaValidation {
    pub is_valid: bool,
    pub missing_tables: Vec<String>,
    pub pending_migrations: Vec<String>,
    pub errors: Vec<String>,
}

/// 迁移管理器
pub struct MigrationManager {
    db: Arc<DatabaseConnection>,
}

impl MigrationManager {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 创建迁移记录表
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<(), AgentDeskError> {
        let create_migrations_table = r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version VARCHAR(255) PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                checksum VARCHAR(64) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                execution_time_ms INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_schema_migrations_applied_at
            ON schema_migrations(applied_at);
        "#;

        for statement in split_statements(create_migrations_table) {
            self.db.execute(self.statement(statement)).await?;
        }

        info!("迁移系统初始化完成");
        Ok(())
    }

    /// 获取已应用的迁移
    #[instrument(skip(self))]
    pub async fn get_applied_migrations(&self) -> Result<Vec<MigrationStatus>, AgentDeskError> {
        let rows = self
            .db
            .query_all(self.statement(
                "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
            ))
            .await?;

        let mut migrations = Vec::with_capacity(rows.len());
        for row in rows {
            migrations.push(MigrationStatus {
                version: row.try_get("", "version")?,
                name: row.try_get("", "name")?,
                applied_at: Some(row.try_get("", "applied_at")?),
                is_applied: true,
                checksum: row.try_get("", "checksum")?,
                checksum_mismatch: false,
            });
        }

        Ok(migrations)
    }

    /// 对比可用迁移与已应用记录
    #[instrument(skip(self))]
    pub async fn check_status(&self) -> Result<Vec<MigrationStatus>, AgentDeskError> {
        self.init().await?;

        let applied: HashMap<String, MigrationStatus> = self
            .get_applied_migrations()
            .await?
            .into_iter()
            .map(|m| (m.version.clone(), m))
            .collect();

        Ok(merge_status(get_all_migrations(), &applied))
    }

    /// 应用待处理的迁移，返回本次应用的版本
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<Vec<String>, AgentDeskError> {
        let status = self.check_status().await?;
        let pending: Vec<String> = status
            .into_iter()
            .filter(|s| !s.is_applied)
            .map(|s| s.version)
            .collect();

        let mut applied = Vec::new();
        for migration in get_all_migrations() {
            if pending.contains(&migration.version) {
                self.apply_migration(&migration).await?;
                applied.push(migration.version);
            }
        }

        if applied.is_empty() {
            info!("没有待处理的迁移");
        } else {
            info!(count = applied.len(), "迁移应用完成");
        }

        Ok(applied)
    }

    /// 在单个事务中应用迁移并写入记录
    #[instrument(skip(self, migration), fields(version = %migration.version))]
    async fn apply_migration(&self, migration: &Migration) -> Result<(), AgentDeskError> {
        info!(name = %migration.name, "应用迁移");
        let start_time = std::time::Instant::now();

        let txn = self.db.begin().await?;

        if let Err(e) = self.execute_in_txn(&txn, &migration.up_sql).await {
            txn.rollback().await?;
            return Err(AgentDeskError::database(format!(
                "迁移 {} 执行失败: {}",
                migration.version, e
            )));
        }

        let execution_time = start_time.elapsed().as_millis() as i32;
        let record = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            "INSERT INTO schema_migrations (version, name, description, checksum, execution_time_ms) \
             VALUES ($1, $2, $3, $4, $5)",
            [
                migration.version.clone().into(),
                migration.name.clone().into(),
                migration.description.clone().into(),
                migration.checksum().into(),
                execution_time.into(),
            ],
        );

        if let Err(e) = txn.execute(record).await {
            txn.rollback().await?;
            return Err(AgentDeskError::database(format!(
                "记录迁移 {} 失败: {}",
                migration.version, e
            )));
        }

        txn.commit().await?;

        info!(execution_time_ms = execution_time, "迁移应用成功");
        Ok(())
    }

    /// 回滚指定版本
    #[instrument(skip(self))]
    pub async fn rollback(&self, version: &str) -> Result<(), AgentDeskError> {
        let migration = get_all_migrations()
            .into_iter()
            .find(|m| m.version == version)
            .ok_or_else(|| AgentDeskError::not_found(format!("迁移 {}", version)))?;

        let applied = self.get_applied_migrations().await?;
        if !applied.iter().any(|m| m.version == version) {
            return Err(AgentDeskError::validation("version", format!("迁移 {} 尚未应用", version)));
        }

        warn!(version = %version, "回滚数据库迁移");
        let txn = self.db.begin().await?;

        if let Err(e) = self.execute_in_txn(&txn, &migration.down_sql).await {
            txn.rollback().await?;
            return Err(AgentDeskError::database(format!("迁移 {} 回滚失败: {}", version, e)));
        }

        let delete = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            "DELETE FROM schema_migrations WHERE version = $1",
            [version.into()],
        );
        if let Err(e) = txn.execute(delete).await {
            txn.rollback().await?;
            return Err(AgentDeskError::database(format!("删除迁移记录 {} 失败: {}", version, e)));
        }

        txn.commit().await?;
        info!(version = %version, "迁移回滚完成");
        Ok(())
    }

    /// 验证数据库架构
    #[instrument(skip(self))]
    pub async fn validate_schema(&self) -> Result<SchemaValidation, AgentDeskError> {
        let mut validation = SchemaValidation {
            is_valid: true,
            missing_tables: Vec::new(),
            pending_migrations: Vec::new(),
            errors: Vec::new(),
        };

        for table_name in REQUIRED_TABLES {
            if !self.table_exists(table_name).await? {
                validation.missing_tables.push(table_name.to_string());
            }
        }

        for status in self.check_status().await? {
            if !status.is_applied {
                validation.pending_migrations.push(status.version);
            } else if status.checksum_mismatch {
                validation
                    .errors
                    .push(format!("迁移 {} 的校验和与记录不一致", status.version));
            }
        }

        validation.is_valid = validation.missing_tables.is_empty()
            && validation.pending_migrations.is_empty()
            && validation.errors.is_empty();

        if validation.is_valid {
            info!("数据库架构验证通过");
        } else {
            warn!(?validation, "数据库架构验证失败");
        }

        Ok(validation)
    }

    async fn execute_in_txn(&self, txn: &DatabaseTransaction, sql: &str) -> Result<(), AgentDeskError> {
        for statement in split_statements(sql) {
            txn.execute(self.statement(statement)).await?;
        }
        Ok(())
    }

    async fn table_exists(&self, table_name: &str) -> Result<bool, AgentDeskError> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                self.db.get_database_backend(),
                "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1) AS \"exists\"",
                [table_name.into()],
            ))
            .await?;

        match row {
            Some(row) => Ok(row.try_get("", "exists")?),
            None => Ok(false),
        }
    }

    fn statement(&self, sql: &str) -> Statement {
        Statement::from_string(self.db.get_database_backend(), sql.to_string())
    }
}

/// 按分号拆分 SQL 脚本，去掉空语句
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 合并可用迁移与已应用记录，保持版本顺序
pub fn merge_status(
    available: Vec<Migration>,
    applied: &HashMap<String, MigrationStatus>,
) -> Vec<MigrationStatus> {
    available
        .into_iter()
        .map(|migration| {
            let checksum = migration.checksum();
            match applied.get(&migration.version) {
                Some(record) => {
                    let mismatch = record.checksum != checksum;
                    if mismatch {
                        warn!(version = %migration.version, "迁移校验和不匹配，可能已被修改");
                    }
                    MigrationStatus {
                        checksum_mismatch: mismatch,
                        ..record.clone()
                    }
                }
                None => MigrationStatus {
                    version: migration.version,
                    name: migration.name,
                    applied_at: None,
                    is_applied: false,
                    checksum,
                    checksum_mismatch: false,
                },
            }
        })
        .collect()
}
