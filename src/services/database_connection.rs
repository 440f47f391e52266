// 数据库连接服务
// 连接参数整体加密保存，对外只暴露元数据

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::membership::require_workspace_access;
use crate::crypto::EncryptionService;
use crate::db::entities::database_connection::{self, DatabaseType};
use crate::db::DatabaseConnectionRepository;
use crate::errors::AgentDeskError;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDatabaseConnectionRequest {
    pub name: String,
    /// postgres、mysql、sqlite 或 mssql
    pub db_type: String,
    /// 连接参数，必须是 JSON 对象
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
}

/// 数据库连接元数据，不含连接参数
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatabaseConnectionInfo {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub db_type: DatabaseType,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<database_connection::Model> for DatabaseConnectionInfo {
    fn from(model: database_connection::Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            name: model.name,
            db_type: model.db_type,
            created_by: model.created_by,
            created_at: model.created_at.into(),
        }
    }
}

pub struct DatabaseConnectionService {
    db: Arc<DatabaseConnection>,
    encryption: EncryptionService,
}

impl DatabaseConnectionService {
    pub fn new(db: Arc<DatabaseConnection>, encryption: EncryptionService) -> Self {
        Self { db, encryption }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        request: CreateDatabaseConnectionRequest,
    ) -> Result<DatabaseConnectionInfo, AgentDeskError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AgentDeskError::validation("name", "连接名称不能为空"));
        }
        let db_type: DatabaseType = request
            .db_type
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|e: String| AgentDeskError::validation("db_type", e))?;
        if !request.config.is_object() {
            return Err(AgentDeskError::validation("config", "config 必须是 JSON 对象"));
        }

        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;

        let encrypted_config = self.encryption.encrypt_json(&request.config)?;
        let model = DatabaseConnectionRepository::create(
            self.db.as_ref(),
            workspace_id,
            name.to_string(),
            db_type,
            encrypted_config,
            user_id,
        )
        .await?;

        info!(database_connection_id = %model.id, db_type = ?db_type, "数据库连接创建完成");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Vec<DatabaseConnectionInfo>, AgentDeskError> {
        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        let connections = DatabaseConnectionRepository::list_by_workspace(self.db.as_ref(), workspace_id).await?;
        Ok(connections.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, connection_id: Uuid) -> Result<(), AgentDeskError> {
        let connection = DatabaseConnectionRepository::find_by_id(self.db.as_ref(), connection_id)
            .await?
            .ok_or_else(|| AgentDeskError::not_found("数据库连接"))?;
        require_workspace_access(self.db.as_ref(), connection.workspace_id, user_id).await?;
        DatabaseConnectionRepository::delete(self.db.as_ref(), connection.id).await
    }
}
