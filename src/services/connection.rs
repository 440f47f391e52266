// 外部连接管理服务

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::membership::require_workspace_access;
use crate::crypto::EncryptionService;
use crate::db::entities::external_connection::{self, ConnectionStatus, ConnectionType};
use crate::db::entities::workspace_data_source;
use crate::db::{DataSourceRepository, ExternalConnectionRepository};
use crate::errors::AgentDeskError;
use crate::oauth::ConnectionConfig;

/// 外部连接信息，配置已解密，不含令牌
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub connection_type: ConnectionType,
    pub name: String,
    pub status: ConnectionStatus,
    /// 解密失败时为空
    pub config: Option<ConnectionConfig>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DataSourceInfo {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
    pub source_type: ConnectionType,
    pub name: String,
    pub document_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<workspace_data_source::Model> for DataSourceInfo {
    fn from(model: workspace_data_source::Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            connection_id: model.connection_id,
            source_type: model.source_type,
            name: model.name,
            document_id: model.document_id,
            created_at: model.created_at.into(),
        }
    }
}

pub struct ConnectionService {
    db: Arc<DatabaseConnection>,
    encryption: EncryptionService,
}

impl ConnectionService {
    pub fn new(db: Arc<DatabaseConnection>, encryption: EncryptionService) -> Self {
        Self { db, encryption }
    }

    fn to_info(&self, model: external_connection::Model) -> ConnectionInfo {
        let config = match self.encryption.decrypt_json::<ConnectionConfig>(&model.encrypted_config) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(connection_id = %model.id, error = %e, "连接配置解密失败");
                None
            }
        };

        ConnectionInfo {
            id: model.id,
            workspace_id: model.workspace_id,
            user_id: model.user_id,
            provider: model.provider,
            connection_type: model.connection_type,
            name: model.name,
            status: model.status,
            config,
            created_at: model.created_at.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid, workspace_id: Uuid) -> Result<Vec<ConnectionInfo>, AgentDeskError> {
        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        let connections = ExternalConnectionRepository::list_by_workspace(self.db.as_ref(), workspace_id).await?;
        Ok(connections.into_iter().map(|c| self.to_info(c)).collect())
    }

    /// 令牌与数据源随连接级联删除
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, connection_id: Uuid) -> Result<(), AgentDeskError> {
        let connection = ExternalConnectionRepository::find_by_id(self.db.as_ref(), connection_id)
            .await?
            .ok_or_else(|| AgentDeskError::not_found("外部连接"))?;
        require_workspace_access(self.db.as_ref(), connection.workspace_id, user_id).await?;
        ExternalConnectionRepository::delete(self.db.as_ref(), connection.id).await?;
        info!(connection_id = %connection_id, "外部连接已移除");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_data_sources(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Vec<DataSourceInfo>, AgentDeskError> {
        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        let sources = DataSourceRepository::list_by_workspace(self.db.as_ref(), workspace_id).await?;
        Ok(sources.into_iter().map(Into::into).collect())
    }
}
