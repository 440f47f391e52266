// 外部连接、OAuth 令牌与数据源仓储实现

use crate::db::entities::{
    external_connection, oauth_token, prelude::*, workspace_data_source,
};
use crate::errors::AgentDeskError;
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

/// 新建外部连接所需字段，配置已加密
#[derive(Debug, Clone)]
pub struct NewExternalConnection {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub connection_type: ConnectionType,
    pub name: String,
    pub encrypted_config: String,
}

/// 新建数据源所需字段
#[derive(Debug, Clone)]
pub struct NewDataSource {
    pub workspace_id: Uuid,
    pub connection_id: Uuid,
    pub source_type: ConnectionType,
    pub name: String,
    pub document_id: Option<String>,
}

/// 外部连接仓储
pub struct ExternalConnectionRepository;

impl ExternalConnectionRepository {
    #[instrument(skip(db, connection), fields(workspace_id = %connection.workspace_id))]
    pub async fn create(
        db: &DatabaseConnection,
        connection: NewExternalConnection,
    ) -> Result<external_connection::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let active = external_connection::ActiveModel {
            id: Set(Uuid::new_v4()),
            workspace_id: Set(connection.workspace_id),
            user_id: Set(connection.user_id),
            provider: Set(connection.provider),
            connection_type: Set(connection.connection_type),
            name: Set(connection.name),
            encrypted_config: Set(connection.encrypted_config),
            status: Set(ConnectionStatus::Active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = active.insert(db).await?;
        info!(connection_id = %result.id, "外部连接已保存");
        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<external_connection::Model>, AgentDeskError> {
        Ok(ExternalConnection::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_by_workspace(
        db: &DatabaseConnection,
        workspace_id: Uuid,
    ) -> Result<Vec<external_connection::Model>, AgentDeskError> {
        let connections = ExternalConnection::find()
            .filter(external_connection::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(external_connection::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(connections)
    }

    /// 删除连接，令牌与数据源由外键级联删除
    #[instrument(skip(db))]
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AgentDeskError> {
        let result = ExternalConnection::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AgentDeskError::not_found("外部连接"));
        }
        info!(connection_id = %id, "外部连接已删除");
        Ok(())
    }
}

/// OAuth 令牌仓储
pub struct OAuthTokenRepository;

impl OAuthTokenRepository {
    #[instrument(skip(db, encrypted_tokens))]
    pub async fn create(
        db: &DatabaseConnection,
        connection_id: Uuid,
        encrypted_tokens: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<oauth_token::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let active = oauth_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            connection_id: Set(connection_id),
            encrypted_tokens: Set(encrypted_tokens),
            expires_at: Set(expires_at.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        Ok(active.insert(db).await?)
    }
}

/// 工作区数据源仓储
pub struct DataSourceRepository;

impl DataSourceRepository {
    #[instrument(skip(db, source), fields(connection_id = %source.connection_id))]
    pub async fn create(
        db: &DatabaseConnection,
        source: NewDataSource,
    ) -> Result<workspace_data_source::Model, AgentDeskError> {
        let active = workspace_data_source::ActiveModel {
            id: Set(Uuid::new_v4()),
            workspace_id: Set(source.workspace_id),
            connection_id: Set(source.connection_id),
            source_type: Set(source.source_type),
            name: Set(source.name),
            document_id: Set(source.document_id),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(active.insert(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_by_workspace(
        db: &DatabaseConnection,
        workspace_id: Uuid,
    ) -> Result<Vec<workspace_data_source::Model>, AgentDeskError> {
        let sources = WorkspaceDataSource::find()
            .filter(workspace_data_source::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(workspace_data_source::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(sources)
    }
}
