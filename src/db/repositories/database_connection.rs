// 数据库连接仓储实现

use crate::db::entities::{database_connection, prelude::*};
use crate::errors::AgentDeskError;
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

/// 数据库连接仓储
pub struct DatabaseConnectionRepository;

impl DatabaseConnectionRepository {
    #[instrument(skip(db, encrypted_config))]
    pub async fn create(
        db: &DatabaseConnection,
        workspace_id: Uuid,
        name: String,
        db_type: DatabaseType,
        encrypted_config: String,
        created_by: Uuid,
    ) -> Result<database_connection::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let active = database_connection::ActiveModel {
            id: Set(Uuid::new_v4()),
            workspace_id: Set(workspace_id),
            name: Set(name),
            db_type: Set(db_type),
            encrypted_config: Set(encrypted_config),
            created_by: Set(created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = active.insert(db).await?;
        info!(database_connection_id = %result.id, "数据库连接已保存");
        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<database_connection::Model>, AgentDeskError> {
        Ok(DatabaseConnectionEntity::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_by_workspace(
        db: &DatabaseConnection,
        workspace_id: Uuid,
    ) -> Result<Vec<database_connection::Model>, AgentDeskError> {
        let connections = DatabaseConnectionEntity::find()
            .filter(database_connection::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(database_connection::Column::Name)
            .all(db)
            .await?;
        Ok(connections)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AgentDeskError> {
        let result = DatabaseConnectionEntity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AgentDeskError::not_found("数据库连接"));
        }
        Ok(())
    }
}
