// 工作区仓储实现

use super::fetch_page;
use crate::db::entities::{prelude::*, workspace, workspace_member};
use crate::errors::AgentDeskError;
use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

/// 工作区仓储
pub struct WorkspaceRepository;

impl WorkspaceRepository {
    #[instrument(skip(db, description))]
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        organization_id: Uuid,
        name: String,
        description: Option<String>,
        created_by: Uuid,
    ) -> Result<workspace::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let workspace = workspace::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(name),
            description: Set(description),
            created_by: Set(created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = workspace.insert(db).await?;
        info!(workspace_id = %result.id, "工作区创建成功");
        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<workspace::Model>, AgentDeskError> {
        Ok(Workspace::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_by_organization(
        db: &DatabaseConnection,
        organization_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<workspace::Model>, AgentDeskError> {
        let select = Workspace::find()
            .filter(workspace::Column::OrganizationId.eq(organization_id))
            .order_by_desc(workspace::Column::CreatedAt);
        fetch_page(db, select, params).await
    }

    #[instrument(skip(db, workspace), fields(workspace_id = %workspace.id))]
    pub async fn update(
        db: &DatabaseConnection,
        workspace: workspace::Model,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<workspace::Model, AgentDeskError> {
        let mut active: workspace::ActiveModel = workspace.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AgentDeskError> {
        let result = Workspace::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AgentDeskError::not_found("工作区"));
        }
        info!(workspace_id = %id, "工作区已删除");
        Ok(())
    }
}

/// 工作区成员仓储
pub struct WorkspaceMemberRepository;

impl WorkspaceMemberRepository {
    #[instrument(skip(db))]
    pub async fn add<C: ConnectionTrait>(
        db: &C,
        workspace_id: Uuid,
        user_id: Uuid,
        role: WorkspaceRole,
    ) -> Result<workspace_member::Model, AgentDeskError> {
        let member = workspace_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            workspace_id: Set(workspace_id),
            user_id: Set(user_id),
            role: Set(role),
            joined_at: Set(chrono::Utc::now().into()),
        };
        Ok(member.insert(db).await?)
    }
}
