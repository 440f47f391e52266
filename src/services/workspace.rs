// 工作区服务

use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::membership::{require_organization, require_workspace_access};
use crate::db::entities::prelude::WorkspaceRole;
use crate::db::entities::workspace;
use crate::db::{WorkspaceMemberRepository, WorkspaceRepository};
use crate::errors::AgentDeskError;

/// 工作区名称最大长度
pub const MAX_WORKSPACE_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// 工作区信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkspaceInfo {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<workspace::Model> for WorkspaceInfo {
    fn from(model: workspace::Model) -> Self {
        Self {
            id: model.id,
            organization_id: model.organization_id,
            name: model.name,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// 去除首尾空白后校验名称，返回规范化后的名称
pub fn validate_workspace_name(name: &str) -> Result<String, AgentDeskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AgentDeskError::validation("name", "工作区名称不能为空"));
    }
    if name.chars().count() > MAX_WORKSPACE_NAME_LENGTH {
        return Err(AgentDeskError::validation(
            "name",
            format!("工作区名称不能超过 {} 个字符", MAX_WORKSPACE_NAME_LENGTH),
        ));
    }
    Ok(name.to_string())
}

/// 工作区服务
pub struct WorkspaceService {
    db: Arc<DatabaseConnection>,
}

impl WorkspaceService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 名称校验先于任何数据库访问
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        request: CreateWorkspaceRequest,
    ) -> Result<WorkspaceInfo, AgentDeskError> {
        let name = validate_workspace_name(&request.name)?;
        require_organization(self.db.as_ref(), organization_id, user_id).await?;

        let txn = self.db.begin().await?;
        let workspace =
            WorkspaceRepository::create(&txn, organization_id, name, request.description, user_id).await?;
        WorkspaceMemberRepository::add(&txn, workspace.id, user_id, WorkspaceRole::Admin).await?;
        txn.commit().await?;

        info!(workspace_id = %workspace.id, "工作区创建完成");
        Ok(workspace.into())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<WorkspaceInfo>, AgentDeskError> {
        require_organization(self.db.as_ref(), organization_id, user_id).await?;
        let page = WorkspaceRepository::list_by_organization(self.db.as_ref(), organization_id, params).await?;
        Ok(page.map(WorkspaceInfo::from))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid, workspace_id: Uuid) -> Result<WorkspaceInfo, AgentDeskError> {
        let access = require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        Ok(access.workspace.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        request: UpdateWorkspaceRequest,
    ) -> Result<WorkspaceInfo, AgentDeskError> {
        let name = request
            .name
            .as_deref()
            .map(validate_workspace_name)
            .transpose()?;

        let access = require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        let updated =
            WorkspaceRepository::update(self.db.as_ref(), access.workspace, name, request.description).await?;
        Ok(updated.into())
    }

    /// 需要组织 owner 或 admin
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, workspace_id: Uuid) -> Result<(), AgentDeskError> {
        let access = require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        if !access.can_manage() {
            return Err(AgentDeskError::forbidden("只有组织所有者或管理员可以删除工作区"));
        }
        WorkspaceRepository::delete(self.db.as_ref(), workspace_id).await
    }
}
