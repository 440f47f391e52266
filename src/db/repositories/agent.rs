// AI Agent 仓储实现

use super::fetch_page;
use crate::db::entities::{ai_agent, prelude::*};
use crate::errors::AgentDeskError;
use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::*;
use tracing::{info, instrument};
use uuid::Uuid;

/// 新建 Agent 所需字段
#[derive(Debug, Clone)]
pub struct NewAgent {
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub created_by: Uuid,
}

/// Agent 仓储
pub struct AgentRepository;

impl AgentRepository {
    #[instrument(skip(db, agent), fields(workspace_id = %agent.workspace_id))]
    pub async fn create(db: &DatabaseConnection, agent: NewAgent) -> Result<ai_agent::Model, AgentDeskError> {
        let now = chrono::Utc::now();
        let active = ai_agent::ActiveModel {
            id: Set(Uuid::new_v4()),
            workspace_id: Set(agent.workspace_id),
            name: Set(agent.name),
            description: Set(agent.description),
            system_prompt: Set(agent.system_prompt),
            model: Set(agent.model),
            temperature: Set(agent.temperature),
            is_active: Set(true),
            created_by: Set(agent.created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let result = active.insert(db).await?;
        info!(agent_id = %result.id, "Agent 创建成功");
        Ok(result)
    }

    #[instrument(skip(db))]
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<Option<ai_agent::Model>, AgentDeskError> {
        Ok(AiAgent::find_by_id(id).one(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn list_by_workspace(
        db: &DatabaseConnection,
        workspace_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<ai_agent::Model>, AgentDeskError> {
        let select = AiAgent::find()
            .filter(ai_agent::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(ai_agent::Column::CreatedAt);
        fetch_page(db, select, params).await
    }

    /// 保存调用方已修改的活动模型
    #[instrument(skip(db, active))]
    pub async fn update(
        db: &DatabaseConnection,
        mut active: ai_agent::ActiveModel,
    ) -> Result<ai_agent::Model, AgentDeskError> {
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(db).await?)
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), AgentDeskError> {
        let result = AiAgent::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(AgentDeskError::not_found("Agent"));
        }
        Ok(())
    }
}
