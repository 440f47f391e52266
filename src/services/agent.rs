// AI Agent 服务
// Agent 配置的增删改查，运行时对话不在本服务范围内

use agentdesk_common::{PaginatedResponse, PaginationParams};
use sea_orm::{DatabaseConnection, Set};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::membership::require_workspace_access;
use crate::db::entities::ai_agent::{self, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::db::{AgentRepository, NewAgent};
use crate::errors::AgentDeskError;

const MAX_AGENT_NAME_LENGTH: usize = 255;
const MAX_TEMPERATURE: f64 = 2.0;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAgentRequest {
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub is_active: Option<bool>,
}

/// Agent 信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AgentInfo {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ai_agent::Model> for AgentInfo {
    fn from(model: ai_agent::Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            name: model.name,
            description: model.description,
            system_prompt: model.system_prompt,
            model: model.model,
            temperature: model.temperature,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

fn validate_agent_name(name: &str) -> Result<String, AgentDeskError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AgentDeskError::validation("name", "Agent 名称不能为空"));
    }
    if name.chars().count() > MAX_AGENT_NAME_LENGTH {
        return Err(AgentDeskError::validation(
            "name",
            format!("Agent 名称不能超过 {} 个字符", MAX_AGENT_NAME_LENGTH),
        ));
    }
    Ok(name.to_string())
}

/// 温度必须是 [0, 2] 内的有限数
pub fn validate_temperature(temperature: f64) -> Result<f64, AgentDeskError> {
    if !temperature.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(AgentDeskError::validation(
            "temperature",
            format!("temperature 必须在 0 到 {} 之间", MAX_TEMPERATURE),
        ));
    }
    Ok(temperature)
}

fn validate_model(model: &str) -> Result<String, AgentDeskError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(AgentDeskError::validation("model", "模型名称不能为空"));
    }
    Ok(model.to_string())
}

/// Agent 服务
pub struct AgentService {
    db: Arc<DatabaseConnection>,
}

impl AgentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        request: CreateAgentRequest,
    ) -> Result<AgentInfo, AgentDeskError> {
        let name = validate_agent_name(&request.name)?;
        let model = match request.model.as_deref() {
            Some(model) => validate_model(model)?,
            None => DEFAULT_MODEL.to_string(),
        };
        let temperature = validate_temperature(request.temperature.unwrap_or(DEFAULT_TEMPERATURE))?;

        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;

        let agent = AgentRepository::create(
            self.db.as_ref(),
            NewAgent {
                workspace_id,
                name,
                description: request.description,
                system_prompt: request.system_prompt,
                model,
                temperature,
                created_by: user_id,
            },
        )
        .await?;

        info!(agent_id = %agent.id, "Agent 创建完成");
        Ok(agent.into())
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedResponse<AgentInfo>, AgentDeskError> {
        require_workspace_access(self.db.as_ref(), workspace_id, user_id).await?;
        let page = AgentRepository::list_by_workspace(self.db.as_ref(), workspace_id, params).await?;
        Ok(page.map(AgentInfo::from))
    }

    /// Agent 不存在返回 404，所属工作区无权访问返回 403
    async fn load(&self, user_id: Uuid, agent_id: Uuid) -> Result<ai_agent::Model, AgentDeskError> {
        let agent = AgentRepository::find_by_id(self.db.as_ref(), agent_id)
            .await?
            .ok_or_else(|| AgentDeskError::not_found("Agent"))?;
        require_workspace_access(self.db.as_ref(), agent.workspace_id, user_id).await?;
        Ok(agent)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid, agent_id: Uuid) -> Result<AgentInfo, AgentDeskError> {
        Ok(self.load(user_id, agent_id).await?.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Uuid,
        agent_id: Uuid,
        request: UpdateAgentRequest,
    ) -> Result<AgentInfo, AgentDeskError> {
        let name = request.name.as_deref().map(validate_agent_name).transpose()?;
        let model = request.model.as_deref().map(validate_model).transpose()?;
        let temperature = request.temperature.map(validate_temperature).transpose()?;

        let agent = self.load(user_id, agent_id).await?;
        let mut active: ai_agent::ActiveModel = agent.into();

        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(system_prompt) = request.system_prompt {
            active.system_prompt = Set(Some(system_prompt));
        }
        if let Some(model) = model {
            active.model = Set(model);
        }
        if let Some(temperature) = temperature {
            active.temperature = Set(temperature);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        let updated = AgentRepository::update(self.db.as_ref(), active).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, agent_id: Uuid) -> Result<(), AgentDeskError> {
        let agent = self.load(user_id, agent_id).await?;
        AgentRepository::delete(self.db.as_ref(), agent.id).await?;
        info!(agent_id = %agent_id, "Agent 已删除");
        Ok(())
    }
}
