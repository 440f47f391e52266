// Agent API 处理器

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::api::extractors::Pagination;
use crate::api::middleware::AuthenticatedUser;
use crate::api::models::PaginationQuery;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::ErrorResponse;
use crate::services::{AgentInfo, CreateAgentRequest, UpdateAgentRequest};

#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/agents",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    request_body = CreateAgentRequest,
    responses(
        (status = 201, description = "创建成功", body = AgentInfo),
        (status = 400, description = "名称为空或温度越界", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_agent(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<CreateAgentRequest>,
) -> HandlerResult {
    let agent = state
        .agent_service()
        .create(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::created(&req, agent)
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/agents",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "工作区 ID"), PaginationQuery),
    responses((status = 200, description = "Agent 分页列表")),
    security(("bearer_auth" = []))
)]
pub async fn list_agents(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    pagination: Pagination,
) -> HandlerResult {
    let page = state
        .agent_service()
        .list(user.user_id, path.into_inner(), pagination.0)
        .await?;
    HttpResponseBuilder::ok(&req, page)
}

#[utoipa::path(
    get,
    path = "/api/v1/agents/{id}",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Agent 详情", body = AgentInfo),
        (status = 404, description = "Agent 不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_agent(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let agent = state.agent_service().get(user.user_id, path.into_inner()).await?;
    HttpResponseBuilder::ok(&req, agent)
}

#[utoipa::path(
    put,
    path = "/api/v1/agents/{id}",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "Agent ID")),
    request_body = UpdateAgentRequest,
    responses((status = 200, description = "更新成功", body = AgentInfo)),
    security(("bearer_auth" = []))
)]
pub async fn update_agent(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAgentRequest>,
) -> HandlerResult {
    let agent = state
        .agent_service()
        .update(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, agent)
}

#[utoipa::path(
    delete,
    path = "/api/v1/agents/{id}",
    tag = "Agent",
    params(("id" = Uuid, Path, description = "Agent ID")),
    responses((status = 204, description = "已删除")),
    security(("bearer_auth" = []))
)]
pub async fn delete_agent(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    state
        .agent_service()
        .delete(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::no_content()
}

/// 挂在 `/workspaces` 作用域下
pub fn configure_workspace_agent_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}/agents", web::post().to(create_agent))
        .route("/{id}/agents", web::get().to(list_agents));
}

pub fn configure_agent_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/agents")
            .route("/{id}", web::get().to(get_agent))
            .route("/{id}", web::put().to(update_agent))
            .route("/{id}", web::delete().to(delete_agent)),
    );
}
