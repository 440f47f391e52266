// 工作区 API 处理器

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::api::extractors::Pagination;
use crate::api::middleware::AuthenticatedUser;
use crate::api::models::PaginationQuery;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::ErrorResponse;
use crate::services::{CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceInfo};

/// 在组织下创建工作区，创建者成为工作区管理员
#[utoipa::path(
    post,
    path = "/api/v1/organizations/{id}/workspaces",
    tag = "Workspace",
    params(("id" = Uuid, Path, description = "组织 ID")),
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "创建成功", body = WorkspaceInfo),
        (status = 400, description = "名称为空或过长", body = ErrorResponse),
        (status = 403, description = "不是组织成员", body = ErrorResponse),
        (status = 404, description = "组织不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_workspace(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<CreateWorkspaceRequest>,
) -> HandlerResult {
    let workspace = state
        .workspace_service()
        .create(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::created(&req, workspace)
}

/// 分页列出组织下的工作区
#[utoipa::path(
    get,
    path = "/api/v1/organizations/{id}/workspaces",
    tag = "Workspace",
    params(("id" = Uuid, Path, description = "组织 ID"), PaginationQuery),
    responses((status = 200, description = "工作区分页列表")),
    security(("bearer_auth" = []))
)]
pub async fn list_workspaces(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    pagination: Pagination,
) -> HandlerResult {
    let page = state
        .workspace_service()
        .list(user.user_id, path.into_inner(), pagination.0)
        .await?;
    HttpResponseBuilder::ok(&req, page)
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}",
    tag = "Workspace",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    responses(
        (status = 200, description = "工作区详情", body = WorkspaceInfo),
        (status = 404, description = "工作区不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_workspace(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let workspace = state
        .workspace_service()
        .get(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, workspace)
}

#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{id}",
    tag = "Workspace",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    request_body = UpdateWorkspaceRequest,
    responses((status = 200, description = "更新成功", body = WorkspaceInfo)),
    security(("bearer_auth" = []))
)]
pub async fn update_workspace(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateWorkspaceRequest>,
) -> HandlerResult {
    let workspace = state
        .workspace_service()
        .update(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, workspace)
}

#[utoipa::path(
    delete,
    path = "/api/v1/workspaces/{id}",
    tag = "Workspace",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 403, description = "需要组织所有者或管理员", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_workspace(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    state
        .workspace_service()
        .delete(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::no_content()
}

/// 挂在 `/organizations` 作用域下
pub fn configure_organization_workspace_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}/workspaces", web::post().to(create_workspace))
        .route("/{id}/workspaces", web::get().to(list_workspaces));
}

/// 挂在 `/workspaces` 作用域下
pub fn configure_workspace_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}", web::get().to(get_workspace))
        .route("/{id}", web::put().to(update_workspace))
        .route("/{id}", web::delete().to(delete_workspace));
}
