// 外部连接与数据源 API 处理器

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::api::middleware::AuthenticatedUser;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::ErrorResponse;
use crate::services::{ConnectionInfo, DataSourceInfo};

/// 列出工作区的外部连接，配置已解密，不含令牌
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/connections",
    tag = "Connection",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    responses((status = 200, description = "连接列表", body = [ConnectionInfo])),
    security(("bearer_auth" = []))
)]
pub async fn list_connections(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let connections = state
        .connection_service()
        .list(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, connections)
}

#[utoipa::path(
    delete,
    path = "/api/v1/connections/{id}",
    tag = "Connection",
    params(("id" = Uuid, Path, description = "连接 ID")),
    responses(
        (status = 204, description = "已删除，令牌与数据源一并删除"),
        (status = 404, description = "连接不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_connection(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    state
        .connection_service()
        .delete(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::no_content()
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/data-sources",
    tag = "Connection",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    responses((status = 200, description = "数据源列表", body = [DataSourceInfo])),
    security(("bearer_auth" = []))
)]
pub async fn list_data_sources(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let sources = state
        .connection_service()
        .list_data_sources(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, sources)
}

/// 挂在 `/workspaces` 作用域下
pub fn configure_workspace_connection_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}/connections", web::get().to(list_connections))
        .route("/{id}/data-sources", web::get().to(list_data_sources));
}

pub fn configure_connection_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/connections/{id}", web::delete().to(delete_connection));
}
