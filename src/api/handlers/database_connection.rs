// 数据库连接 API 处理器

use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::api::middleware::AuthenticatedUser;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::ErrorResponse;
use crate::services::{CreateDatabaseConnectionRequest, DatabaseConnectionInfo};

/// 保存数据库连接，连接参数加密存储
#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{id}/database-connections",
    tag = "Database Connection",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    request_body = CreateDatabaseConnectionRequest,
    responses(
        (status = 201, description = "创建成功", body = DatabaseConnectionInfo),
        (status = 400, description = "类型不支持或配置不是对象", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_database_connection(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<CreateDatabaseConnectionRequest>,
) -> HandlerResult {
    let connection = state
        .database_connection_service()
        .create(user.user_id, path.into_inner(), body.into_inner())
        .await?;
    HttpResponseBuilder::created(&req, connection)
}

#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{id}/database-connections",
    tag = "Database Connection",
    params(("id" = Uuid, Path, description = "工作区 ID")),
    responses((status = 200, description = "连接元数据列表", body = [DatabaseConnectionInfo])),
    security(("bearer_auth" = []))
)]
pub async fn list_database_connections(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    let connections = state
        .database_connection_service()
        .list(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::ok(&req, connections)
}

#[utoipa::path(
    delete,
    path = "/api/v1/database-connections/{id}",
    tag = "Database Connection",
    params(("id" = Uuid, Path, description = "数据库连接 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 404, description = "连接不存在", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_database_connection(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> HandlerResult {
    state
        .database_connection_service()
        .delete(user.user_id, path.into_inner())
        .await?;
    HttpResponseBuilder::no_content()
}

/// 挂在 `/workspaces` 作用域下
pub fn configure_workspace_database_connection_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}/database-connections", web::post().to(create_database_connection))
        .route("/{id}/database-connections", web::get().to(list_database_connections));
}

pub fn configure_database_connection_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/database-connections/{id}",
        web::delete().to(delete_database_connection),
    );
}
