// API 路由定义
// 路由注册、OpenAPI 文档聚合与提取器错误处理

use actix_web::web;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::{
    agent, auth, connection, database_connection, file, health, oauth, organization, workspace,
};
use crate::api::responses::{json_error_handler, path_error_handler, query_error_handler};

/// API 文档聚合
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgentDesk API",
        description = "组织、工作区、AI Agent 与外部数据源连接接口",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        organization::create_organization,
        organization::list_organizations,
        organization::get_organization,
        organization::update_organization,
        organization::delete_organization,
        organization::list_members,
        organization::add_member,
        organization::remove_member,
        workspace::create_workspace,
        workspace::list_workspaces,
        workspace::get_workspace,
        workspace::update_workspace,
        workspace::delete_workspace,
        agent::create_agent,
        agent::list_agents,
        agent::get_agent,
        agent::update_agent,
        agent::delete_agent,
        file::upload_files,
        file::list_files,
        file::delete_file,
        file::get_file_summary,
        file::put_file_summary,
        database_connection::create_database_connection,
        database_connection::list_database_connections,
        database_connection::delete_database_connection,
        oauth::initiate_google,
        oauth::exchange_google,
        connection::list_connections,
        connection::delete_connection,
        connection::list_data_sources,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::api::models::HealthResponse,
        crate::db::DatabaseHealth,
        crate::db::HealthStatus,
        crate::services::RegisterRequest,
        crate::services::LoginRequest,
        crate::services::AuthResponse,
        crate::services::UserInfo,
        crate::services::CreateOrganizationRequest,
        crate::services::UpdateOrganizationRequest,
        crate::services::AddMemberRequest,
        crate::services::OrganizationInfo,
        crate::services::MemberInfo,
        crate::db::entities::prelude::OrganizationRole,
        crate::services::CreateWorkspaceRequest,
        crate::services::UpdateWorkspaceRequest,
        crate::services::WorkspaceInfo,
        crate::services::CreateAgentRequest,
        crate::services::UpdateAgentRequest,
        crate::services::AgentInfo,
        crate::services::FileInfo,
        crate::services::FailedUpload,
        crate::services::UploadResult,
        crate::services::PutSummaryRequest,
        crate::services::FileSummaryInfo,
        crate::services::CreateDatabaseConnectionRequest,
        crate::services::DatabaseConnectionInfo,
        crate::db::entities::prelude::DatabaseType,
        crate::services::ConnectionInfo,
        crate::services::DataSourceInfo,
        crate::db::entities::prelude::ConnectionType,
        crate::db::entities::prelude::ConnectionStatus,
        crate::oauth::ConnectionConfig,
        crate::oauth::ConnectStage,
        crate::oauth::InitiateConnectResponse,
        crate::oauth::ExchangeOutcome,
        oauth::ExchangeRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "健康检查"),
        (name = "Auth", description = "注册、登录与当前用户"),
        (name = "Organization", description = "组织与成员管理"),
        (name = "Workspace", description = "工作区管理"),
        (name = "Agent", description = "AI Agent 配置"),
        (name = "File", description = "文件上传与摘要"),
        (name = "Database Connection", description = "数据库连接"),
        (name = "OAuth", description = "Google OAuth 连接流程"),
        (name = "Connection", description = "外部连接与数据源"),
    )
)]
pub struct ApiDoc;

/// 注册 bearer_auth 安全方案
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// 请求体、查询与路径参数解析失败统一返回 400
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}

/// 工作区作用域下的嵌套资源
fn configure_workspace_scope(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/workspaces")
            .configure(workspace::configure_workspace_routes)
            .configure(agent::configure_workspace_agent_routes)
            .configure(file::configure_workspace_file_routes)
            .configure(database_connection::configure_workspace_database_connection_routes)
            .configure(connection::configure_workspace_connection_routes),
    );
}

/// 配置 API 路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_health_routes).service(
        web::scope("/api/v1")
            .configure(health::configure_health_routes)
            .configure(auth::configure_auth_routes)
            .configure(organization::configure_organization_routes)
            .configure(configure_workspace_scope)
            .configure(agent::configure_agent_routes)
            .configure(file::configure_file_routes)
            .configure(database_connection::configure_database_connection_routes)
            .configure(connection::configure_connection_routes)
            .configure(oauth::configure_oauth_routes),
    );
}

/// Swagger UI 与 OpenAPI JSON，需在 `/api/v1` 作用域之前注册
pub fn configure_swagger_ui(cfg: &mut web::ServiceConfig) {
    cfg.service(SwaggerUi::new("/api/v1/docs/{_:.*}").url("/api/v1/openapi.json", ApiDoc::openapi()));
}

/// 配置全部路由
pub fn configure_all(cfg: &mut web::ServiceConfig) {
    configure_extractors(cfg);
    configure_swagger_ui(cfg);
    configure_routes(cfg);
}
