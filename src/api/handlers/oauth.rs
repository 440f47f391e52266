// OAuth 连接 API 处理器

use actix_web::{web, HttpRequest};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::middleware::AuthenticatedUser;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::db::entities::external_connection::ConnectionType;
use crate::errors::{AgentDeskError, ErrorResponse};
use crate::oauth::{ExchangeOutcome, InitiateConnect, InitiateConnectResponse};

/// 发起授权的查询参数，按字符串接收以便返回具体的校验信息
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InitiateQuery {
    /// 工作区 ID
    pub workspace_id: Option<String>,
    /// google_sheets、google_docs 或 google_analytics
    pub connection_type: Option<String>,
    /// 可选的文档 ID
    pub document_id: Option<String>,
}

impl InitiateQuery {
    pub fn into_request(self) -> Result<InitiateConnect, AgentDeskError> {
        let workspace_id = self
            .workspace_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AgentDeskError::validation("workspace_id", "缺少 workspace_id"))?;
        let workspace_id = Uuid::parse_str(workspace_id)
            .map_err(|_| AgentDeskError::validation("workspace_id", "workspace_id 不是有效的 UUID"))?;

        let connection_type: ConnectionType = self
            .connection_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AgentDeskError::validation("connection_type", "缺少 connection_type"))?
            .parse()
            .map_err(|e: String| AgentDeskError::validation("connection_type", e))?;

        let document_id = self
            .document_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(InitiateConnect {
            workspace_id,
            connection_type,
            document_id,
        })
    }
}

/// 授权码交换请求
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ExchangeRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
}

/// 生成 Google 授权地址
#[utoipa::path(
    get,
    path = "/api/v1/oauth/google",
    tag = "OAuth",
    params(InitiateQuery),
    responses(
        (status = 200, description = "授权地址", body = InitiateConnectResponse),
        (status = 400, description = "参数缺失或不合法", body = ErrorResponse),
        (status = 403, description = "不是工作区所属组织的成员", body = ErrorResponse),
        (status = 404, description = "工作区不存在", body = ErrorResponse),
        (status = 503, description = "Google OAuth 未配置", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn initiate_google(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<InitiateQuery>,
) -> HandlerResult {
    let request = query.into_inner().into_request()?;
    let response = state.connect_service().initiate(user.user_id, request).await?;
    HttpResponseBuilder::ok(&req, response)
}

/// 用授权码完成连接
///
/// state 超过有效期返回 400；数据源登记失败时仍返回成功，`data_source_registered` 为 false。
#[utoipa::path(
    post,
    path = "/api/v1/oauth/google",
    tag = "OAuth",
    request_body = ExchangeRequest,
    responses(
        (status = 200, description = "连接已建立", body = ExchangeOutcome),
        (status = 400, description = "缺少参数或 state 无效、过期", body = ErrorResponse),
        (status = 403, description = "state 与当前用户不符或无权访问工作区", body = ErrorResponse),
        (status = 404, description = "工作区不存在", body = ErrorResponse),
        (status = 502, description = "令牌交换失败", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn exchange_google(
    req: HttpRequest,
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ExchangeRequest>,
) -> HandlerResult {
    let body = body.into_inner();
    let outcome = state
        .connect_service()
        .exchange(user.user_id, &body.code, &body.state)
        .await?;
    HttpResponseBuilder::ok(&req, outcome)
}

pub fn configure_oauth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/oauth")
            .route("/google", web::get().to(initiate_google))
            .route("/google", web::post().to(exchange_google)),
    );
}
