// 认证 API 处理器

use actix_web::{web, HttpRequest};

use crate::api::middleware::AuthenticatedUser;
use crate::api::responses::{HandlerResult, HttpResponseBuilder};
use crate::api::state::AppState;
use crate::errors::ErrorResponse;
use crate::services::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};

/// 注册新用户
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "注册成功", body = AuthResponse),
        (status = 400, description = "邮箱或密码不合法", body = ErrorResponse),
        (status = 409, description = "邮箱已被注册", body = ErrorResponse)
    )
)]
pub async fn register(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> HandlerResult {
    let response = state.auth_service().register(body.into_inner()).await?;
    HttpResponseBuilder::created(&req, response)
}

/// 邮箱密码登录
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AuthResponse),
        (status = 401, description = "邮箱或密码错误", body = ErrorResponse)
    )
)]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> HandlerResult {
    let response = state.auth_service().login(body.into_inner()).await?;
    HttpResponseBuilder::ok(&req, response)
}

/// 当前登录用户
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "当前用户", body = UserInfo),
        (status = 401, description = "未认证", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(req: HttpRequest, state: web::Data<AppState>, user: AuthenticatedUser) -> HandlerResult {
    let info = state.auth_service().me(user.user_id).await?;
    HttpResponseBuilder::ok(&req, info)
}

pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/me", web::get().to(me)),
    );
}
