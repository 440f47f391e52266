// 认证服务
// 处理注册、登录和当前用户查询

use bcrypt::{hash, verify};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::JwtUtils;
use crate::config::SecurityConfig;
use crate::db::entities::user;
use crate::db::UserRepository;
use crate::errors::AgentDeskError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("邮箱正则表达式无效")
});

/// 密码最小长度
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// 注册请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// 显示名称，缺省时取邮箱 @ 前的部分
    pub display_name: Option<String>,
}

/// 登录请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 用户信息
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            created_at: model.created_at.into(),
            last_login_at: model.last_login_at.map(Into::into),
        }
    }
}

/// 登录与注册的响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    /// 有效期（秒）
    pub expires_in: u64,
    pub user: UserInfo,
}

/// 认证服务
pub struct AuthService {
    db: Arc<DatabaseConnection>,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(db: Arc<DatabaseConnection>, security: SecurityConfig) -> Self {
        Self { db, security }
    }

    /// 校验注册参数，返回规范化后的邮箱与显示名称
    pub fn validate_registration(request: &RegisterRequest) -> Result<(String, String), AgentDeskError> {
        let email = request.email.trim().to_lowercase();
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(AgentDeskError::validation("email", "邮箱格式不正确"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AgentDeskError::validation(
                "password",
                format!("密码长度不能少于 {} 位", MIN_PASSWORD_LENGTH),
            ));
        }

        let display_name = match request.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => email.split('@').next().unwrap_or_default().to_string(),
        };

        Ok((email, display_name))
    }

    /// 用户注册
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AgentDeskError> {
        let (email, display_name) = Self::validate_registration(&request)?;

        let password_hash = hash(&request.password, self.security.bcrypt_cost)?;
        let user = UserRepository::create(self.db.as_ref(), email, password_hash, display_name).await?;

        info!(user_id = %user.id, "用户注册成功");
        self.issue(user)
    }

    /// 用户登录，未知邮箱与密码错误返回相同的提示
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AgentDeskError> {
        let invalid = || AgentDeskError::unauthorized("邮箱或密码错误");

        let user = UserRepository::find_by_email(self.db.as_ref(), request.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "密码验证失败");
            return Err(invalid());
        }

        let user = UserRepository::touch_last_login(self.db.as_ref(), user).await?;
        info!(user_id = %user.id, "用户登录成功");
        self.issue(user)
    }

    /// 当前用户信息
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Uuid) -> Result<UserInfo, AgentDeskError> {
        let user = UserRepository::find_by_id(self.db.as_ref(), user_id)
            .await?
            .ok_or_else(|| AgentDeskError::not_found("用户"))?;
        Ok(user.into())
    }

    fn issue(&self, user: user::Model) -> Result<AuthResponse, AgentDeskError> {
        let access_token = JwtUtils::generate_token(user.id, &user.email, &self.security)?;
        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.security.jwt_expiration,
            user: user.into(),
        })
    }
}
