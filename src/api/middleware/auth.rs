// 认证
// JWT 签发与校验，以及从 Authorization 头提取当前用户

use actix_web::{dev::Payload, http::header::Header, web, FromRequest, HttpRequest};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::Utc;
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::config::SecurityConfig;
use crate::errors::AgentDeskError;

/// JWT 声明结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// 用户 ID
    pub sub: String,
    pub email: String,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
    /// 签发者
    pub iss: String,
}

/// JWT 工具
pub struct JwtUtils;

impl JwtUtils {
    /// 生成 HS256 令牌
    pub fn generate_token(
        user_id: Uuid,
        email: &str,
        security: &SecurityConfig,
    ) -> Result<String, AgentDeskError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + security.jwt_expiration as i64,
            iss: security.jwt_issuer.clone(),
        };

        encode(
            &JwtHeader::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(security.jwt_secret.as_bytes()),
        )
        .map_err(|e| AgentDeskError::internal(format!("JWT 生成失败: {}", e)))
    }

    /// 校验签名、过期时间和签发者
    pub fn verify_token(token: &str, security: &SecurityConfig) -> Result<JwtClaims, AgentDeskError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[security.jwt_issuer.as_str()]);

        let data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(security.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "JWT 校验失败");
            AgentDeskError::unauthorized("令牌无效或已过期")
        })?;

        Ok(data.claims)
    }
}

/// 已认证用户
///
/// 作为处理器参数使用：缺少、格式错误或过期的令牌返回 401。
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

impl AuthenticatedUser {
    fn from_request_sync(req: &HttpRequest) -> Result<Self, AgentDeskError> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| AgentDeskError::internal("应用状态未注册"))?;

        let authorization = Authorization::<Bearer>::parse(req)
            .map_err(|_| AgentDeskError::unauthorized("缺少有效的 Bearer 令牌"))?;
        let claims = JwtUtils::verify_token(authorization.as_ref().token(), &state.config.security)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AgentDeskError::unauthorized("令牌中的用户 ID 无效"))?;

        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AgentDeskError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_sync(req))
    }
}
