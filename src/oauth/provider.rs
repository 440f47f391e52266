// OAuth 提供方抽象

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::external_connection::ConnectionType;
use crate::errors::AgentDeskError;

/// 令牌端点返回的令牌集合，整体加密后存入 oauth_tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    /// access token 有效期（秒）
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub id_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthTokenSet {
    /// 过期时间，`expires_in` 缺失或超出时间范围时为空
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .and_then(Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
    }
}

/// 一次授权码交换的结果
#[derive(Debug, Clone)]
pub struct OAuthGrant {
    pub tokens: OAuthTokenSet,
    /// 授权账号邮箱，获取失败时为空
    pub account_email: Option<String>,
}

/// OAuth 提供方
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// 提供方名称，写入 external_connections.provider
    fn name(&self) -> &'static str;

    /// 该连接类型申请的权限范围
    fn scopes(&self, connection_type: ConnectionType) -> Vec<String>;

    /// 构造授权跳转地址
    fn authorization_url(
        &self,
        connection_type: ConnectionType,
        state: &str,
    ) -> Result<String, AgentDeskError>;

    /// 用授权码换取令牌
    async fn exchange_code(&self, code: &str) -> Result<OAuthGrant, AgentDeskError>;
}
