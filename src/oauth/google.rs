// Google OAuth 2.0 授权码流程

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::provider::{OAuthGrant, OAuthProvider, OAuthTokenSet};
use crate::config::GoogleOAuthConfig;
use crate::db::entities::external_connection::ConnectionType;
use crate::errors::AgentDeskError;

const DRIVE_READONLY: &str = "https://www.googleapis.com/auth/drive.readonly";
const SHEETS_READONLY: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
const DOCS_READONLY: &str = "https://www.googleapis.com/auth/documents.readonly";
const ANALYTICS_READONLY: &str = "https://www.googleapis.com/auth/analytics.readonly";
const USERINFO_EMAIL: &str = "https://www.googleapis.com/auth/userinfo.email";

/// Google 令牌端点的错误响应
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(default)]
    email: Option<String>,
}

/// Google OAuth 提供方
#[derive(Debug, Clone)]
pub struct GoogleOAuthProvider {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthProvider {
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, AgentDeskError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| AgentDeskError::configuration(format!("创建 HTTP 客户端失败: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.client_secret.is_empty()
    }

    fn ensure_configured(&self) -> Result<(), AgentDeskError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(AgentDeskError::service_unavailable("Google OAuth 未配置"))
        }
    }

    /// 读取令牌端点的错误信息
    async fn token_error(response: reqwest::Response) -> AgentDeskError {
        let status = response.status();
        let message = match response.json::<GoogleErrorBody>().await {
            Ok(body) => match body.error_description {
                Some(description) => format!("{}: {}", body.error, description),
                None => body.error,
            },
            Err(_) => format!("令牌端点返回 {}", status),
        };
        AgentDeskError::external_service("google", message)
    }

    /// 获取授权账号邮箱，失败只记录警告
    async fn fetch_account_email(&self, access_token: &str) -> Option<String> {
        let response = self
            .client
            .get(&self.config.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => response
                .json::<GoogleUserInfo>()
                .await
                .ok()
                .and_then(|info| info.email),
            Ok(response) => {
                warn!(status = %response.status(), "获取 Google 账号信息失败");
                None
            }
            Err(e) => {
                warn!(error = %e, "请求 Google 账号信息失败");
                None
            }
        }
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn scopes(&self, connection_type: ConnectionType) -> Vec<String> {
        let scopes: &[&str] = match connection_type {
            ConnectionType::GoogleSheets => &[SHEETS_READONLY, DRIVE_READONLY, USERINFO_EMAIL],
            ConnectionType::GoogleDocs => &[DOCS_READONLY, DRIVE_READONLY, USERINFO_EMAIL],
            ConnectionType::GoogleAnalytics => &[ANALYTICS_READONLY, USERINFO_EMAIL],
        };
        scopes.iter().map(|s| s.to_string()).collect()
    }

    fn authorization_url(
        &self,
        connection_type: ConnectionType,
        state: &str,
    ) -> Result<String, AgentDeskError> {
        self.ensure_configured()?;

        let scope = self.scopes(connection_type).join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_endpoint,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("include_granted_scopes", "true"),
                ("state", state),
            ],
        )
        .map_err(|e| AgentDeskError::configuration(format!("Google 授权地址无效: {}", e)))?;

        Ok(url.into())
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<OAuthGrant, AgentDeskError> {
        self.ensure_configured()?;

        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.config.token_endpoint)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::token_error(response).await);
        }

        let tokens: OAuthTokenSet = response.json().await.map_err(|e| {
            AgentDeskError::external_service("google", format!("令牌响应格式错误: {}", e))
        })?;
        debug!(has_refresh_token = tokens.refresh_token.is_some(), "Google 令牌交换成功");

        let account_email = self.fetch_account_email(&tokens.access_token).await;
        Ok(OAuthGrant {
            tokens,
            account_email,
        })
    }
}
