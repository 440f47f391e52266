// OAuth 连接流程
// 发起授权与回调交换，把外部账号关联到工作区

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::provider::OAuthProvider;
use super::state::OAuthState;
use crate::crypto::EncryptionService;
use crate::db::entities::external_connection::ConnectionType;
use crate::db::{
    DataSourceRepository, ExternalConnectionRepository, NewDataSource, NewExternalConnection,
    OAuthTokenRepository,
};
use crate::errors::AgentDeskError;
use crate::services::membership::require_workspace_access;

/// 连接流程所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStage {
    Start,
    AuthRedirect,
    CodeReceived,
    TokenExchanged,
    ConnectionPersisted,
    DataSourceRegistered,
}

impl ConnectStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectStage::Start => "start",
            ConnectStage::AuthRedirect => "auth_redirect",
            ConnectStage::CodeReceived => "code_received",
            ConnectStage::TokenExchanged => "token_exchanged",
            ConnectStage::ConnectionPersisted => "connection_persisted",
            ConnectStage::DataSourceRegistered => "data_source_registered",
        }
    }

    /// 下一阶段，终态返回 None
    pub fn next(&self) -> Option<ConnectStage> {
        match self {
            ConnectStage::Start => Some(ConnectStage::AuthRedirect),
            ConnectStage::AuthRedirect => Some(ConnectStage::CodeReceived),
            ConnectStage::CodeReceived => Some(ConnectStage::TokenExchanged),
            ConnectStage::TokenExchanged => Some(ConnectStage::ConnectionPersisted),
            ConnectStage::ConnectionPersisted => Some(ConnectStage::DataSourceRegistered),
            ConnectStage::DataSourceRegistered => None,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.next() {
            debug!(from = %self, to = %next, "OAuth 连接阶段变更");
            *self = next;
        }
    }
}

impl fmt::Display for ConnectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 加密保存的连接配置，不含令牌
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionConfig {
    pub provider: String,
    pub connection_type: ConnectionType,
    pub scopes: Vec<String>,
    pub account_email: Option<String>,
    pub document_id: Option<String>,
    pub connected_at: chrono::DateTime<Utc>,
}

/// 发起授权的参数
#[derive(Debug, Clone)]
pub struct InitiateConnect {
    pub workspace_id: Uuid,
    pub connection_type: ConnectionType,
    pub document_id: Option<String>,
}

/// 发起授权的结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InitiateConnectResponse {
    /// 提供方授权地址，客户端应跳转至此
    pub auth_url: String,
    pub stage: ConnectStage,
}

/// 授权码交换结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExchangeOutcome {
    pub connection_id: Uuid,
    pub workspace_id: Uuid,
    pub connection_type: ConnectionType,
    pub data_source_id: Option<Uuid>,
    pub data_source_registered: bool,
    pub stage: ConnectStage,
}

/// OAuth 连接服务
#[derive(Clone)]
pub struct ConnectService {
    db: Arc<DatabaseConnection>,
    encryption: EncryptionService,
    provider: Arc<dyn OAuthProvider>,
    state_ttl_ms: i64,
}

impl ConnectService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        encryption: EncryptionService,
        provider: Arc<dyn OAuthProvider>,
        state_ttl_seconds: i64,
    ) -> Self {
        Self {
            db,
            encryption,
            provider,
            state_ttl_ms: state_ttl_seconds.saturating_mul(1000),
        }
    }

    /// 校验成员关系并生成授权地址
    #[instrument(skip(self, request), fields(workspace_id = %request.workspace_id))]
    pub async fn initiate(
        &self,
        user_id: Uuid,
        request: InitiateConnect,
    ) -> Result<InitiateConnectResponse, AgentDeskError> {
        let mut stage = ConnectStage::Start;

        require_workspace_access(self.db.as_ref(), request.workspace_id, user_id).await?;

        let state = OAuthState::new(
            request.workspace_id,
            request.connection_type,
            user_id,
            request.document_id,
        )
        .encode()?;
        let auth_url = self
            .provider
            .authorization_url(request.connection_type, &state)?;
        stage.advance();

        info!(connection_type = %request.connection_type, "生成 OAuth 授权地址");
        Ok(InitiateConnectResponse { auth_url, stage })
    }

    /// 用授权码完成连接
    pub async fn exchange(
        &self,
        user_id: Uuid,
        code: &str,
        state: &str,
    ) -> Result<ExchangeOutcome, AgentDeskError> {
        self.exchange_at(user_id, code, state, Utc::now().timestamp_millis())
            .await
    }

    /// 以指定时间作为当前时间执行交换
    ///
    /// 校验顺序：参数非空、state 解码、时效、用户一致、成员关系。
    /// 连接与令牌写入失败直接返回错误，不回滚已写入的行；数据源登记失败只记录警告。
    #[instrument(skip(self, code, state))]
    pub async fn exchange_at(
        &self,
        user_id: Uuid,
        code: &str,
        state: &str,
        now_ms: i64,
    ) -> Result<ExchangeOutcome, AgentDeskError> {
        if code.trim().is_empty() {
            return Err(AgentDeskError::validation("code", "缺少授权码"));
        }
        if state.trim().is_empty() {
            return Err(AgentDeskError::validation("state", "缺少 state 参数"));
        }

        let state = OAuthState::decode(state)?;

        if state.is_expired_at(now_ms, self.state_ttl_ms) {
            warn!(workspace_id = %state.workspace_id, "OAuth state 已过期");
            return Err(AgentDeskError::validation("state", "授权已过期，请重新发起连接"));
        }

        if state.user_id != user_id {
            warn!(state_user = %state.user_id, "OAuth state 与当前用户不一致");
            return Err(AgentDeskError::forbidden("授权发起者与当前用户不一致"));
        }

        let mut stage = ConnectStage::AuthRedirect;
        require_workspace_access(self.db.as_ref(), state.workspace_id, user_id).await?;
        stage.advance();

        let grant = self.provider.exchange_code(code).await.map_err(|e| match e {
            AgentDeskError::ExternalService { .. } | AgentDeskError::ServiceUnavailable { .. } => e,
            other => AgentDeskError::external_service(self.provider.name(), other.to_string()),
        })?;
        stage.advance();

        let issued_at = Utc::now();
        let config = ConnectionConfig {
            provider: self.provider.name().to_string(),
            connection_type: state.connection_type,
            scopes: self.provider.scopes(state.connection_type),
            account_email: grant.account_email.clone(),
            document_id: state.document_id.clone(),
            connected_at: issued_at,
        };
        let encrypted_tokens = self.encryption.encrypt_json(&grant.tokens)?;
        let encrypted_config = self.encryption.encrypt_json(&config)?;

        let name = match &grant.account_email {
            Some(email) => format!("{} ({})", state.connection_type.display_name(), email),
            None => state.connection_type.display_name().to_string(),
        };

        let connection = ExternalConnectionRepository::create(
            self.db.as_ref(),
            NewExternalConnection {
                workspace_id: state.workspace_id,
                user_id,
                provider: self.provider.name().to_string(),
                connection_type: state.connection_type,
                name: name.clone(),
                encrypted_config,
            },
        )
        .await?;

        OAuthTokenRepository::create(
            self.db.as_ref(),
            connection.id,
            encrypted_tokens,
            grant.tokens.expires_at(issued_at),
        )
        .await?;
        stage.advance();

        let data_source = DataSourceRepository::create(
            self.db.as_ref(),
            NewDataSource {
                workspace_id: state.workspace_id,
                connection_id: connection.id,
                source_type: state.connection_type,
                name,
                document_id: state.document_id,
            },
        )
        .await;

        let data_source_id = match data_source {
            Ok(source) => {
                stage.advance();
                Some(source.id)
            }
            Err(e) => {
                warn!(connection_id = %connection.id, error = %e, "数据源登记失败，连接已保存");
                None
            }
        };

        info!(connection_id = %connection.id, stage = %stage, "OAuth 连接完成");

        Ok(ExchangeOutcome {
            connection_id: connection.id,
            workspace_id: state.workspace_id,
            connection_type: state.connection_type,
            data_source_registered: data_source_id.is_some(),
            data_source_id,
            stage,
        })
    }
}
