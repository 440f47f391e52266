// 测试辅助：实体样本与假 OAuth 提供方

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, Transaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{AppConfig, DEV_ENCRYPTION_KEY};
use crate::crypto::EncryptionService;
use crate::db::entities::{
    ai_agent, external_connection, file_upload, oauth_token, organization, organization_member,
    user, workspace, workspace_data_source,
};
use crate::db::entities::prelude::{ConnectionStatus, ConnectionType, OrganizationRole};
use crate::errors::AgentDeskError;
use crate::oauth::{OAuthGrant, OAuthProvider, OAuthTokenSet};

pub const FAKE_ACCESS_TOKEN: &str = "ya29.fake-access-token";

pub fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

/// 取回共享 mock 连接记录的语句，调用前需释放其他持有者
pub fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
    Arc::try_unwrap(db)
        .unwrap_or_else(|_| panic!("mock 连接仍被共享"))
        .into_transaction_log()
}

pub fn encryption() -> EncryptionService {
    EncryptionService::from_base64_key(DEV_ENCRYPTION_KEY).unwrap()
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment.name = "test".to_string();
    config.security.bcrypt_cost = 4;
    config.oauth.google.client_id = "test-client-id".to_string();
    config.oauth.google.client_secret = "test-client-secret".to_string();
    config
}

pub fn user_model(id: Uuid, email: &str, password_hash: &str) -> user::Model {
    user::Model {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        display_name: "Test User".to_string(),
        created_at: now(),
        updated_at: now(),
        last_login_at: None,
    }
}

pub fn organization_model(id: Uuid, owner_id: Uuid) -> organization::Model {
    organization::Model {
        id,
        name: "Acme".to_string(),
        slug: "acme".to_string(),
        description: None,
        owner_id,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn member_model(
    organization_id: Uuid,
    user_id: Uuid,
    role: OrganizationRole,
) -> organization_member::Model {
    organization_member::Model {
        id: Uuid::new_v4(),
        organization_id,
        user_id,
        role,
        joined_at: now(),
    }
}

pub fn workspace_model(id: Uuid, organization_id: Uuid, created_by: Uuid) -> workspace::Model {
    workspace::Model {
        id,
        organization_id,
        name: "Analytics".to_string(),
        description: None,
        created_by,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn agent_model(id: Uuid, workspace_id: Uuid, created_by: Uuid) -> ai_agent::Model {
    ai_agent::Model {
        id,
        workspace_id,
        name: "Support bot".to_string(),
        description: None,
        system_prompt: Some("You are helpful.".to_string()),
        model: ai_agent::DEFAULT_MODEL.to_string(),
        temperature: ai_agent::DEFAULT_TEMPERATURE,
        is_active: true,
        created_by,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn file_model(id: Uuid, workspace_id: Uuid, uploaded_by: Uuid) -> file_upload::Model {
    file_upload::Model {
        id,
        workspace_id,
        uploaded_by,
        file_name: "report.csv".to_string(),
        stored_path: format!("{}/{}.csv", workspace_id, id),
        content_type: "text/csv".to_string(),
        size_bytes: 42,
        created_at: now(),
    }
}

pub fn connection_model(id: Uuid, workspace_id: Uuid, user_id: Uuid) -> external_connection::Model {
    external_connection::Model {
        id,
        workspace_id,
        user_id,
        provider: "google".to_string(),
        connection_type: ConnectionType::GoogleSheets,
        name: "Google Sheets".to_string(),
        encrypted_config: "v1:placeholder".to_string(),
        status: ConnectionStatus::Active,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn token_model(connection_id: Uuid) -> oauth_token::Model {
    oauth_token::Model {
        id: Uuid::new_v4(),
        connection_id,
        encrypted_tokens: "v1:placeholder".to_string(),
        expires_at: None,
        created_at: now(),
        updated_at: now(),
    }
}

pub fn data_source_model(workspace_id: Uuid, connection_id: Uuid) -> workspace_data_source::Model {
    workspace_data_source::Model {
        id: Uuid::new_v4(),
        workspace_id,
        connection_id,
        source_type: ConnectionType::GoogleSheets,
        name: "Google Sheets".to_string(),
        document_id: None,
        created_at: now(),
    }
}

/// 不发起网络请求的 OAuth 提供方
pub struct FakeOAuthProvider {
    pub fail: bool,
}

#[async_trait]
impl OAuthProvider for FakeOAuthProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn scopes(&self, connection_type: ConnectionType) -> Vec<String> {
        vec![format!("scope:{}", connection_type)]
    }

    fn authorization_url(
        &self,
        _connection_type: ConnectionType,
        state: &str,
    ) -> Result<String, AgentDeskError> {
        let url = url::Url::parse_with_params("https://accounts.example.com/auth", &[("state", state)])
            .map_err(|e| AgentDeskError::internal(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthGrant, AgentDeskError> {
        if self.fail {
            return Err(AgentDeskError::external_service("google", "invalid_grant"));
        }
        Ok(OAuthGrant {
            tokens: OAuthTokenSet {
                access_token: FAKE_ACCESS_TOKEN.to_string(),
                refresh_token: Some(format!("refresh-for-{}", code)),
                token_type: "Bearer".to_string(),
                scope: None,
                expires_in: Some(3599),
                id_token: None,
            },
            account_email: Some("analyst@example.com".to_string()),
        })
    }
}
