// 应用共享状态
// 各 worker 通过 web::Data 共享，只读

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::crypto::EncryptionService;
use crate::errors::AgentDeskError;
use crate::oauth::{ConnectService, GoogleOAuthProvider, OAuthProvider};
use crate::services::{
    AgentService, AuthService, ConnectionService, DatabaseConnectionService, FileService,
    FileStorage, OrganizationService, WorkspaceService,
};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub encryption: EncryptionService,
    pub oauth_provider: Arc<dyn OAuthProvider>,
}

impl AppState {
    /// 使用配置中的 Google 客户端创建
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Result<Self, AgentDeskError> {
        let provider = GoogleOAuthProvider::new(config.oauth.google.clone())?;
        Self::with_provider(db, config, Arc::new(provider))
    }

    pub fn with_provider(
        db: Arc<DatabaseConnection>,
        config: AppConfig,
        oauth_provider: Arc<dyn OAuthProvider>,
    ) -> Result<Self, AgentDeskError> {
        let encryption = EncryptionService::from_base64_key(&config.security.encryption_key)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            encryption,
            oauth_provider,
        })
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.db.clone(), self.config.security.clone())
    }

    pub fn organization_service(&self) -> OrganizationService {
        OrganizationService::new(self.db.clone())
    }

    pub fn workspace_service(&self) -> WorkspaceService {
        WorkspaceService::new(self.db.clone())
    }

    pub fn agent_service(&self) -> AgentService {
        AgentService::new(self.db.clone())
    }

    pub fn file_service(&self) -> FileService {
        FileService::new(self.db.clone(), FileStorage::from_config(&self.config.storage))
    }

    pub fn database_connection_service(&self) -> DatabaseConnectionService {
        DatabaseConnectionService::new(self.db.clone(), self.encryption.clone())
    }

    pub fn connection_service(&self) -> ConnectionService {
        ConnectionService::new(self.db.clone(), self.encryption.clone())
    }

    pub fn connect_service(&self) -> ConnectService {
        ConnectService::new(
            self.db.clone(),
            self.encryption.clone(),
            self.oauth_provider.clone(),
            self.config.oauth.state_ttl_seconds,
        )
    }
}
