// 应用程序设置和配置
// 定义配置结构体和加载逻辑

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use agentdesk_common::CommonError;

/// 开发环境默认加密密钥（32 字节，base64 编码），生产环境禁止使用
pub const DEV_ENCRYPTION_KEY: &str = "ZGV2LWVuY3J5cHRpb24ta2V5LWNoYW5nZS1tZS0zMmI=";

/// 开发环境默认 JWT 密钥，生产环境禁止使用
pub const DEV_JWT_SECRET: &str = "your-super-secret-jwt-key-change-this-in-production";

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub oauth: OAuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub keep_alive: u64,
    pub client_timeout: u64,
    pub client_shutdown: u64,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
    /// 启动时自动应用待处理迁移
    pub auto_migrate: bool,
}

/// 安全配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// 令牌有效期（秒）
    pub jwt_expiration: u64,
    pub jwt_issuer: String,
    pub bcrypt_cost: u32,
    /// AES-256-GCM 密钥，base64 编码的 32 字节
    pub encryption_key: String,
    pub cors_origins: Vec<String>,
}

/// OAuth 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// state 参数有效期（秒）
    pub state_ttl_seconds: i64,
    pub google: GoogleOAuthConfig,
}

/// Google OAuth 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    /// 调用 Google 接口的超时（秒）
    pub timeout: u64,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
    pub max_file_size: u64,
    /// 单次上传请求允许的文件数
    pub max_files_per_upload: usize,
    pub allowed_extensions: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_enabled: bool,
    pub file_path: Option<String>,
}

/// 环境配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub debug: bool,
    pub version: String,
}

impl AppConfig {
    /// 从环境变量和配置文件加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::builder();

        // 1. 加载默认配置
        config = config.add_source(Config::try_from(&AppConfig::default())?);

        // 2. 尝试加载配置文件
        if Path::new("config.toml").exists() {
            config = config.add_source(File::with_name("config"));
        }

        // 3. 加载环境变量（优先级最高）
        config = config.add_source(
            Environment::with_prefix("AGENTDESK")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = config.build()?;
        let mut app_config: AppConfig = config.try_deserialize()?;

        app_config.environment.version = env!("CARGO_PKG_VERSION").to_string();

        Ok(app_config)
    }

    /// 校验全部配置段，错误信息合并为一条
    pub fn validate(&self) -> Result<(), CommonError> {
        crate::config::ConfigValidator::validate_all(self).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            CommonError::configuration(format!("配置验证失败: {}", messages.join("; ")))
        })
    }

    /// 生产环境下禁止使用开发密钥
    pub fn is_production(&self) -> bool {
        self.environment.name == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
                keep_alive: 75,
                client_timeout: 5000,
                client_shutdown: 5000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/agentdesk".to_string(),
                max_connections: 10,
                min_connections: 1,
                connect_timeout: 30,
                idle_timeout: 600,
                max_lifetime: 1800,
                auto_migrate: true,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiration: 3600 * 24,
                jwt_issuer: "agentdesk".to_string(),
                bcrypt_cost: 12,
                encryption_key: DEV_ENCRYPTION_KEY.to_string(),
                cors_origins: vec!["*".to_string()],
            },
            oauth: OAuthConfig {
                state_ttl_seconds: 300,
                google: GoogleOAuthConfig {
                    client_id: String::new(),
                    client_secret: String::new(),
                    redirect_uri: "http://localhost:3000/oauth/google/callback".to_string(),
                    auth_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                    token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
                    userinfo_endpoint: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
                    timeout: 15,
                },
            },
            storage: StorageConfig {
                path: "./storage".to_string(),
                max_file_size: 10 * 1024 * 1024, // 10MB
                max_files_per_upload: 20,
                allowed_extensions: vec![
                    "pdf".to_string(),
                    "txt".to_string(),
                    "md".to_string(),
                    "csv".to_string(),
                    "json".to_string(),
                    "xlsx".to_string(),
                    "docx".to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_enabled: false,
                file_path: None,
            },
            environment: EnvironmentConfig {
                name: "development".to_string(),
                debug: true,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}
