// 配置验证器
// 提供详细的配置验证逻辑

use crate::config::{AppConfig, DEV_ENCRYPTION_KEY, DEV_JWT_SECRET};
use agentdesk_common::CommonError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use url::Url;

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证完整配置，收集所有错误而不是遇到第一个就返回
    pub fn validate_all(config: &AppConfig) -> Result<(), Vec<CommonError>> {
        let results = [
            Self::validate_server(&config.server),
            Self::validate_database(&config.database),
            Self::validate_security(&config.security, config.is_production()),
            Self::validate_oauth(&config.oauth),
            Self::validate_storage(&config.storage),
            Self::validate_logging(&config.logging),
            Self::validate_environment(&config.environment),
        ];

        let errors: Vec<CommonError> = results.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 验证服务器配置
    pub fn validate_server(config: &crate::config::ServerConfig) -> Result<(), CommonError> {
        if config.port == 0 {
            return Err(CommonError::validation("服务器端口不能为 0"));
        }

        if config.host.is_empty() {
            return Err(CommonError::validation("服务器主机地址不能为空"));
        }

        if let Some(workers) = config.workers {
            if workers == 0 {
                return Err(CommonError::validation("工作线程数不能为 0"));
            }
            if workers > 64 {
                return Err(CommonError::validation("工作线程数不建议超过 64"));
            }
        }

        Ok(())
    }

    /// 验证数据库配置
    pub fn validate_database(config: &crate::config::DatabaseConfig) -> Result<(), CommonError> {
        if config.url.is_empty() {
            return Err(CommonError::validation("数据库 URL 不能为空"));
        }

        if Url::parse(&config.url).is_err() {
            return Err(CommonError::validation("数据库 URL 格式无效"));
        }

        if config.max_connections == 0 {
            return Err(CommonError::validation("数据库最大连接数不能为 0"));
        }

        if config.min_connections > config.max_connections {
            return Err(CommonError::validation("数据库最小连接数不能大于最大连接数"));
        }

        if config.connect_timeout == 0 {
            return Err(CommonError::validation("数据库连接超时不能为 0"));
        }

        Ok(())
    }

    /// 验证安全配置
    pub fn validate_security(
        config: &crate::config::SecurityConfig,
        production: bool,
    ) -> Result<(), CommonError> {
        if config.jwt_secret.len() < 32 {
            return Err(CommonError::validation("JWT 密钥长度不能少于 32 个字符"));
        }

        if config.jwt_expiration == 0 {
            return Err(CommonError::validation("JWT 过期时间不能为 0"));
        }

        if config.jwt_expiration > 86400 * 30 {
            return Err(CommonError::validation("JWT 过期时间不建议超过 30 天"));
        }

        if !(4..=31).contains(&config.bcrypt_cost) {
            return Err(CommonError::validation("bcrypt 成本参数必须在 4-31 之间"));
        }

        match BASE64.decode(config.encryption_key.as_bytes()) {
            Ok(key) if key.len() == 32 => {}
            Ok(key) => {
                return Err(CommonError::validation(format!(
                    "加密密钥必须为 32 字节，当前为 {} 字节",
                    key.len()
                )));
            }
            Err(_) => return Err(CommonError::validation("加密密钥不是有效的 base64")),
        }

        if production
            && (config.jwt_secret == DEV_JWT_SECRET || config.encryption_key == DEV_ENCRYPTION_KEY)
        {
            return Err(CommonError::validation("生产环境不能使用默认的 JWT 密钥或加密密钥"));
        }

        Ok(())
    }

    /// 验证 OAuth 配置
    ///
    /// client_id 为空表示未启用 Google 连接，其余字段仍需是合法 URL。
    pub fn validate_oauth(config: &crate::config::OAuthConfig) -> Result<(), CommonError> {
        if config.state_ttl_seconds <= 0 {
            return Err(CommonError::validation("OAuth state 有效期必须大于 0"));
        }

        let google = &config.google;
        for (name, value) in [
            ("redirect_uri", &google.redirect_uri),
            ("auth_endpoint", &google.auth_endpoint),
            ("token_endpoint", &google.token_endpoint),
            ("userinfo_endpoint", &google.userinfo_endpoint),
        ] {
            if Url::parse(value).is_err() {
                return Err(CommonError::validation(format!("Google OAuth {} 不是有效的 URL", name)));
            }
        }

        if !google.client_id.is_empty() && google.client_secret.is_empty() {
            return Err(CommonError::validation("配置了 Google client_id 时必须同时配置 client_secret"));
        }

        if google.timeout == 0 {
            return Err(CommonError::validation("Google OAuth 请求超时不能为 0"));
        }

        Ok(())
    }

    /// 验证存储配置
    pub fn validate_storage(config: &crate::config::StorageConfig) -> Result<(), CommonError> {
        if config.path.is_empty() {
            return Err(CommonError::validation("存储路径不能为空"));
        }

        if config.max_file_size == 0 {
            return Err(CommonError::validation("最大文件大小不能为 0"));
        }

        if config.max_file_size > 1024 * 1024 * 1024 {
            return Err(CommonError::validation("最大文件大小不建议超过 1GB"));
        }

        if config.max_files_per_upload == 0 {
            return Err(CommonError::validation("单次上传文件数上限不能为 0"));
        }

        if config.allowed_extensions.is_empty() {
            return Err(CommonError::validation("允许的文件扩展名列表不能为空"));
        }

        Ok(())
    }

    /// 验证日志配置
    pub fn validate_logging(config: &crate::config::LoggingConfig) -> Result<(), CommonError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.level.as_str()) {
            return Err(CommonError::validation(
                format!("无效的日志级别: {}，有效值: {:?}", config.level, valid_levels)
            ));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&config.format.as_str()) {
            return Err(CommonError::validation(
                format!("无效的日志格式: {}，有效值: {:?}", config.format, valid_formats)
            ));
        }

        if config.file_enabled && config.file_path.is_none() {
            return Err(CommonError::validation("启用文件日志时必须指定日志文件路径"));
        }

        Ok(())
    }

    /// 验证环境配置
    pub fn validate_environment(config: &crate::config::EnvironmentConfig) -> Result<(), CommonError> {
        let valid_environments = ["development", "staging", "production", "test"];
        if !valid_environments.contains(&config.name.as_str()) {
            return Err(CommonError::validation(
                format!("无效的环境名称: {}，有效值: {:?}", config.name, valid_environments)
            ));
        }

        if config.version.is_empty() {
            return Err(CommonError::validation("版本信息不能为空"));
        }

        Ok(())
    }
}
