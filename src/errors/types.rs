// 统一错误类型定义

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

/// 服务统一错误类型
#[derive(Debug, Error)]
pub enum AgentDeskError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// 数据库错误
    #[error("数据库错误: {message}")]
    Database { message: String },

    /// 认证错误
    #[error("认证错误: {message}")]
    Authentication { message: String },

    /// 授权错误
    #[error("授权错误: {message}")]
    Authorization { message: String },

    /// 验证错误
    #[error("验证错误: {field} - {message}")]
    Validation { field: String, message: String },

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound { resource: String },

    /// 资源冲突
    #[error("资源冲突: {message}")]
    Conflict { message: String },

    /// 文件处理错误
    #[error("文件处理错误: {message}")]
    FileProcessing { message: String, file_name: Option<String> },

    /// 请求体过大
    #[error("请求体过大: {message}")]
    PayloadTooLarge { message: String },

    /// 加解密错误
    #[error("加密错误: {message}")]
    Encryption { message: String },

    /// 外部服务错误
    #[error("外部服务错误: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// 内部服务器错误
    #[error("内部服务器错误: {message}")]
    Internal { message: String },

    /// 服务不可用
    #[error("服务暂时不可用: {message}")]
    ServiceUnavailable { message: String },
}

impl AgentDeskError {
    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::FileProcessing { .. } => "FILE_PROCESSING_ERROR",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Encryption { .. } => "ENCRYPTION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 500,
            Self::Database { .. } => 500,
            Self::Authentication { .. } => 401,
            Self::Authorization { .. } => 403,
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::FileProcessing { .. } => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Encryption { .. } => 500,
            Self::ExternalService { .. } => 502,
            Self::Internal { .. } => 500,
            Self::ServiceUnavailable { .. } => 503,
        }
    }

    /// 是否为服务器错误
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), 500..=599)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn file_processing_with_name(
        message: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self::FileProcessing {
            message: message.into(),
            file_name: Some(file_name.into()),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    pub fn encryption(message: impl Into<String>) -> Self {
        Self::Encryption {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// 401：缺少或无效的凭据
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// 403：已认证但无权访问
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }
}

/// 实现 ResponseError trait 以便与 Actix Web 集成
impl ResponseError for AgentDeskError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        // 客户端错误只在 debug 级别出现
        if self.is_server_error() {
            error!(
                error_code = %self.error_code(),
                error_message = %self,
                "处理请求时发生错误"
            );
        } else {
            tracing::debug!(error_code = %self.error_code(), error_message = %self, "请求被拒绝");
        }

        crate::errors::ErrorResponse::from_error(self).into_http_response()
    }
}

/// 从 sea_orm::DbErr 转换
impl From<sea_orm::DbErr> for AgentDeskError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::ConnectionAcquire(_) => Self::service_unavailable("无法获取数据库连接"),
            sea_orm::DbErr::RecordNotFound(what) => Self::not_found(what),
            sea_orm::DbErr::Conn(msg) => Self::database(format!("数据库连接错误: {}", msg)),
            sea_orm::DbErr::Exec(msg) => Self::database(format!("数据库执行错误: {}", msg)),
            sea_orm::DbErr::Query(msg) => Self::database(format!("数据库查询错误: {}", msg)),
            _ => Self::database(format!("数据库错误: {}", err)),
        }
    }
}

/// 从 std::io::Error 转换
impl From<std::io::Error> for AgentDeskError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found("文件或目录"),
            std::io::ErrorKind::PermissionDenied => Self::internal("文件访问权限不足"),
            _ => Self::internal(format!("IO 错误: {}", err)),
        }
    }
}

/// 从 bcrypt::BcryptError 转换
impl From<bcrypt::BcryptError> for AgentDeskError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::internal(format!("密码哈希失败: {}", err))
    }
}

/// 从 reqwest::Error 转换
impl From<reqwest::Error> for AgentDeskError {
    fn from(err: reqwest::Error) -> Self {
        Self::external_service("http", err.to_string())
    }
}
