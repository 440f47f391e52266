// 统一响应构建
// 成功响应使用 ApiResponse 包装，错误由 AgentDeskError 的 ResponseError 实现输出

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse};
use agentdesk_common::ApiResponse;
use serde::Serialize;

use crate::api::middleware::request_id_of;
use crate::errors::AgentDeskError;

/// 处理器返回类型
pub type HandlerResult = Result<HttpResponse, AgentDeskError>;

/// HTTP 响应构建器
pub struct HttpResponseBuilder;

impl HttpResponseBuilder {
    /// 200，带请求 ID
    pub fn ok<T: Serialize>(req: &HttpRequest, data: T) -> HandlerResult {
        Ok(HttpResponse::Ok().json(Self::envelope(req, data)))
    }

    /// 201，带请求 ID
    pub fn created<T: Serialize>(req: &HttpRequest, data: T) -> HandlerResult {
        Ok(HttpResponse::Created().json(Self::envelope(req, data)))
    }

    pub fn no_content() -> HandlerResult {
        Ok(HttpResponse::NoContent().finish())
    }

    fn envelope<T: Serialize>(req: &HttpRequest, data: T) -> ApiResponse<T> {
        let response = ApiResponse::success(data);
        match request_id_of(req) {
            Some(request_id) => response.with_request_id(request_id),
            None => response,
        }
    }
}

/// 请求体反序列化失败统一返回 400
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            AgentDeskError::payload_too_large("请求体过大")
        }
        other => AgentDeskError::validation("body", format!("请求体格式错误: {}", other)),
    };
    error.into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AgentDeskError::validation("query", format!("查询参数错误: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AgentDeskError::validation("path", format!("路径参数错误: {}", err)).into()
}
