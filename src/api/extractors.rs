// API 请求提取器

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use agentdesk_common::PaginationParams;
use futures::future::{ready, Ready};
use std::ops::Deref;

use crate::api::models::PaginationQuery;
use crate::errors::AgentDeskError;

/// 分页参数提取器
///
/// 缺省值为第 1 页、每页 20 条，`page_size` 超过 100 时截断。
/// 参数无法解析（如 `page=abc`）时返回 400。
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub PaginationParams);

impl Deref for Pagination {
    type Target = PaginationParams;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Pagination {
    type Error = AgentDeskError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = serde_urlencoded::from_str::<PaginationQuery>(req.query_string())
            .map(|query| Pagination(query.params()))
            .map_err(|e| AgentDeskError::validation("query", format!("分页参数错误: {}", e)));
        ready(result)
    }
}
