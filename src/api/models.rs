// API 请求和响应模型
// 业务 DTO 定义在各服务中，这里只放接口层自己的结构

use agentdesk_common::PaginationParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::{DatabaseHealth, HealthStatus};

/// 分页请求参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// 页码，从 1 开始
    pub page: Option<u64>,
    /// 每页大小，默认 20，最大 100
    pub page_size: Option<u64>,
}

impl PaginationQuery {
    pub fn params(&self) -> PaginationParams {
        PaginationParams::normalized(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(PaginationParams::DEFAULT_PAGE_SIZE),
        )
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub database: DatabaseHealth,
    pub timestamp: DateTime<Utc>,
}
