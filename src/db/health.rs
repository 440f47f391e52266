// 数据库健康检查

use crate::db::connection::ping;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{instrument, warn};
use utoipa::ToSchema;

/// 健康状态枚举
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// 数据库健康状态
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub status: HealthStatus,
    pub response_time_ms: u64,
    pub last_check: chrono::DateTime<chrono::Utc>,
    pub error_message: Option<String>,
}

impl DatabaseHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// 数据库健康检查器
pub struct DatabaseHealthChecker;

impl DatabaseHealthChecker {
    #[instrument(skip(db))]
    pub async fn check(db: &DatabaseConnection) -> DatabaseHealth {
        let start_time = Instant::now();
        let result = ping(db).await;
        let response_time_ms = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(()) => DatabaseHealth {
                status: HealthStatus::Healthy,
                response_time_ms,
                last_check: chrono::Utc::now(),
                error_message: None,
            },
            Err(e) => {
                warn!(error = %e, "数据库健康检查未通过");
                DatabaseHealth {
                    status: HealthStatus::Unhealthy,
                    response_time_ms,
                    last_check: chrono::Utc::now(),
                    error_message: Some(e.to_string()),
                }
            }
        }
    }
}
