// 健康检查处理器

use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::api::models::HealthResponse;
use crate::api::state::AppState;
use crate::db::{DatabaseHealthChecker, HealthStatus};

/// 服务与数据库健康状态
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "服务健康", body = HealthResponse),
        (status = 503, description = "数据库不可用", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = DatabaseHealthChecker::check(state.db.as_ref()).await;
    let status = database.status;

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        timestamp: Utc::now(),
    };

    match status {
        HealthStatus::Healthy => HttpResponse::Ok().json(body),
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(body),
    }
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
