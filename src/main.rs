use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use agentdesk::api::middleware::RequestIdMiddleware;
use agentdesk::api::{configure_all, AppState};
use agentdesk::config::{ConfigLoader, SecurityConfig};
use agentdesk::db::{DatabaseManager, MigrationManager};
use agentdesk::logging::LoggingSetup;

/// 按配置构建 CORS，包含 `*` 时允许任意来源
fn build_cors(security: &SecurityConfig) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    security
        .cors_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::init().context("加载配置失败")?;

    // guard 需要存活到进程结束，否则文件日志会丢失
    let _log_guard = LoggingSetup::init(&config.logging).context("初始化日志失败")?;

    tracing::info!(
        version = %config.environment.version,
        environment = %config.environment.name,
        "启动 AgentDesk"
    );
    ConfigLoader::log_summary(&config);

    let db = Arc::new(
        DatabaseManager::connect(config.database.clone())
            .await
            .context("连接数据库失败")?
            .into_connection(),
    );

    if config.database.auto_migrate {
        let applied = MigrationManager::new(db.clone())
            .migrate()
            .await
            .context("执行数据库迁移失败")?;
        if !applied.is_empty() {
            tracing::info!(count = applied.len(), "已应用数据库迁移");
        }
    }

    let bind_address = (config.server.host.clone(), config.server.port);
    let workers = config.server.workers;
    let keep_alive = std::time::Duration::from_secs(config.server.keep_alive);
    let client_timeout = std::time::Duration::from_secs(config.server.client_timeout);
    let shutdown_timeout = config.server.client_shutdown;

    let state = web::Data::new(AppState::new(db, config).context("初始化应用状态失败")?);

    tracing::info!(host = %bind_address.0, port = bind_address.1, "HTTP 服务监听中");

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(build_cors(&state.config.security))
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .configure(configure_all)
    })
    .keep_alive(keep_alive)
    .client_request_timeout(client_timeout)
    .shutdown_timeout(shutdown_timeout);

    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    server.bind(bind_address)?.run().await?;
    Ok(())
}
