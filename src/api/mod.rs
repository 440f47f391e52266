// API 模块
// HTTP 接口层：路由、处理器、中间件与响应格式

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod responses;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;

pub use routes::{configure_all, ApiDoc};
pub use state::AppState;
