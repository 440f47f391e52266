// 服务层模块
// 业务逻辑与权限校验，处理器只负责解析请求与组装响应

pub mod agent;
pub mod auth;
pub mod connection;
pub mod database_connection;
pub mod file;
pub mod membership;
pub mod organization;
pub mod workspace;

pub use agent::*;
pub use auth::*;
pub use connection::*;
pub use database_connection::*;
pub use file::*;
pub use organization::*;
pub use workspace::*;

#[cfg(test)]
mod tests;
