// 数据库实体模块
// 包含所有 SeaORM 实体定义

pub mod user;
pub mod organization;
pub mod organization_member;
pub mod workspace;
pub mod workspace_member;
pub mod ai_agent;

// 文件相关实体
pub mod file_upload;
pub mod file_summary;

// 外部连接相关实体
pub mod external_connection;
pub mod oauth_token;
pub mod workspace_data_source;
pub mod database_connection;

pub mod prelude;
pub use prelude::*;
