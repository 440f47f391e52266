// 数据库模块
// 包含数据库连接、实体定义、仓储和迁移

pub mod cli;
pub mod connection;
pub mod entities;
pub mod migrations;
pub mod health;
pub mod repositories;


pub use connection::*;
pub use health::*;
pub use migrations::{MigrationManager, MigrationStatus, SchemaValidation};
pub use repositories::*;
