// API 处理器模块

pub mod agent;
pub mod auth;
pub mod connection;
pub mod database_connection;
pub mod file;
pub mod health;
pub mod oauth;
pub mod organization;
pub mod workspace;
