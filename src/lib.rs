// AgentDesk 库
// 导出主要模块供服务端与命令行工具使用

pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
pub mod logging;
pub mod oauth;
pub mod services;

#[cfg(test)]
pub mod test_support;
