// API 中间件模块

pub mod auth;
pub mod request_id;

pub use auth::{AuthenticatedUser, JwtClaims, JwtUtils};
pub use request_id::{request_id_of, RequestIdMiddleware};
