// OAuth 连接模块
// 提供方抽象、state 编解码与连接流程

pub mod flow;
pub mod google;
pub mod provider;
pub mod state;

#[cfg(test)]
mod tests;

pub use flow::{
    ConnectService, ConnectStage, ConnectionConfig, ExchangeOutcome, InitiateConnect,
    InitiateConnectResponse,
};
pub use google::GoogleOAuthProvider;
pub use provider::{OAuthGrant, OAuthProvider, OAuthTokenSet};
pub use state::OAuthState;
