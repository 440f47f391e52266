// OAuth state 参数编解码
// state 为 camelCase JSON 的标准 base64 编码，不带签名，回调时重新校验成员关系

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::entities::external_connection::ConnectionType;
use crate::errors::AgentDeskError;

/// 在授权跳转中往返传递的上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthState {
    pub workspace_id: Uuid,
    pub connection_type: ConnectionType,
    pub user_id: Uuid,
    /// 生成时间，Unix 毫秒
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

impl OAuthState {
    pub fn new(
        workspace_id: Uuid,
        connection_type: ConnectionType,
        user_id: Uuid,
        document_id: Option<String>,
    ) -> Self {
        Self {
            workspace_id,
            connection_type,
            user_id,
            timestamp: Utc::now().timestamp_millis(),
            document_id,
        }
    }

    pub fn encode(&self) -> Result<String, AgentDeskError> {
        let json = serde_json::to_vec(self)
            .map_err(|e| AgentDeskError::internal(format!("序列化 OAuth state 失败: {}", e)))?;
        Ok(BASE64.encode(json))
    }

    /// 解码失败（base64 或 JSON 不合法）一律视为请求参数错误
    pub fn decode(raw: &str) -> Result<Self, AgentDeskError> {
        let bytes = BASE64
            .decode(raw.trim().as_bytes())
            .map_err(|_| AgentDeskError::validation("state", "state 参数不是有效的 base64"))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AgentDeskError::validation("state", format!("state 参数格式错误: {}", e)))
    }

    /// 超过有效期即过期；时间戳在未来的 state 不视为过期
    ///
    /// 时间戳来自客户端，差值按饱和运算处理，极小的时间戳视为过期
    pub fn is_expired_at(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) > ttl_ms
    }
}
