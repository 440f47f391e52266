// 加密辅助模块
// 在写入数据库前封装 OAuth 令牌与连接配置等敏感 JSON

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use crate::errors::AgentDeskError;

/// 密文格式版本前缀
const ENVELOPE_PREFIX: &str = "v1:";
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// AES-256-GCM 加密服务
///
/// 输出格式为 `v1:` + base64(nonce ‖ ciphertext)，每次加密使用新的随机 nonce。
#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionService").finish_non_exhaustive()
    }
}

impl EncryptionService {
    /// 从 base64 编码的 32 字节密钥创建
    pub fn from_base64_key(key: &str) -> Result<Self, AgentDeskError> {
        let bytes = BASE64
            .decode(key.as_bytes())
            .map_err(|e| AgentDeskError::configuration(format!("加密密钥不是有效的 base64: {}", e)))?;
        Self::from_key_bytes(&bytes)
    }

    pub fn from_key_bytes(key: &[u8]) -> Result<Self, AgentDeskError> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| {
            AgentDeskError::configuration(format!("加密密钥必须为 32 字节，当前为 {} 字节", key.len()))
        })?;
        Ok(Self { cipher })
    }

    /// 加密任意字节
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String, AgentDeskError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| AgentDeskError::encryption("加密失败"))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", ENVELOPE_PREFIX, BASE64.encode(payload)))
    }

    /// 解密 `encrypt_bytes` 的输出
    pub fn decrypt_bytes(&self, envelope: &str) -> Result<Vec<u8>, AgentDeskError> {
        let encoded = envelope
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| AgentDeskError::encryption("不支持的密文格式"))?;
        let payload = BASE64
            .decode(encoded.as_bytes())
            .map_err(|_| AgentDeskError::encryption("密文不是有效的 base64"))?;

        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(AgentDeskError::encryption("密文长度不足"));
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AgentDeskError::encryption("解密失败，密文可能被篡改或密钥不匹配"))
    }

    /// 序列化为 JSON 后加密
    pub fn encrypt_json<T: Serialize>(&self, value: &T) -> Result<String, AgentDeskError> {
        let plaintext = serde_json::to_vec(value)
            .map_err(|e| AgentDeskError::internal(format!("序列化待加密数据失败: {}", e)))?;
        self.encrypt_bytes(&plaintext)
    }

    /// 解密后反序列化 JSON
    pub fn decrypt_json<T: DeserializeOwned>(&self, envelope: &str) -> Result<T, AgentDeskError> {
        let plaintext = self.decrypt_bytes(envelope)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| AgentDeskError::encryption(format!("解密后的数据不是预期的 JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEV_ENCRYPTION_KEY;
    use serde_json::json;

    fn service() -> EncryptionService {
        EncryptionService::from_base64_key(DEV_ENCRYPTION_KEY).unwrap()
    }

    #[test]
    fn test_json_roundtrip() {
        let svc = service();
        let value = json!({ "access_token": "ya29.abc", "refresh_token": "1//xyz" });

        let sealed = svc.encrypt_json(&value).unwrap();
        assert!(sealed.starts_with("v1:"));
        assert!(!sealed.contains("ya29"));

        let opened: serde_json::Value = svc.decrypt_json(&sealed).unwrap();
        assert_eq!(opened, value);
    }

    #[test]
    fn test_nonce_is_random() {
        let svc = service();
        let a = svc.encrypt_bytes(b"same").unwrap();
        let b = svc.encrypt_bytes(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let svc = service();
        let sealed = svc.encrypt_bytes(b"secret payload").unwrap();

        let mut raw = BASE64.decode(sealed.strip_prefix("v1:").unwrap()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = format!("v1:{}", BASE64.encode(raw));

        let err = svc.decrypt_bytes(&tampered).unwrap_err();
        assert_eq!(err.error_code(), "ENCRYPTION_ERROR");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sealed = service().encrypt_bytes(b"secret").unwrap();
        let other = EncryptionService::from_key_bytes(&[7u8; 32]).unwrap();
        assert!(other.decrypt_bytes(&sealed).is_err());
    }

    #[test]
    fn test_malformed_envelopes_rejected() {
        let svc = service();
        assert!(svc.decrypt_bytes("plain").is_err());
        assert!(svc.decrypt_bytes("v1:%%%").is_err());
        assert!(svc.decrypt_bytes("v1:AAAA").is_err());
    }

    #[test]
    fn test_invalid_key_length() {
        let err = EncryptionService::from_key_bytes(&[0u8; 16]).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
