use crate::local_crypto::{decrypt_aes, encrypt_aes, hash_256, AES_KEY_LEN};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Issues and verifies the bearer tokens handed out on login. A token
/// is the JSON claims encrypted with a key derived from the configured
/// secret, so it can only be minted or read by the server.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    aes_key: Vec<u8>,
    ttl_ms: u128,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the authenticated user.
    pub sub: String,
    /// Expiry, unix millis.
    pub exp: u128,
}

impl TokenProvider {
    pub fn init<T: AsRef<str>>(secret: T, ttl_secs: u64) -> Result<Self> {
        if secret.as_ref().len() < 8 {
            return Err(anyhow!("token secret must be at least 8 characters long"));
        }
        let aes_key = hash_256(secret)[..AES_KEY_LEN].as_bytes().to_vec();
        Ok(Self {
            aes_key,
            ttl_ms: ttl_secs as u128 * 1000,
        })
    }

    pub fn generate(&self, user_id: &str, now_ms: u128) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now_ms + self.ttl_ms,
        };
        encrypt_aes(&self.aes_key, &serde_json::to_string(&claims)?)
    }

    /// Returns the subject of a valid token.
    pub fn verify(&self, token: &str, now_ms: u128) -> Result<String> {
        let claims = decrypt_aes(&self.aes_key, token)
            .ok()
            .and_then(|json| serde_json::from_str::<Claims>(&json).ok())
            .ok_or_else(|| anyhow!("invalid token"))?;
        if claims.exp <= now_ms {
            return Err(anyhow!("token expired"));
        }
        Ok(claims.sub)
    }
}
