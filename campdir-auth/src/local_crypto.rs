use anyhow::Result;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

const IV: [u8; 16] = [11; 16];

pub const AES_KEY_LEN: usize = 32;

pub fn encrypt_aes(key: &[u8], data: &str) -> Result<String> {
    let key: &[u8; AES_KEY_LEN] = key.try_into()?;
    let cipher = libaes::Cipher::new_256(key);
    let encrypted = cipher.cbc_encrypt(&IV, data.as_bytes());
    Ok(BASE64_STANDARD.encode(encrypted))
}

pub fn decrypt_aes<T: AsRef<[u8]>>(key: &[u8], data: T) -> Result<String> {
    let key: &[u8; AES_KEY_LEN] = key.try_into()?;
    let cipher = libaes::Cipher::new_256(key);
    let data = BASE64_STANDARD.decode(data.as_ref())?;
    let decrypted = cipher.cbc_decrypt(&IV, &data);
    Ok(String::from_utf8(decrypted)?)
}

pub fn hash_256<T: AsRef<str>>(data: T) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref().as_bytes());
    hex::encode(hasher.finalize())
}

/// Random hex string of `bytes` random bytes.
pub fn random_hex(bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    let buf: Vec<u8> = (0..bytes).map(|_| rng.gen_range(0u8..=255)).collect();
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Vec<u8> {
        hash_256("campdir secret")[..AES_KEY_LEN].as_bytes().to_vec()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let data = r#"{"sub":"abc","exp":120}"#;
        let encrypted = encrypt_aes(&key(), data).unwrap();
        assert_ne!(encrypted, data);
        let decrypted = decrypt_aes(&key(), &encrypted).unwrap();
        assert_eq!(data, decrypted);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let encrypted = encrypt_aes(&key(), "hello").unwrap();
        let other = hash_256("other secret")[..AES_KEY_LEN].as_bytes().to_vec();
        let decrypted = decrypt_aes(&other, &encrypted);
        assert!(decrypted.is_err() || decrypted.unwrap() != "hello");
    }

    #[test]
    fn test_hash_256() {
        assert_eq!(
            hash_256("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_random_hex_len() {
        let token = random_hex(20);
        assert_eq!(token.len(), 40);
        assert_ne!(token, random_hex(20));
    }
}
