use crate::local_crypto::{hash_256, random_hex};
use serde::{Deserialize, Serialize};

/// Salted password digest as stored on a user document. The clear
/// password never leaves the register/login handlers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    pub salt: String,
    pub digest: String,
}

impl PasswordHash {
    pub fn new<T: AsRef<str>>(password: T) -> Self {
        let salt = random_hex(8);
        let digest = hash_256(format!("{}{}", salt, password.as_ref()));
        Self { salt, digest }
    }

    pub fn matches<T: AsRef<str>>(&self, password: T) -> bool {
        hash_256(format!("{}{}", self.salt, password.as_ref())).eq(&self.digest)
    }
}

/// Clear reset token plus the hashed form kept on the user document.
pub struct ResetToken {
    pub clear: String,
    pub hashed: String,
}

pub const RESET_TOKEN_TTL_MS: u128 = 10 * 60 * 1000;

impl ResetToken {
    pub fn issue() -> Self {
        let clear = random_hex(20);
        let hashed = hash_256(&clear);
        Self { clear, hashed }
    }

    pub fn hash_clear<T: AsRef<str>>(clear: T) -> String {
        hash_256(clear.as_ref())
    }
}
