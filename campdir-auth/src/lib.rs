pub mod local_crypto;
pub mod password;
pub mod token;
