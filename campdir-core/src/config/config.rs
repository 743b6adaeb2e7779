use crate::is_default;
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_default")]
    pub server: ServerInfo,
    pub auth: AuthInfo,
    pub store: StoreInfo,
    #[serde(default, skip_serializing_if = "is_default")]
    pub geo: Option<GeoInfo>,
    /// Webhook POSTed when a password reset is requested. Reset links
    /// are only logged when unset.
    #[serde(default, skip_serializing_if = "is_default")]
    pub notify_url: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ServerInfo {
    #[serde(default, skip_serializing_if = "is_default")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub workers: Option<usize>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub upload_dir: Option<String>,
    /// Photo upload cap in bytes.
    #[serde(default, skip_serializing_if = "is_default")]
    pub max_file_upload: Option<u64>,
}

impl ServerInfo {
    pub fn get_workers(&self) -> usize {
        self.workers.unwrap_or(num_cpus::get())
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuthInfo {
    pub token_secret: String,
    /// Bearer token lifetime in seconds.
    #[serde(default, skip_serializing_if = "is_default")]
    pub token_ttl: Option<u64>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StoreInfo {
    /// Path of the JSON snapshot, or an http(s) URL to bootstrap from.
    pub db_path: String,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GeoInfo {
    /// Forward-geocoding endpoint answering nominatim-style JSON.
    pub provider_url: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() -> Result<()> {
        let config = Config::from_json(
            r#"{
                "auth": {"token_secret": "longenoughsecret"},
                "store": {"db_path": "campdir.db"}
            }"#,
        )?;
        assert_eq!(config.auth.token_secret, "longenoughsecret");
        assert_eq!(config.store.db_path, "campdir.db");
        assert_eq!(config.server.port, None);
        assert!(config.geo.is_none());
        Ok(())
    }

    #[test]
    fn test_round_trip_skips_defaults() -> Result<()> {
        let config = Config {
            auth: AuthInfo {
                token_secret: "longenoughsecret".to_string(),
                token_ttl: None,
            },
            store: StoreInfo {
                db_path: "campdir.db".to_string(),
            },
            ..Default::default()
        };
        let json = config.to_json(false)?;
        assert!(!json.contains("notify_url"));
        assert_eq!(Config::from_json(&json)?, config);
        Ok(())
    }
}
