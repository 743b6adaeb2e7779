use std::net::IpAddr;

use anyhow::anyhow;
use campdir_auth::token::TokenProvider;

use crate::config;
use crate::config::Config;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_FILE_UPLOAD: u64 = 1024 * 1024;

/// Validated, runtime-ready form of the configuration.
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub server: Server,
    pub auth: TokenProvider,
    pub store: Store,
    pub geo: Option<Geo>,
    pub notify_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub hostname: IpAddr,
    pub workers: usize,
    pub upload_dir: String,
    pub max_file_upload: u64,
}

#[derive(Debug, Clone)]
pub struct Store {
    pub db_path: String,
}

#[derive(Debug, Clone)]
pub struct Geo {
    pub provider_url: String,
    pub api_key: Option<String>,
}

impl TryFrom<config::ServerInfo> for Server {
    type Error = anyhow::Error;

    fn try_from(server: config::ServerInfo) -> Result<Self, Self::Error> {
        let hostname = server.host.clone().unwrap_or("0.0.0.0".to_string());
        let hostname = if hostname.eq("localhost") {
            "127.0.0.1".parse()
        } else {
            hostname.parse()
        }?;

        Ok(Server {
            port: server.port.unwrap_or(DEFAULT_PORT),
            hostname,
            workers: server.get_workers(),
            upload_dir: server
                .upload_dir
                .unwrap_or(DEFAULT_UPLOAD_DIR.to_string()),
            max_file_upload: server.max_file_upload.unwrap_or(DEFAULT_MAX_FILE_UPLOAD),
        })
    }
}

impl TryFrom<Config> for Blueprint {
    type Error = anyhow::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        validate_config(&config)?;

        let auth = TokenProvider::init(
            &config.auth.token_secret,
            config.auth.token_ttl.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        )?;

        Ok(Self {
            server: Server::try_from(config.server)?,
            auth,
            store: Store {
                db_path: config.store.db_path,
            },
            geo: config.geo.map(|geo| Geo {
                provider_url: geo.provider_url,
                api_key: geo.api_key,
            }),
            notify_url: config.notify_url,
        })
    }
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.auth.token_secret.len() < 8 {
        return Err(anyhow!(
            "token_secret is required and must be at least 8 characters long"
        ));
    }

    if config.store.db_path.is_empty() {
        return Err(anyhow!("store.db_path is required"));
    }
    if config.store.db_path.starts_with("http") {
        url::Url::parse(&config.store.db_path)
            .map_err(|_| anyhow!("Invalid URL for store.db_path"))?;
    }

    if let Some(geo) = config.geo.as_ref() {
        url::Url::parse(&geo.provider_url)
            .map_err(|_| anyhow!("Invalid URL for geo.provider_url"))?;
    }
    if let Some(notify_url) = config.notify_url.as_ref() {
        url::Url::parse(notify_url).map_err(|_| anyhow!("Invalid URL for notify_url"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthInfo, GeoInfo, StoreInfo};

    fn base_config() -> Config {
        Config {
            auth: AuthInfo {
                token_secret: "longenoughsecret".to_string(),
                token_ttl: Some(3600),
            },
            store: StoreInfo {
                db_path: "campdir.db".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let blueprint = Blueprint::try_from(base_config()).unwrap();
        assert_eq!(blueprint.server.port, DEFAULT_PORT);
        assert_eq!(blueprint.server.hostname.to_string(), "0.0.0.0");
        assert_eq!(blueprint.server.upload_dir, "uploads");
        assert!(blueprint.geo.is_none());
    }

    #[test]
    fn test_localhost_normalized() {
        let mut config = base_config();
        config.server.host = Some("localhost".to_string());
        let blueprint = Blueprint::try_from(config).unwrap();
        assert_eq!(blueprint.server.hostname.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = base_config();
        config.auth.token_secret = "short".to_string();
        assert!(Blueprint::try_from(config).is_err());
    }

    #[test]
    fn test_invalid_geo_url_rejected() {
        let mut config = base_config();
        config.geo = Some(GeoInfo {
            provider_url: "not a url".to_string(),
            api_key: None,
        });
        assert!(Blueprint::try_from(config).is_err());
    }

    #[test]
    fn test_http_db_path_must_parse() {
        let mut config = base_config();
        config.store.db_path = "http://".to_string();
        assert!(Blueprint::try_from(config).is_err());
    }
}
