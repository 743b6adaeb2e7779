use crate::config::Config;
use crate::runtime::TargetRuntime;
use reqwest::Url;

/// Reads the configuration from a file or from an HTTP URL.
pub struct ConfigReader {
    runtime: TargetRuntime,
}

/// Response of a file read operation
#[derive(Debug)]
struct FileRead {
    content: String,
    path: String,
}

impl ConfigReader {
    pub fn init(runtime: TargetRuntime) -> Self {
        Self { runtime }
    }

    /// Reads the config file and returns the serialized config
    pub async fn read<T: AsRef<str>>(&self, file: T) -> anyhow::Result<Config> {
        let file = self.read_file(file).await?;
        let config = Config::from_json(&file.content)?;
        log::debug!("read config from {}", file.path);
        Ok(config)
    }

    /// Reads a file from the filesystem or from an HTTP URL
    async fn read_file<T: AsRef<str>>(&self, file: T) -> anyhow::Result<FileRead> {
        // Is an HTTP URL
        let content = if let Ok(url) = Url::parse(file.as_ref()) {
            let response = self
                .runtime
                .http
                .execute(reqwest::Request::new(reqwest::Method::GET, url))
                .await?;

            String::from_utf8(response.body.to_vec())?
        } else {
            // Is a file path
            self.runtime.file.read(file.as_ref()).await?
        };

        Ok(FileRead {
            content,
            path: file.as_ref().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{
        "server": {"port": 5055, "host": "0.0.0.0"},
        "auth": {"token_secret": "longenoughsecret", "token_ttl": 3600},
        "store": {"db_path": "campdir.db"}
    }"#;

    async fn get_rt() -> anyhow::Result<TargetRuntime> {
        let rt = crate::runtime::tests::init();
        rt.file.write("config.json", CONFIG_JSON.as_bytes()).await?;
        Ok(rt)
    }

    fn start_mock_server() -> httpmock::MockServer {
        httpmock::MockServer::start()
    }

    #[tokio::test]
    async fn test_read_file() {
        let runtime = get_rt().await.unwrap();
        let reader = ConfigReader::init(runtime);

        let file = reader.read_file("config.json").await.unwrap();

        assert_eq!(file.path, "config.json");
        assert_eq!(file.content, CONFIG_JSON);
    }

    #[tokio::test]
    async fn test_read_from_url() {
        let runtime = get_rt().await.unwrap();
        let reader = ConfigReader::init(runtime);

        let server = start_mock_server();
        server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/config.json");
            then.status(200).body(CONFIG_JSON);
        });

        let actual = reader
            .read_file(format!("{}/config.json", server.base_url()))
            .await
            .unwrap();

        assert_eq!(actual.content, CONFIG_JSON);
    }

    #[tokio::test]
    async fn test_read() {
        let runtime = get_rt().await.unwrap();
        let reader = ConfigReader::init(runtime);

        let config = reader.read("config.json").await.unwrap();
        assert_eq!(config.server.port.unwrap(), 5055);
        assert_eq!(config.server.host.clone().unwrap(), "0.0.0.0");
        assert_eq!(config.auth.token_secret, "longenoughsecret");
        assert_eq!(config.auth.token_ttl, Some(3600));
        assert_eq!(config.store.db_path, "campdir.db");
    }
}
