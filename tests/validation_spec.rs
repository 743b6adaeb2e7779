#[cfg(test)]
mod validation_spec {
    use serde_json::json;

    // Configs that parse but must fail blueprint validation.
    #[tokio::test]
    async fn validate() -> anyhow::Result<()> {
        let invalid = [
            // secret too short
            json!({
                "auth": {"token_secret": "short"},
                "store": {"db_path": "camp.db"},
            }),
            // no db path
            json!({
                "auth": {"token_secret": "longenoughsecret"},
                "store": {"db_path": ""},
            }),
            // unparseable hostname
            json!({
                "server": {"host": "not a host name"},
                "auth": {"token_secret": "longenoughsecret"},
                "store": {"db_path": "camp.db"},
            }),
            // geo provider without a usable url
            json!({
                "auth": {"token_secret": "longenoughsecret"},
                "store": {"db_path": "camp.db"},
                "geo": {"provider_url": "::not-a-url::"},
            }),
        ];

        let dir = tempfile::tempdir()?;
        let runtime = campdir::cli::rt::init();
        let reader = campdir_core::config::reader::ConfigReader::init(runtime);

        for (i, config) in invalid.iter().enumerate() {
            let path = dir.path().join(format!("invalid_{}.json", i));
            std::fs::write(&path, config.to_string())?;

            let config = reader.read(path.to_str().unwrap()).await?;
            let blueprint = campdir_core::blueprint::Blueprint::try_from(config);
            assert!(blueprint.is_err(), "Expected error for config {}", i);
        }
        Ok(())
    }
}
