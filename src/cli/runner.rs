use crate::cli::commands::{Cli, Command};
use crate::cli::{self, rt};
use campdir_auth::password::PasswordHash;
use campdir_core::blueprint::Blueprint;
use campdir_core::config::reader::ConfigReader;
use campdir_core::model::{Bootcamp, Course, Review, Role, User};
use campdir_core::runtime::TargetRuntime;
use campdir_core::store::DataStore;
use clap::Parser;
use serde::Deserialize;
use std::str::FromStr;

pub async fn fork_run() -> anyhow::Result<()> {
    logger_init();
    let cli = Cli::parse();
    let runtime = rt::init();

    run(cli, runtime).await
}

async fn run(cli: Cli, runtime: TargetRuntime) -> anyhow::Result<()> {
    let config_reader = ConfigReader::init(runtime.clone());
    match cli.command {
        Command::Start { config_path } => {
            let config = config_reader.read(config_path).await?;
            let server = cli::server::Server::new(config);
            server.fork_start().await?;
        }
        Command::Check { config_path } => {
            let config = config_reader.read(config_path).await?;
            let blueprint = Blueprint::try_from(config);
            match blueprint {
                Ok(_) => {
                    log::info!("Config is valid");
                }
                Err(e) => {
                    log::error!("Invalid config: {}", e)
                }
            }
        }
        Command::Init {
            config_path,
            name,
            email,
            password,
            role,
        } => {
            let config = config_reader.read(config_path).await?;
            let blueprint = Blueprint::try_from(config)?;
            let store = DataStore::init(runtime.clone(), blueprint.store.db_path).await?;

            let role = match role.as_deref() {
                None => Role::Admin,
                Some(role) => Role::from_str(role)
                    .map_err(|_| anyhow::anyhow!("Invalid role: {}", role))?,
            };
            if store.user_by_email(&email).is_some() {
                anyhow::bail!("A user with email {} already exists", email);
            }

            let user = User {
                id: store.next_id()?,
                name,
                email,
                role,
                password: PasswordHash::new(password),
                created_at: store.now()?,
                ..Default::default()
            };
            user.validate()?;
            store.save_user(user.clone()).await?;
            log::info!("Created {} account {}", user.role, user.email);
        }
        Command::Seed {
            config_path,
            data_dir,
            drop,
        } => {
            let config = config_reader.read(config_path).await?;
            let blueprint = Blueprint::try_from(config)?;
            let store = DataStore::init(runtime.clone(), blueprint.store.db_path).await?;

            if drop {
                store.bootcamps.clear();
                store.courses.clear();
                store.reviews.clear();
                store.users.clear();
                store.persist().await?;
                log::info!("Dropped all collections");
            } else {
                seed(&store, &runtime, &data_dir).await?;
            }
        }
    }
    Ok(())
}

#[derive(Deserialize)]
struct SeedUser {
    id: String,
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

/// Loads the four seed files. Each file is optional; saves go through
/// the store so averages are recomputed along the way.
async fn seed(store: &DataStore, runtime: &TargetRuntime, data_dir: &str) -> anyhow::Result<()> {
    if let Some(users) = read_seed::<SeedUser>(runtime, data_dir, "users.json").await? {
        for entry in users {
            let role = match entry.role.as_deref() {
                None => Role::User,
                Some(role) => Role::from_str(role)
                    .map_err(|_| anyhow::anyhow!("Invalid role: {}", role))?,
            };
            let user = User {
                id: entry.id,
                name: entry.name,
                email: entry.email,
                role,
                password: PasswordHash::new(entry.password),
                created_at: store.now()?,
                ..Default::default()
            };
            store.save_user(user).await?;
        }
    }
    if let Some(bootcamps) = read_seed::<Bootcamp>(runtime, data_dir, "bootcamps.json").await? {
        for bootcamp in bootcamps {
            store.save_bootcamp(bootcamp).await?;
        }
    }
    if let Some(courses) = read_seed::<Course>(runtime, data_dir, "courses.json").await? {
        for course in courses {
            store.save_course(course).await?;
        }
    }
    if let Some(reviews) = read_seed::<Review>(runtime, data_dir, "reviews.json").await? {
        for review in reviews {
            store.save_review(review).await?;
        }
    }
    log::info!("Seed import complete");
    Ok(())
}

async fn read_seed<T: serde::de::DeserializeOwned>(
    runtime: &TargetRuntime,
    data_dir: &str,
    file: &str,
) -> anyhow::Result<Option<Vec<T>>> {
    let path = format!("{}/{}", data_dir, file);
    let content = match runtime.file.read(&path).await {
        Ok(content) => content,
        Err(_) => {
            log::warn!("Skipping seed file {}", path);
            return Ok(None);
        }
    };
    let items: Vec<T> = serde_json::from_str(&content)?;
    log::info!("Importing {} records from {}", items.len(), path);
    Ok(Some(items))
}

fn logger_init() {
    // set the log level
    const LONG_ENV_FILTER_VAR_NAME: &str = "CAMPDIR_LOG_LEVEL";
    let filter_env_name =
        std::env::var(LONG_ENV_FILTER_VAR_NAME).unwrap_or(LONG_ENV_FILTER_VAR_NAME.to_string());

    // use the log level from the env if there is one, otherwise use the default.
    let env = env_logger::Env::new().filter_or(filter_env_name, "info");

    env_logger::Builder::from_env(env).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_config(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        let db_path = dir.path().join("camp.db");
        write!(
            file,
            r#"{{
                "server": {{"port": 19591}},
                "auth": {{"token_secret": "longenoughsecret"}},
                "store": {{"db_path": "{}"}}
            }}"#,
            db_path.to_str().unwrap()
        )
        .unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_run_check() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&dir);
        let cli = Cli {
            command: Command::Check { config_path },
        };
        let runtime = rt::init();
        assert!(run(cli, runtime).await.is_ok())
    }

    #[tokio::test]
    async fn test_run_init_creates_admin() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&dir);
        let cli = Cli {
            command: Command::Init {
                config_path,
                name: "Boss".to_string(),
                email: "boss@example.com".to_string(),
                password: "hunter42".to_string(),
                role: None,
            },
        };
        let runtime = rt::init();
        run(cli, runtime.clone()).await.unwrap();

        let db_path = dir.path().join("camp.db");
        let store = DataStore::init(runtime, db_path.to_str().unwrap().to_string())
            .await
            .unwrap();
        let user = store.user_by_email("boss@example.com").unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_seed_and_drop() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(&dir);
        let data_dir = dir.path().join("seed");
        std::fs::create_dir(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("bootcamps.json"),
            r#"[{"id": "b1", "name": "Devworks", "slug": "devworks",
                 "description": "d", "address": "a", "user": "u1"}]"#,
        )
        .unwrap();
        std::fs::write(
            data_dir.join("courses.json"),
            r#"[{"id": "c1", "title": "Web Dev", "description": "d", "weeks": 8,
                 "tuition": 8000.0, "bootcamp": "b1", "user": "u1"}]"#,
        )
        .unwrap();

        let runtime = rt::init();
        let cli = Cli {
            command: Command::Seed {
                config_path: config_path.clone(),
                data_dir: data_dir.to_str().unwrap().to_string(),
                drop: false,
            },
        };
        run(cli, runtime.clone()).await.unwrap();

        let db_path = dir.path().join("camp.db").to_str().unwrap().to_string();
        let store = DataStore::init(runtime.clone(), db_path.clone())
            .await
            .unwrap();
        let bootcamp = store.bootcamps.get("b1").unwrap();
        assert_eq!(bootcamp.average_cost, Some(8000.0));

        let cli = Cli {
            command: Command::Seed {
                config_path,
                data_dir: "unused".to_string(),
                drop: true,
            },
        };
        run(cli, runtime.clone()).await.unwrap();
        let store = DataStore::init(runtime, db_path).await.unwrap();
        assert!(store.bootcamps.is_empty());
    }
}
