use crate::cli::rt;
use anyhow::Result;
use campdir_core::app_ctx::AppContext;
use campdir_core::blueprint::Blueprint;
use campdir_core::store::DataStore;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct ServerConfig {
    pub app_ctx: Arc<AppContext>,
    pub store: Arc<DataStore>,
}

impl ServerConfig {
    pub async fn new(blueprint: Blueprint) -> Result<Self> {
        let db_path = blueprint.store.db_path.clone();
        let app_ctx = AppContext {
            runtime: rt::init(),
            blueprint,
        };
        let app_ctx = Arc::new(app_ctx);
        let store = DataStore::init(app_ctx.runtime.clone(), db_path).await?;
        let store = Arc::new(store);

        Ok(Self { app_ctx, store })
    }

    pub fn addr(&self) -> SocketAddr {
        (
            self.app_ctx.blueprint.server.hostname,
            self.app_ctx.blueprint.server.port,
        )
            .into()
    }
}
