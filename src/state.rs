use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::users::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects eagerly so an unreachable database fails startup.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db.max_connections)
            .acquire_timeout(Duration::from_secs(config.db.acquire_timeout_secs))
            .connect(&config.db.url)
            .await
            .context("connect to database")?;

        let users = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;
        Ok(Self::from_parts(users, Arc::new(config)))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }
}
