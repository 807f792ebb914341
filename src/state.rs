use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::llm::{OpenAiClient, TextGenerator};
use crate::places::{amap::AmapClient, PlacesSearch};
use crate::store::{PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub generator: Arc<dyn TextGenerator>,
    pub places: Arc<dyn PlacesSearch>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let timeout = Duration::from_secs(config.http_timeout_secs);
        let generator = Arc::new(
            OpenAiClient::new(&config.llm, timeout).context("build text generation client")?,
        ) as Arc<dyn TextGenerator>;
        let places = Arc::new(
            AmapClient::new(&config.places, timeout).context("build places client")?,
        ) as Arc<dyn PlacesSearch>;

        Ok(Self::from_parts(Arc::new(PgStore::new(db)), generator, places))
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        generator: Arc<dyn TextGenerator>,
        places: Arc<dyn PlacesSearch>,
    ) -> Self {
        Self {
            store,
            generator,
            places,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory store, a generator that always fails, and an empty places search.
    pub fn fake() -> Self {
        use crate::testing::{MemoryStore, StubGenerator, StubPlaces};

        Self::from_parts(
            Arc::new(MemoryStore::default()),
            Arc::new(StubGenerator::failing()),
            Arc::new(StubPlaces::default()),
        )
    }
}
