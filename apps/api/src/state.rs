use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::llm_client::BackendClient;
use crate::store::postgres::PgStore;
use crate::store::{PromptRepository, TextSource};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Shared backend handle. Every call builds its own request, so no
    /// conversation state carries over between extractions.
    pub backend: Arc<dyn BackendClient>,
    pub texts: Arc<dyn TextSource>,
    pub prompts: Arc<dyn PromptRepository>,
    pub extractor: DocumentExtractor,
    pub config: Config,
}

impl AppState {
    pub fn new(db: PgPool, backend: Arc<dyn BackendClient>, config: Config) -> Self {
        let store = Arc::new(PgStore::new(db.clone()));
        Self {
            extractor: DocumentExtractor::new(&config.timeouts),
            texts: store.clone(),
            prompts: store,
            backend,
            db,
            config,
        }
    }

    pub fn store(&self) -> PgStore {
        PgStore::new(self.db.clone())
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;

    use super::AppState;
    use crate::config::Config;
    use crate::extraction::DocumentExtractor;
    use crate::llm_client::{BackendClient, BackendTimeouts};
    use crate::store::testing::{InMemoryPrompts, InMemoryTexts};
    use crate::store::ResumeId;

    /// State whose pool never connects. Text and prompt lookups are served
    /// from memory, so only writes through a Postgres sink would touch it.
    pub fn state_with(backend: Arc<dyn BackendClient>, texts: HashMap<ResumeId, String>) -> AppState {
        let config = Config {
            database_url: "postgres://extractor@127.0.0.1:1/extractor".to_string(),
            ollama_host: "http://127.0.0.1:9".to_string(),
            ollama_model: "llama3.1".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            timeouts: BackendTimeouts::default(),
            batch_concurrency: 2,
        };
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState {
            db,
            backend,
            texts: Arc::new(InMemoryTexts(texts)),
            prompts: Arc::new(InMemoryPrompts::default()),
            extractor: DocumentExtractor::new(&config.timeouts),
            config,
        }
    }
}
