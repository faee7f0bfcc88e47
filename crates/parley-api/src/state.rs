//! Application state wiring all services together.
//!
//! AppState holds the concrete instances used by both CLI and HTTP handlers.
//! The core is generic over its stores; AppState pins the durable store to
//! SQLite and the ephemeral store to the in-process session registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use parley_core::chat::service::ChatService;
use parley_core::llm::registry::ProviderRegistry;
use parley_core::router::RequestRouter;
use parley_infra::config::{database_url, load_service_config, resolve_data_dir};
use parley_infra::llm::build_registry;
use parley_infra::session::SessionRegistry;
use parley_infra::sqlite::conversation::SqliteConversationStore;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::widget::SqliteWidgetConfigRepository;
use parley_types::config::ServiceConfig;

/// Router pinned to the SQLite durable store.
pub type ConcreteRouter = RequestRouter<SqliteConversationStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ConcreteRouter>,
    pub sessions: SessionRegistry,
    pub widgets: Arc<SqliteWidgetConfigRepository>,
    pub config: Arc<ServiceConfig>,
    /// SHA-256 of the shared host token, when one is required.
    pub host_token_digest: Option<[u8; 32]>,
}

impl AppState {
    /// Load config, open the database and build the provider registry.
    ///
    /// `config_path` defaults to `{data_dir}/config.toml`.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("creating data dir {}", data_dir.display()))?;

        let config_path: PathBuf = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_dir.join("config.toml"));
        let config = load_service_config(&config_path).await;

        let db_url = database_url(&config, &data_dir);
        let pool = DatabasePool::new(&db_url)
            .await
            .with_context(|| format!("opening database {db_url}"))?;

        let host_token_digest = match config.auth.host_token_env.as_deref() {
            Some(var) => {
                let token = std::env::var(var)
                    .with_context(|| format!("host token variable {var} is not set"))?;
                Some(digest(&token))
            }
            None => {
                tracing::warn!("no host token configured, trusting X-User-Id from any caller");
                None
            }
        };

        let providers = build_registry(&config);
        let mut state = Self::from_parts(config, pool, providers);
        state.host_token_digest = host_token_digest;
        Ok(state)
    }

    /// Assemble state from already-built parts. No host token is required.
    pub fn from_parts(config: ServiceConfig, pool: DatabasePool, providers: ProviderRegistry) -> Self {
        let service = ChatService::new(SqliteConversationStore::new(pool.clone()), providers);
        Self {
            router: Arc::new(RequestRouter::new(service)),
            sessions: SessionRegistry::new(),
            widgets: Arc::new(SqliteWidgetConfigRepository::new(pool)),
            config: Arc::new(config),
            host_token_digest: None,
        }
    }

    pub fn with_host_token(mut self, token: &str) -> Self {
        self.host_token_digest = Some(digest(token));
        self
    }
}

/// SHA-256 of a host token.
pub fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}
