//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. `ConversationService` is generic over its repository; AppState pins
//! it to the SQLite implementation.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::conversation::service::ConversationService;
use parley_core::llm::responder::AiResponder;
use parley_infra::llm::build_responder;
use parley_infra::sqlite::conversation::SqliteConversationRepository;
use parley_infra::sqlite::pool::{DatabasePool, default_database_url};
use parley_types::config::ParleyConfig;

/// Concrete type alias for the service generic pinned to the infra implementation.
pub type ConcreteConversationService = ConversationService<SqliteConversationRepository>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConcreteConversationService>,
    pub config: Arc<ParleyConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, build the provider
    /// tiers, wire the conversation service.
    pub async fn init(config: ParleyConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;
        let responder = build_responder(&config.provider);

        Ok(Self::from_parts(config, data_dir, db_pool, responder))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        config: ParleyConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        responder: AiResponder,
    ) -> Self {
        let repo = SqliteConversationRepository::new(db_pool.clone());

        Self {
            conversations: Arc::new(ConversationService::new(repo, responder)),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}

/// The configured database URL, or the default file inside `data_dir`.
pub fn database_url(config: &ParleyConfig, data_dir: &std::path::Path) -> String {
    config
        .database_url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}
