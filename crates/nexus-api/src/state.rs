//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the HTTP handlers.
//! Core logic is generic over repository/object-store traits; AppState pins
//! it to the concrete infra implementations. The provider (and with it the
//! turn engine) is optional: without credentials the server still runs and
//! chat endpoints answer 503.

use std::sync::Arc;

use nexus_core::chat::service::ChatService;
use nexus_core::llm::box_provider::BoxLlmProvider;
use nexus_core::turn::engine::TurnEngine;
use nexus_infra::llm::openai_compat::OpenAiCompatibleProvider;
use nexus_infra::settings::{load_settings, resolve_data_dir, resolve_object_dir};
use nexus_infra::sqlite::chat::SqliteChatRepository;
use nexus_infra::sqlite::pool::DatabasePool;
use nexus_infra::storage::filesystem::LocalObjectStore;
use nexus_types::config::Settings;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository>;
pub type ConcreteTurnEngine = TurnEngine<SqliteChatRepository, LocalObjectStore>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    /// The turn engine; `None` when no provider is configured.
    pub engine: Option<Arc<ConcreteTurnEngine>>,
    /// The completion provider; `None` when no credentials are configured.
    pub provider: Option<Arc<BoxLlmProvider>>,
    pub settings: Settings,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        // Initialize database
        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("nexus.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let settings = load_settings();

        let chat_service = Arc::new(ChatService::new(SqliteChatRepository::new(db_pool.clone())));

        let provider = settings.provider.as_ref().map(|p| {
            let inner = match p.name.as_str() {
                "openrouter" => OpenAiCompatibleProvider::openrouter(
                    &p.api_key,
                    &settings.models.default_model,
                ),
                _ => OpenAiCompatibleProvider::new(
                    nexus_infra::llm::openai_compat::config::OpenAiCompatConfig {
                        provider_name: p.name.clone(),
                        base_url: p.base_url.clone(),
                        api_key: p.api_key.clone(),
                        model: settings.models.default_model.clone(),
                    },
                ),
            };
            Arc::new(BoxLlmProvider::new(inner))
        });

        let engine = provider.as_ref().map(|provider| {
            let objects = Arc::new(LocalObjectStore::new(resolve_object_dir(&data_dir)));
            Arc::new(TurnEngine::new(
                Arc::clone(&chat_service),
                objects,
                Arc::clone(provider),
                settings.models.clone(),
            ))
        });

        Ok(Self {
            chat_service,
            engine,
            provider,
            settings,
            db_pool,
        })
    }
}
