//! Application state wiring the dialogue engine to its infrastructure.
//!
//! The dialogue manager is generic over the data-access port and the cache
//! hasher; AppState pins it to the SQLite executor and SHA-256 hasher.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use registrar_core::dialogue::manager::DialogueManager;
use registrar_core::lexicon::Lexicon;
use registrar_core::session::store::SessionStore;
use registrar_infra::config::{load_engine_config, resolve_database_url};
use registrar_infra::crypto::hash::Sha256ContentHasher;
use registrar_infra::filesystem::resolve_data_dir;
use registrar_infra::sqlite::pool::DatabasePool;
use registrar_infra::sqlite::records::SqliteQueryExecutor;
use registrar_types::config::EngineConfig;

/// Dialogue manager pinned to the infra implementations.
pub type ConcreteDialogueManager = DialogueManager<SqliteQueryExecutor, Sha256ContentHasher>;

/// Shared application state used by every command.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ConcreteDialogueManager>,
    pub config: EngineConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, open the DB, wire the engine.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("cannot create data dir {}", data_dir.display()))?;

        let config = load_engine_config(&data_dir).await;

        let db_url = resolve_database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url)
            .await
            .with_context(|| format!("cannot open records database {db_url}"))?;

        let manager = DialogueManager::new(
            Lexicon::academic(),
            &config,
            SqliteQueryExecutor::new(db_pool),
            Sha256ContentHasher::new(),
            SessionStore::new(),
        )
        .context("invalid lexicon")?;

        Ok(Self {
            manager: Arc::new(manager),
            config,
            data_dir,
        })
    }
}
