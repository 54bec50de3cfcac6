use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, warn};

use shared_config::AppConfig;

use crate::memory::MemoryStore;
use crate::postgrest::SupabaseStore;
use crate::store::Store;

/// Router state shared by every cell.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    /// Uses Supabase when it is configured and falls back to the in-memory store otherwise.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store: Arc<dyn Store> = if config.is_database_configured() {
            info!("Using Supabase store at {}", config.supabase_url);
            Arc::new(SupabaseStore::new(&config))
        } else {
            warn!("SUPABASE_URL/SUPABASE_SERVICE_KEY not set, data is kept in memory only");
            Arc::new(MemoryStore::new())
        };
        Self::new(config, store)
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
