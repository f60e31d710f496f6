use std::sync::Arc;

use husky_engine::HuskyEngine;
use husky_persist::PersistClient;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The engine owns the LLM client, retrieval and conversation services and
/// is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: PersistClient,
    pub engine: Arc<HuskyEngine>,
}

impl AppState {
    pub fn new(config: Config, persist: PersistClient, engine: HuskyEngine) -> Self {
        Self {
            config: Arc::new(config),
            persist,
            engine: Arc::new(engine),
        }
    }
}
