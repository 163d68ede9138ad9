use crate::{config::Config, store::DynStore};
use std::sync::Arc;

/// Application state shared across all HTTP handlers
///
/// Built once at startup; handlers never reload configuration.
#[derive(Clone)]
pub struct AppState {
    /// Persistence port for users, jobs and applications
    pub store: DynStore,
    /// Loaded configuration, including the token signing secret
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: DynStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
