use crate::catalog::CatalogCache;
use crate::config::Config;
use crate::storage::VoteStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: CatalogCache,
    pub votes: VoteStore,
}

impl AppState {
    pub fn new(config: Config, catalog: CatalogCache, votes: VoteStore) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
            votes,
        }
    }
}
