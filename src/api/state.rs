use std::sync::Arc;

use crate::db::JsonStore;
use crate::services::{RepositorySource, Recommender};

/// Shared application state
///
/// Everything here is read-only after startup; extraction writes go to the
/// store's files, not to this struct.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub store: Arc<JsonStore>,
    pub source: Arc<dyn RepositorySource>,
}

impl AppState {
    pub fn new(recommender: Recommender, store: JsonStore, source: Arc<dyn RepositorySource>) -> Self {
        Self {
            recommender: Arc::new(recommender),
            store: Arc::new(store),
            source,
        }
    }
}
