//! Shared application state for all routes.

use crate::config::SearchConfig;
use crate::service::{BirdService, SightingService};
use crate::store::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub birds: BirdService,
    pub sightings: SightingService,
}

impl AppState {
    /// Both services share the store and one copy of the search defaults.
    pub fn new(store: Arc<dyn EntityStore>, search: SearchConfig) -> Self {
        let search = Arc::new(search);
        AppState {
            birds: BirdService::new(store.clone(), search.clone()),
            sightings: SightingService::new(store.clone(), search),
            store,
        }
    }
}
