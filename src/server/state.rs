//! Shared handler state

use std::sync::Arc;

use crate::cache::CharacterStore;
use crate::data::CharacterSource;

/// Shared application state available to all Axum handlers via `State<AppState>`
///
/// Cheaply cloneable; both collaborators live behind `Arc` so tests can inject
/// fakes in place of the CSV file and the upstream API.
#[derive(Clone)]
pub struct AppState {
    /// Cache the `/characters` endpoint serves from
    pub store: Arc<dyn CharacterStore>,
    /// Upstream used to refill a cold cache
    pub source: Arc<dyn CharacterSource>,
}

impl AppState {
    pub fn new(store: Arc<dyn CharacterStore>, source: Arc<dyn CharacterSource>) -> Self {
        Self { store, source }
    }
}
