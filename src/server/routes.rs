//! Route handlers for the three read endpoints

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::error::{AppError, AppResult};
use super::state::AppState;
use crate::data::CharacterRecord;
use crate::refresh::refresh_cache;

/// Service metadata returned by `GET /`
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoints: Endpoints,
}

/// Description of each public endpoint, keyed by path
#[derive(Debug, Serialize)]
pub struct Endpoints {
    #[serde(rename = "/characters")]
    pub characters: &'static str,
    #[serde(rename = "/healthcheck")]
    pub healthcheck: &'static str,
}

/// Payload of `GET /characters`
#[derive(Debug, Serialize)]
pub struct CharactersResponse {
    pub count: usize,
    pub characters: Vec<CharacterRecord>,
}

impl From<Vec<CharacterRecord>> for CharactersResponse {
    fn from(characters: Vec<CharacterRecord>) -> Self {
        Self {
            count: characters.len(),
            characters,
        }
    }
}

/// Health check response payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET / -- static service description
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Rick and Morty Characters API",
        description: "API for retrieving Rick and Morty characters that are Human, Alive, and from Earth",
        endpoints: Endpoints {
            characters: "Get all matching characters",
            healthcheck: "Check API health status",
        },
    })
}

/// GET /characters -- serves the cache, refilling it first if it is cold
///
/// A populated cache is never refreshed here
pub async fn characters(State(state): State<AppState>) -> AppResult<Json<CharactersResponse>> {
    let cached = state.store.load()?;
    if !cached.is_empty() {
        return Ok(Json(cached.into()));
    }

    info!(
        cache = %state.store.location(),
        "Character cache is cold, fetching from upstream"
    );
    let report = refresh_cache(state.source.as_ref(), state.store.as_ref()).await?;

    Ok(Json(report.into_characters().into()))
}

/// GET /healthcheck -- static liveness payload
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "The Rick and Morty API service is running",
    })
}

/// Fallback for unknown paths
pub async fn not_found() -> AppError {
    AppError::NotFound
}
