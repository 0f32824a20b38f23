//! Fetch-and-persist cycle
//!
//! Runs one full upstream walk and overwrites the cache with whatever it
//! returned. Used once at startup and again whenever `/characters` finds the
//! cache cold. [`fetch_and_save`] is the one-shot variant behind `--fetch-only`.

use tracing::{info, warn};

use crate::cache::{CacheError, CharacterStore};
use crate::data::{fetch_matching_characters, CharacterRecord, CharacterSource, FetchReport};

/// How many records the one-shot fetch lists in its log output
pub const PREVIEW_LEN: usize = 5;

/// Fetches matching characters and writes them to `store`
///
/// Upstream failures never fail the refresh: partial results are persisted
/// and the failure stays on the returned report. Only cache I/O errors are
/// returned as `Err`.
pub async fn refresh_cache(
    source: &dyn CharacterSource,
    store: &dyn CharacterStore,
) -> Result<FetchReport, CacheError> {
    let report = fetch_matching_characters(source).await;

    if let Some(failure) = &report.failure {
        warn!(
            error = %failure,
            count = report.characters.len(),
            "Persisting partial character list"
        );
    }

    store.persist(&report.characters)?;
    info!(
        count = report.characters.len(),
        cache = %store.location(),
        fetched_at = %report.fetched_at,
        "Character cache refreshed"
    );

    Ok(report)
}

/// Fetches matching characters once, saving them only if any matched
///
/// An empty result leaves any existing cache untouched. The count and the
/// first few `name - location` lines are logged for the operator.
pub async fn fetch_and_save(
    source: &dyn CharacterSource,
    store: &dyn CharacterStore,
) -> Result<FetchReport, CacheError> {
    let report = fetch_matching_characters(source).await;
    let count = report.characters.len();
    info!(count, "Found {count} characters that match the criteria");

    if report.characters.is_empty() {
        info!("No characters found matching the criteria.");
        return Ok(report);
    }

    if let Some(failure) = &report.failure {
        warn!(error = %failure, count, "Saving partial character list");
    }
    store.persist(&report.characters)?;
    info!(count, cache = %store.location(), "Saved characters");

    for line in preview(&report.characters, PREVIEW_LEN) {
        info!("{line}");
    }
    Ok(report)
}

/// Numbered `name - location` lines for the first `limit` records
pub fn preview(records: &[CharacterRecord], limit: usize) -> Vec<String> {
    records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, record)| format!("{}. {} - {}", i + 1, record.name, record.location))
        .collect()
}
