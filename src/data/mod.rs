//! Core data models for Earth Roster
//!
//! This module contains the character record served by the API and the
//! origin allow-list used to narrow the upstream results down to Earth-born
//! characters.

pub mod characters;

pub use characters::{
    fetch_matching_characters, CharacterSource, CharactersClient, FetchError, FetchReport,
};

use serde::{Deserialize, Serialize};

/// Origin names (lower-cased) that count as "from Earth"
pub const EARTH_ORIGINS: [&str; 3] = ["earth", "earth (c-137)", "earth (replacement dimension)"];

/// A character as stored in the cache file and returned by `/characters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Character name
    pub name: String,
    /// Name of the character's last known location
    pub location: String,
    /// URL of the character's avatar image
    pub image: String,
}

impl CharacterRecord {
    /// Creates a new record from its three fields
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            image: image.into(),
        }
    }
}

/// Returns true if the origin name matches the allow-list, ignoring case
pub fn is_earth_origin(origin: &str) -> bool {
    let origin = origin.to_lowercase();
    EARTH_ORIGINS.contains(&origin.as_str())
}
