//! Earth Roster Library
//!
//! Fetches alive, human, Earth-born characters from the Rick and Morty API,
//! caches them in a CSV file and serves them over HTTP.

pub mod cache;
pub mod cli;
pub mod data;
pub mod refresh;
pub mod server;
