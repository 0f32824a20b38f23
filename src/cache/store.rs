//! CSV-backed character store
//!
//! Provides `CsvStore`, which writes the filtered characters to a quoted CSV
//! file and reads them back by header name.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::data::CharacterRecord;

/// Cache file used when none is configured
pub const DEFAULT_CACHE_FILE: &str = "rick_and_morty_characters.csv";

/// Header row written at the top of every cache file
const HEADER: [&str; 3] = ["Name", "Location", "Image"];

/// Errors that can occur when reading or writing the cache file
#[derive(Debug, Error)]
pub enum CacheError {
    /// Opening, creating or flushing the file failed
    #[error("Cache file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The file could not be written or parsed as CSV
    #[error("Cache file is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Storage for the cached character list
pub trait CharacterStore: Send + Sync {
    /// Reads every cached record; an absent cache yields an empty list
    fn load(&self) -> Result<Vec<CharacterRecord>, CacheError>;

    /// Replaces the cached records with `records`
    fn persist(&self, records: &[CharacterRecord]) -> Result<(), CacheError>;

    /// Human-readable location of the cache, for logs
    fn location(&self) -> String;
}

/// A cache row keyed by the header names
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Image")]
    image: String,
}

impl From<CsvRow> for CharacterRecord {
    fn from(row: CsvRow) -> Self {
        CharacterRecord {
            name: row.name,
            location: row.location,
            image: row.image,
        }
    }
}

/// Strips carriage returns and line feeds from a field
pub fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect()
}

/// Writes `records` to `path`, overwriting any existing file
///
/// Parent directories are created if missing. The write is not atomic: a
/// crash part-way through leaves a truncated file.
pub fn persist(records: &[CharacterRecord], path: &Path) -> Result<(), CacheError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .from_writer(File::create(path)?);

    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record([
            sanitize_field(&record.name),
            sanitize_field(&record.location),
            sanitize_field(&record.image),
        ])?;
    }
    writer.flush()?;

    debug!(
        path = %path.display(),
        count = records.len(),
        "Persisted character cache"
    );
    Ok(())
}

/// Reads the records cached at `path`
///
/// A missing file is an empty cache, not an error. Field contents are not
/// re-validated.
pub fn load(path: &Path) -> Result<Vec<CharacterRecord>, CacheError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let records = reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(CharacterRecord::from))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        path = %path.display(),
        count = records.len(),
        "Loaded character cache"
    );
    Ok(records)
}

/// Character store backed by a single CSV file
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl Default for CsvStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl CsvStore {
    /// Creates a store reading and writing the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CharacterStore for CsvStore {
    fn load(&self) -> Result<Vec<CharacterRecord>, CacheError> {
        load(&self.path)
    }

    fn persist(&self, records: &[CharacterRecord]) -> Result<(), CacheError> {
        persist(records, &self.path)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
