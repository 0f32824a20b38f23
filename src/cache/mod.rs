//! Cache module for persisting fetched characters to disk
//!
//! The cache is a single CSV file with a `Name,Location,Image` header and every
//! field quoted. It is fully rewritten on each persist and trusted as-is on
//! load. [`CharacterStore`] is the seam the service depends on so tests can
//! swap the file for an in-memory store.

mod store;

pub use store::{
    load, persist, sanitize_field, CacheError, CharacterStore, CsvStore, DEFAULT_CACHE_FILE,
};

#[cfg(test)]
pub(crate) use store::tests::MemoryStore;
