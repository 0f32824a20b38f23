//! Server configuration from environment variables

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use crate::cache::DEFAULT_CACHE_FILE;
use crate::data::characters::RICK_AND_MORTY_BASE_URL;

/// Port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 5000;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `PORT` is not a number in 0..=65535
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),

    /// `HOST` is not an IP address
    #[error("HOST must be an IP address, got '{0}'")]
    InvalidHost(String),
}

/// Server configuration loaded from environment variables
///
/// All fields have defaults suitable for running locally; CLI flags may
/// override them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`)
    pub host: String,
    /// Bind port (default: `5000`)
    pub port: u16,
    /// Location of the CSV cache file
    pub cache_path: PathBuf,
    /// Character listing endpoint of the upstream API
    pub upstream_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            upstream_url: RICK_AND_MORTY_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults
    ///
    /// | Env Var        | Default                                      |
    /// |----------------|----------------------------------------------|
    /// | `HOST`         | `0.0.0.0`                                    |
    /// | `PORT`         | `5000`                                       |
    /// | `CACHE_FILE`   | `rick_and_morty_characters.csv`              |
    /// | `UPSTREAM_URL` | `https://rickandmortyapi.com/api/character/` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            cache_path: lookup("CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            upstream_url: lookup("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
        })
    }

    /// Socket address the server should bind to
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
