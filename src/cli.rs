//! Command-line interface parsing for Earth Roster
//!
//! Flags override the environment-derived [`ServerConfig`]; anything left unset
//! keeps its environment or default value.

use std::path::PathBuf;

use clap::Parser;

use crate::server::ServerConfig;

/// Earth Roster - serve alive, human, Earth-born Rick and Morty characters
#[derive(Parser, Debug)]
#[command(name = "earthroster")]
#[command(about = "Serve alive, human, Earth-born Rick and Morty characters over HTTP")]
#[command(version)]
pub struct Cli {
    /// IP address to bind (overrides HOST)
    #[arg(long, value_name = "ADDR")]
    pub host: Option<String>,

    /// Port to listen on (overrides PORT, default 5000)
    #[arg(long, short, value_name = "PORT")]
    pub port: Option<u16>,

    /// Path of the CSV cache file (overrides CACHE_FILE)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Character listing endpoint (overrides UPSTREAM_URL)
    #[arg(long, value_name = "URL")]
    pub upstream_url: Option<String>,

    /// Start serving without the initial fetch-and-cache cycle
    #[arg(long)]
    pub skip_initial_fetch: bool,

    /// Fetch and save matching characters once, then exit without serving
    #[arg(long, conflicts_with = "skip_initial_fetch")]
    pub fetch_only: bool,
}

impl Cli {
    /// Applies any flags that were given on top of `config`
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(cache_file) = &self.cache_file {
            config.cache_path = cache_file.clone();
        }
        if let Some(upstream_url) = &self.upstream_url {
            config.upstream_url = upstream_url.clone();
        }
        config
    }
}
