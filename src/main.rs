//! Earth Roster - serve Earth-born Rick and Morty characters
//!
//! Fetches and caches the matching characters once at startup, then serves
//! them over a small JSON API. With `--fetch-only` it saves the characters
//! and exits instead.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use earthroster::cache::CsvStore;
use earthroster::cli::Cli;
use earthroster::data::CharactersClient;
use earthroster::refresh::{fetch_and_save, refresh_cache};
use earthroster::server::{build_app_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "earthroster=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.apply(ServerConfig::from_env()?);
    tracing::info!(
        host = %config.host,
        port = config.port,
        cache = %config.cache_path.display(),
        upstream = %config.upstream_url,
        "Loaded server configuration"
    );

    let store = Arc::new(CsvStore::new(config.cache_path.clone()));
    let source = Arc::new(CharactersClient::with_base_url(&config.upstream_url));

    if cli.fetch_only {
        fetch_and_save(source.as_ref(), store.as_ref()).await?;
        return Ok(());
    }

    let addr = config.bind_addr()?;

    if cli.skip_initial_fetch {
        tracing::info!("Skipping initial character fetch");
    } else {
        tracing::info!("Fetching character data");
        let report = refresh_cache(source.as_ref(), store.as_ref()).await?;
        tracing::info!(
            count = report.characters.len(),
            complete = report.is_complete(),
            "Found characters that match the criteria"
        );
    }

    let app = build_app_router(AppState::new(store, source));

    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
