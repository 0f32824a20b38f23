//! HTTP service exposing the cached characters
//!
//! Three read-only endpoints (`/`, `/characters`, `/healthcheck`) served by
//! axum, with collaborators injected through [`AppState`].

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, AppResult};
pub use router::build_app_router;
pub use state::AppState;
