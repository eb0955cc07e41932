//!
//! Tasklens Server - HTTP front end of the task embedding service
//!
//! This module exports all the components of the Tasklens Server.

/// API module
pub mod api;

/// Server module
pub mod server;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

// Re-export key types
pub use config::{LogFormat, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{AppState, TasklensServer};

/// Run function
///
/// Connects the dependencies and serves until shutdown. Logging must be
/// initialized by the caller.
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    config.log_summary();

    let state = AppState::connect(&config).await?;
    let server = TasklensServer::new(config, state);

    server.run().await
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create filter based on config
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(true).with_line_number(true))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
