//! Recomputes the embedding of every task record in the configured store.
//!
//! Uses the same environment configuration as the server. Exits non-zero
//! when the store cannot be listed or any record failed.

use anyhow::{bail, Context, Result};
use tracing::info;

use tasklens_kb::RequestContext;
use tasklens_server::{config::ServerConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = ServerConfig::load().context("Failed to load configuration")?;
    tasklens_server::init_logging(&config);
    config.log_summary();

    let state = AppState::connect(&config)
        .await
        .context("Failed to initialize dependencies")?;

    let ctx = RequestContext::new_root();
    let report = state
        .ingestion
        .reembed_all(&ctx)
        .await
        .context("Re-embedding failed")?;

    info!(
        total = report.total,
        embedded = report.embedded,
        skipped = report.skipped,
        failed = report.failed,
        "All tasks processed"
    );

    if report.failed > 0 {
        bail!("{} of {} records failed to re-embed", report.failed, report.total);
    }
    Ok(())
}
