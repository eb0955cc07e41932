use anyhow::{Context, Result};
use tasklens_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    // Load configuration from environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    tasklens_server::init_logging(&config);

    // Run the server using the library's run function
    tasklens_server::run(config).await.context("Server error")?;

    Ok(())
}
