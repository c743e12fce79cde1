//! deploywatch - deployment status tools over stdio
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use deploywatch_api::utils::logging::{init_tracing, LogFormat};
use deploywatch_api::{serve, ToolHandler};
use tokio::io::BufReader;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration from the environment
    let dotenv = dotenvy::dotenv();
    init_tracing(LogFormat::from_env());

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    let config = deploywatch_infra::load(None).context("failed to load configuration")?;
    let handler = ToolHandler::from_config(config);
    info!(platforms = ?handler.supported_platforms(), "deploywatch started");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let result = tokio::select! {
        served = serve(&handler, stdin, stdout) => {
            served.map(|handled| info!(handled, "Input closed")).context("stdio transport failed")
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    handler.dispose().await;
    result
}
