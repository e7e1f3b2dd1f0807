use anyhow::Result;
use colored::Colorize;
use luxe_appraiser::{config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration (including the API key), initializes logging from it
/// and serves until SIGINT/SIGTERM.
pub async fn execute(path: &Path) -> Result<()> {
    println!("{}", "Starting appraiser...".green());

    // A missing API key stops startup here
    let cfg = config::load_config(path)?;

    init_tracing(&cfg.server.log_level, cfg.server.log_format == "json");
    info!(config = %path.display(), "Starting luxe-appraiser");

    server::start_server(cfg).await
}
