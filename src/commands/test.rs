use anyhow::Result;
use colored::Colorize;
use luxe_appraiser::config;
use std::path::Path;
use tracing::info;

use super::config::mask_api_key;

/// Execute the test command
///
/// Loads the configuration and the API key exactly as `start` would,
/// without binding a socket or calling the provider.
pub fn execute(path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    let cfg = config::load_config(path)?;

    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!("  {}: {} bytes", "Max Upload".cyan(), cfg.server.max_upload_bytes);
    println!();

    println!("  {}: {}", "Provider".cyan(), cfg.openai.base_url);
    println!("  {}: {}", "API Key".cyan(), mask_api_key(&cfg.openai.api_key));
    println!(
        "  {}: {} / {}",
        "Models".cyan(),
        cfg.openai.identification_model,
        cfg.openai.search_model
    );
    match cfg.openai.timeout_seconds {
        Some(secs) => println!("  {}: {}s", "Timeout".cyan(), secs),
        None => println!("  {}: client default", "Timeout".cyan()),
    }
    println!();

    println!("  {}: {}", "CORS Origins".cyan(), cfg.cors.allowed_origins.len());
    for origin in &cfg.cors.allowed_origins {
        println!("    {}", origin);
    }

    Ok(())
}
