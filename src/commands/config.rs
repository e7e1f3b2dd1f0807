use anyhow::Result;
use colored::Colorize;
use luxe_appraiser::config::{self, API_KEY_ENV};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration as TOML. The API key is never part of
/// the serialized config; only its masked form is shown.
pub fn show(path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!(path = %path.display(), "Loading configuration for display");

    let cfg = config::load_config_without_key(path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", toml::to_string_pretty(&cfg)?);

    let key_status = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => mask_api_key(key.trim()),
        _ => "not set".red().to_string(),
    };
    println!("{} = {}", API_KEY_ENV, key_status);

    Ok(())
}

/// Execute the config validate command
pub fn validate(path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!(path = %path.display(), "Validating configuration file");

    let cfg = config::load_config_without_key(path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  CORS Origins: {}", cfg.cors.allowed_origins.len());
    println!("  Identification Model: {}", cfg.openai.identification_model);
    println!("  Search Model: {}", cfg.openai.search_model);

    info!("Configuration validation successful");
    Ok(())
}

/// Mask an API key for safe display
///
/// Shows first 7 and last 4 characters with an ellipsis in between
/// Example: "sk-1234567890abcdef" -> "sk-1234...cdef"
pub(crate) fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        // Too short to mask meaningfully
        return "***".to_string();
    }

    let prefix: String = chars[..7].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();

    format!("{}...{}", prefix, suffix)
}
