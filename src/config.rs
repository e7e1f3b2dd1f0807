use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the provider secret
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    /// Filled from `OPENAI_API_KEY`, never from the config file
    #[serde(default, skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub identification_model: String,
    pub search_model: String,
    /// No client-side timeout when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    pub max_results: usize,
}

const DEFAULT_ORIGINS: [&str; 4] = [
    // Local development
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    // Production frontend
    "https://appraiseai.co",
    "https://ai-appraisal-suite.vercel.app",
];

/// Load configuration from defaults, an optional file and `APPRAISER__*` env vars.
///
/// The API key is read from `OPENAI_API_KEY`; a missing key is an error.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let mut cfg = load_config_without_key(path)?;
    cfg.openai.api_key = read_api_key(std::env::var(API_KEY_ENV).ok())?;
    Ok(cfg)
}

/// Same as [`load_config`] but leaves the API key empty. Used by `config show`.
pub fn load_config_without_key(path: &Path) -> anyhow::Result<Config> {
    let origins: Vec<String> = DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect();

    let config = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("server.log_level", "info")?
        .set_default("server.log_format", "text")?
        .set_default("server.max_upload_bytes", 20 * 1024 * 1024)?
        .set_default("cors.allowed_origins", origins)?
        .set_default("openai.base_url", "https://api.openai.com/v1")?
        .set_default("openai.identification_model", "gpt-4.1-mini")?
        .set_default("openai.search_model", "gpt-4.1-mini")?
        .set_default("openai.max_results", 10)?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("APPRAISER")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn read_api_key(value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => anyhow::bail!("Missing {} (set the environment variable)", API_KEY_ENV),
    }
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.host.trim().is_empty() {
        anyhow::bail!("server.host cannot be empty");
    }

    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    if !matches!(cfg.server.log_format.as_str(), "text" | "json") {
        anyhow::bail!(
            "server.log_format must be 'text' or 'json', got '{}'",
            cfg.server.log_format
        );
    }

    if cfg.server.max_upload_bytes == 0 {
        anyhow::bail!("server.max_upload_bytes must be non-zero");
    }

    for origin in &cfg.cors.allowed_origins {
        if origin.trim().is_empty() {
            anyhow::bail!("cors.allowed_origins cannot contain empty entries");
        }
    }

    if cfg.openai.base_url.trim().is_empty() {
        anyhow::bail!("openai.base_url cannot be empty");
    }

    if cfg.openai.identification_model.trim().is_empty()
        || cfg.openai.search_model.trim().is_empty()
    {
        anyhow::bail!("openai model names cannot be empty");
    }

    if cfg.openai.max_results == 0 {
        anyhow::bail!("openai.max_results must be at least 1");
    }

    if cfg.openai.timeout_seconds == Some(0) {
        anyhow::bail!("openai.timeout_seconds must be non-zero when set");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        },
        cors: CorsConfig {
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
        },
        openai: OpenAiConfig {
            api_key: "sk-test".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            identification_model: "gpt-4.1-mini".to_string(),
            search_model: "gpt-4.1-mini".to_string(),
            timeout_seconds: None,
            max_results: 10,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load_without_file() {
        let cfg = load_config_without_key(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(cfg.openai.identification_model, "gpt-4.1-mini");
        assert_eq!(cfg.openai.max_results, 10);
        assert_eq!(cfg.openai.timeout_seconds, None);
        assert_eq!(cfg.cors.allowed_origins.len(), 4);
        assert!(cfg.openai.api_key.is_empty());
    }

    #[test]
    fn test_read_api_key_requires_value() {
        assert!(read_api_key(None).is_err());
        assert!(read_api_key(Some("   ".to_string())).is_err());
        assert_eq!(read_api_key(Some(" sk-abc ".to_string())).unwrap(), "sk-abc");
    }

    #[test]
    fn test_missing_key_message_names_variable() {
        let err = read_api_key(None).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_validate_config_rejects_zero_max_results() {
        let mut cfg = create_test_config();
        cfg.openai.max_results = 0;

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_results"));
    }

    #[test]
    fn test_validate_config_rejects_blank_host() {
        let mut cfg = create_test_config();
        cfg.server.host = "  ".to_string();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_config_rejects_blank_origin() {
        let mut cfg = create_test_config();
        cfg.cors.allowed_origins.push(" ".to_string());
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_validate_config_rejects_unknown_log_format() {
        let mut cfg = create_test_config();
        cfg.server.log_format = "xml".to_string();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let cfg = create_test_config();
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(!json.contains("sk-test"));
    }
}
