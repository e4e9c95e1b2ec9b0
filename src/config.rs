use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_USAGEY_URL: &str = "https://api.usagey.com";

/// Value shipped in `.env.example`, treated as "no key"
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub usagey: UsageyConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// "text" or "json"
    pub log_format: String,
    /// Allow any origin (the demo is called from browsers on other hosts)
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UsageyConfig {
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Serve canned data instead of calling the metering API
    #[serde(default)]
    pub use_mock_data: bool,
}

impl UsageyConfig {
    /// Whether a real API key has been configured
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    /// JSON file with an array of pricing models; built-in catalog when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            currency: default_currency(),
        }
    }
}

fn default_cors_permissive() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Unprefixed variables read from existing `.env` files
#[derive(Debug, Clone, Default)]
pub struct LegacyEnv {
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub use_mock_data: Option<bool>,
    pub port: Option<String>,
}

impl LegacyEnv {
    pub fn from_process() -> Self {
        Self {
            api_key: std::env::var("USAGEY_API_KEY").ok(),
            api_url: std::env::var("USAGEY_API_URL").ok(),
            use_mock_data: std::env::var("USE_MOCK_DATA").ok().map(|v| v == "true"),
            port: std::env::var("PORT").ok(),
        }
    }
}

/// Load and validate configuration
///
/// Sources, lowest precedence first: built-in defaults, the TOML file at
/// `path` (optional), `USAGEY_DEMO_*` variables, then `USAGEY_API_KEY`,
/// `USAGEY_API_URL`, `USE_MOCK_DATA` and `PORT`.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let cfg = read_config(path, &LegacyEnv::from_process())?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Read configuration without validating it
pub fn read_config(path: &Path, legacy: &LegacyEnv) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000_i64)?
        .set_default("server.log_format", "text")?
        .set_default("server.cors_permissive", true)?
        .set_default("usagey.api_key", "")?
        .set_default("usagey.base_url", DEFAULT_USAGEY_URL)?
        .set_default("usagey.timeout_seconds", 30_i64)?
        .set_default("usagey.use_mock_data", false)?
        .set_default("pricing.currency", "USD")?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("USAGEY_DEMO")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("usagey.api_key", legacy.api_key.clone())?
        .set_override_option("usagey.base_url", legacy.api_url.clone())?
        .set_override_option("usagey.use_mock_data", legacy.use_mock_data)?
        .set_override_option("server.port", legacy.port.clone())?
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}', expected 'text' or 'json'", other),
    }

    if cfg.usagey.timeout_seconds == 0 {
        anyhow::bail!("Usagey timeout must be at least one second");
    }

    if !cfg.usagey.base_url.starts_with("http://") && !cfg.usagey.base_url.starts_with("https://") {
        anyhow::bail!("Usagey base URL must start with http:// or https://");
    }

    if !cfg.usagey.use_mock_data && !cfg.usagey.has_api_key() {
        anyhow::bail!(
            "Usagey API key is not defined. Please set USAGEY_API_KEY or enable use_mock_data"
        );
    }

    if cfg.pricing.currency.trim().is_empty() {
        anyhow::bail!("Pricing currency cannot be empty");
    }

    Ok(())
}
