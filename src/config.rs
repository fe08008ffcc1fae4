//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP server port for the API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Log output format: pretty or json.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    // === Calculator Parameters ===
    /// Investment used when a request does not supply one.
    #[serde(default = "default_investment")]
    pub default_investment: Decimal,

    /// Largest investment the API accepts.
    #[serde(default = "default_max_investment")]
    pub max_investment: Decimal,

    // === Odds Data ===
    /// JSON file with matches and bookmaker odds to preload.
    #[serde(default)]
    pub odds_seed_path: Option<String>,

    /// Preload the built-in sample fixtures when no seed file is set.
    #[serde(default = "default_true")]
    pub load_sample_data: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_investment() -> Decimal {
    Decimal::new(100, 0) // 100 units
}

fn default_max_investment() -> Decimal {
    Decimal::new(1_000_000, 0)
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            log_format: default_log_format(),
            default_investment: default_investment(),
            max_investment: default_max_investment(),
            odds_seed_path: None,
            load_sample_data: true,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_investment <= Decimal::ZERO {
            return Err("DEFAULT_INVESTMENT must be greater than 0".to_string());
        }

        if self.max_investment < self.default_investment {
            return Err("MAX_INVESTMENT must be at least DEFAULT_INVESTMENT".to_string());
        }

        if !matches!(self.log_format_lower().as_str(), "pretty" | "json") {
            return Err("LOG_FORMAT must be 'pretty' or 'json'".to_string());
        }

        Ok(())
    }

    /// Get the effective log format (lowercase).
    pub fn log_format_lower(&self) -> String {
        self.log_format.to_lowercase()
    }

    /// Check if JSON log output is requested.
    pub fn is_json_logging(&self) -> bool {
        self.log_format_lower() == "json"
    }
}
