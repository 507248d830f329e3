use crate::{CliError, Result};
use kitchen_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use kitchen_core::parsing::parse_amount;
use kitchen_core::{CostCalculator, Decimal, StockThresholds};
use kitchen_utils::CurrencyFormatter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const BASE_URL_ENV: &str = "KITCHEN_API_URL";

/// Every key accepted by `config get` and `config set`.
pub const CONFIG_KEYS: [&str; 8] = [
    "api.base_url",
    "api.timeout_secs",
    "display.currency_symbol",
    "stock.low",
    "stock.medium",
    "stock.reference_capacity",
    "stock.low_stock_threshold",
    "stock.home_threshold",
];

/// Configuration-specific errors that can occur during config operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown config key: {0}. Valid keys: {}", CONFIG_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config directory creation failed: {0}")]
    DirectoryCreationFailed(String),

    #[error("TOML parsing error: {0}")]
    TomlError(String),
}

/// `[api]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[display]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplaySection {
    pub currency_symbol: Option<String>,
}

/// `[stock]` section. Amounts are stored as strings so they stay exact.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StockSection {
    pub low: Option<Decimal>,
    pub medium: Option<Decimal>,
    pub reference_capacity: Option<Decimal>,
    /// Default for `ingredients ls --low` without a value.
    pub low_stock_threshold: Option<Decimal>,
    /// Threshold for the alert block of `kitchen status`.
    pub home_threshold: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigData {
    pub api: Option<ApiSection>,
    pub display: Option<DisplaySection>,
    pub stock: Option<StockSection>,
}

impl kitchen_api::ApiConfig for Config {
    type Error = CliError;

    fn get_base_url(&self) -> std::result::Result<Option<String>, Self::Error> {
        Ok(Some(self.base_url()))
    }

    fn get_timeout(&self) -> std::result::Result<Option<Duration>, Self::Error> {
        Ok(Some(self.timeout()))
    }
}

/// Configuration manager that handles loading, saving, and accessing configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub data: ConfigData,
}

impl Config {
    /// Load `~/.kitchen/config.toml`, or defaults when the file does not exist yet.
    pub fn new() -> Result<Self> {
        let config_dir = get_config_dir()?;
        Self::load_from(config_dir.join("config.toml"))
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(config_path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = config_path.into();

        let data = if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(CliError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?
        } else {
            ConfigData::default()
        };

        Ok(Config { config_path, data })
    }

    /// Save the configuration to file with atomic write
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.data)
            .map_err(|e| ConfigError::TomlError(e.to_string()))?;

        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::DirectoryCreationFailed(e.to_string()))?;
            }
        }

        // Write to a temporary file first, then rename
        let temp_path = self.config_path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(CliError::Io)?;
        fs::rename(&temp_path, &self.config_path).map_err(CliError::Io)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Base URL: environment variable first, then the config file, then the default.
    pub fn base_url(&self) -> String {
        resolve_base_url(
            std::env::var(BASE_URL_ENV).ok(),
            self.data.api.as_ref().and_then(|api| api.base_url.clone()),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.data
            .api
            .as_ref()
            .and_then(|api| api.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn currency_formatter(&self) -> CurrencyFormatter {
        match self
            .data
            .display
            .as_ref()
            .and_then(|display| display.currency_symbol.clone())
        {
            Some(symbol) => CurrencyFormatter {
                symbol,
                ..CurrencyFormatter::default()
            },
            None => CurrencyFormatter::default(),
        }
    }

    /// Stock tier thresholds, falling back to the defaults per field.
    pub fn thresholds(&self) -> Result<StockThresholds> {
        let defaults = StockThresholds::default();
        let stock = self.data.stock.clone().unwrap_or_default();

        Ok(StockThresholds::new(
            stock.low.unwrap_or(defaults.low),
            stock.medium.unwrap_or(defaults.medium),
            stock.reference_capacity.unwrap_or(defaults.reference_capacity),
        )?)
    }

    pub fn calculator(&self) -> Result<CostCalculator> {
        Ok(CostCalculator::new(self.thresholds()?))
    }

    /// Threshold used by `ingredients ls --low` (server default 10).
    pub fn low_stock_threshold(&self) -> Decimal {
        self.data
            .stock
            .as_ref()
            .and_then(|stock| stock.low_stock_threshold)
            .unwrap_or_else(|| Decimal::new(10, 0))
    }

    /// Threshold used by the `status` overview (20 by default).
    pub fn home_threshold(&self) -> Decimal {
        self.data
            .stock
            .as_ref()
            .and_then(|stock| stock.home_threshold)
            .unwrap_or_else(|| Decimal::new(20, 0))
    }

    /// Read a dotted key as it is stored in the file.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let api = self.data.api.as_ref();
        let stock = self.data.stock.as_ref();

        let value = match key {
            "api.base_url" => api.and_then(|a| a.base_url.clone()),
            "api.timeout_secs" => api.and_then(|a| a.timeout_secs).map(|t| t.to_string()),
            "display.currency_symbol" => self
                .data
                .display
                .as_ref()
                .and_then(|d| d.currency_symbol.clone()),
            "stock.low" => stock.and_then(|s| s.low).map(|v| v.to_string()),
            "stock.medium" => stock.and_then(|s| s.medium).map(|v| v.to_string()),
            "stock.reference_capacity" => {
                stock.and_then(|s| s.reference_capacity).map(|v| v.to_string())
            }
            "stock.low_stock_threshold" => {
                stock.and_then(|s| s.low_stock_threshold).map(|v| v.to_string())
            }
            "stock.home_threshold" => stock.and_then(|s| s.home_threshold).map(|v| v.to_string()),
            other => return Err(ConfigError::UnknownKey(other.to_string()).into()),
        };

        Ok(value)
    }

    /// Validate and set a dotted key. Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "api.base_url" => {
                kitchen_api::normalize_base_url(value).map_err(|_| invalid())?;
                self.api_section().base_url = Some(value.trim().to_string());
            }
            "api.timeout_secs" => {
                let secs = value.trim().parse::<u64>().map_err(|_| invalid())?;
                if secs == 0 {
                    return Err(invalid().into());
                }
                self.api_section().timeout_secs = Some(secs);
            }
            "display.currency_symbol" => {
                if value.trim().is_empty() {
                    return Err(invalid().into());
                }
                self.data
                    .display
                    .get_or_insert_with(DisplaySection::default)
                    .currency_symbol = Some(value.trim().to_string());
            }
            "stock.low" | "stock.medium" | "stock.reference_capacity" => {
                let amount = parse_amount(value).map_err(|_| invalid())?;
                let mut candidate = self.data.stock.clone().unwrap_or_default();
                match key {
                    "stock.low" => candidate.low = Some(amount),
                    "stock.medium" => candidate.medium = Some(amount),
                    _ => candidate.reference_capacity = Some(amount),
                }

                // Reject combinations the calculator would refuse later.
                let defaults = StockThresholds::default();
                StockThresholds::new(
                    candidate.low.unwrap_or(defaults.low),
                    candidate.medium.unwrap_or(defaults.medium),
                    candidate.reference_capacity.unwrap_or(defaults.reference_capacity),
                )?;
                self.data.stock = Some(candidate);
            }
            "stock.low_stock_threshold" => {
                let amount = parse_amount(value).map_err(|_| invalid())?;
                self.stock_section().low_stock_threshold = Some(amount);
            }
            "stock.home_threshold" => {
                let amount = parse_amount(value).map_err(|_| invalid())?;
                self.stock_section().home_threshold = Some(amount);
            }
            other => return Err(ConfigError::UnknownKey(other.to_string()).into()),
        }

        Ok(())
    }

    /// Drop every stored value.
    pub fn reset(&mut self) {
        self.data = ConfigData::default();
    }

    /// Show all configuration as a formatted string
    pub fn show_config(&self) -> String {
        toml::to_string_pretty(&self.data).unwrap_or_else(|_| "Error formatting config".to_string())
    }

    fn api_section(&mut self) -> &mut ApiSection {
        self.data.api.get_or_insert_with(ApiSection::default)
    }

    fn stock_section(&mut self) -> &mut StockSection {
        self.data.stock.get_or_insert_with(StockSection::default)
    }
}

/// Pick the effective base URL from the environment and file values.
pub fn resolve_base_url(from_env: Option<String>, from_file: Option<String>) -> String {
    from_env
        .filter(|url| !url.trim().is_empty())
        .or(from_file)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn load_config() -> Result<Config> {
    Config::new()
}

/// Gets the path to the configuration directory (`~/.kitchen/`).
fn get_config_dir() -> Result<PathBuf> {
    let home_dir = home::home_dir().ok_or_else(|| {
        ConfigError::DirectoryCreationFailed("Could not find home directory".to_string())
    })?;

    Ok(home_dir.join(".kitchen"))
}
