//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Page sizes offered by every table.
pub const PAGE_SIZES: [usize; 5] = [5, 10, 20, 50, 100];

/// Log levels accepted in `[logging] level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub company: CompanyConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HRIS backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Pre-issued bearer token.
    pub token: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Company-wide billing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    /// VAT applied on checkout, in percent.
    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: u32,
}

fn default_tax_rate() -> u32 {
    11
}

/// UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub page_size: usize,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    /// Overrides the platform data directory for log files.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Platform project directories (config, data).
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("id", "hris", "hris-desk")
    }

    /// Get config file path in the platform config directory.
    ///
    /// Falls back to the executable's directory when no home directory exists.
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = Self::project_dirs() {
            return dirs.config_dir().join("config.toml");
        }

        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Validation("API base URL cannot be empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "API base URL must start with http:// or https://".to_string(),
            ));
        }
        if self.api.timeout_secs < 5 {
            return Err(ConfigError::Validation(
                "API timeout must be at least 5 seconds".to_string(),
            ));
        }
        if self.api.timeout_secs > 300 {
            return Err(ConfigError::Validation("API timeout cannot exceed 300 seconds".to_string()));
        }
        if self.company.tax_rate_percent > 100 {
            return Err(ConfigError::Validation("Tax rate cannot exceed 100%".to_string()));
        }
        if !PAGE_SIZES.contains(&self.ui.page_size) {
            return Err(ConfigError::Validation(format!(
                "Page size must be one of {PAGE_SIZES:?}"
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ApiConfig {
    /// Join the base URL and an endpoint path with exactly one slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{base}/{path}",
            base = self.base_url.trim().trim_end_matches('/'),
            path = path.trim_start_matches('/')
        )
    }

    /// Whether a token has been entered.
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "My Company".to_string(),
            tax_rate_percent: default_tax_rate(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: true,
            directory: None,
        }
    }
}
