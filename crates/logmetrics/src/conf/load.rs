//! Load — config loading from file and environment variables.

use std::path::Path;

use super::model::{OutputConfig, ParserConfig, ToolConfig};
use crate::error::ConfigError;

pub const CONFIG_FILE_ENV: &str = "LOGMETRICS_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "/etc/logmetrics/logmetrics.toml";

impl ToolConfig {
    /// Load configuration from file, then apply environment overrides.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var(CONFIG_FILE_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// [`load`](Self::load); a map in tests).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.parser.apply_env(&lookup)?;
        self.output.apply_env(&lookup)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.parser.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

impl ParserConfig {
    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOGMETRICS_HEADER_LAYOUT") {
            self.header_layout = v.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(v) = lookup("LOGMETRICS_TIMESTAMP_FORMAT") {
            self.timestamp_format = v.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(v) = lookup("LOGMETRICS_DEFAULT_YEAR") {
            self.default_year = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LOGMETRICS_DEFAULT_YEAR is not a year: {}", v)))?;
        }
        if let Some(v) = lookup("LOGMETRICS_VOTE_SENTINEL") {
            self.vote_sentinel = v;
        }
        if let Some(v) = lookup("LOGMETRICS_STRIP_ANSI") {
            self.strip_ansi = parse_flag("LOGMETRICS_STRIP_ANSI", &v)?;
        }
        if let Some(v) = lookup("LOGMETRICS_MAX_LINE_SIZE") {
            self.max_line_size = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LOGMETRICS_MAX_LINE_SIZE is not a number: {}", v)))?;
        }
        Ok(())
    }
}

impl OutputConfig {
    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOGMETRICS_OUTPUT_FORMAT") {
            self.format = v.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(v) = lookup("LOGMETRICS_COLOR") {
            self.color = v.parse().map_err(ConfigError::Invalid)?;
        }
        if let Some(v) = lookup("LOGMETRICS_SHOW_CALLSITES") {
            self.show_callsites = parse_flag("LOGMETRICS_SHOW_CALLSITES", &v)?;
        }
        if let Some(v) = lookup("LOGMETRICS_CHANNEL_CAPACITY") {
            self.channel_capacity = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LOGMETRICS_CHANNEL_CAPACITY is not a number: {}", v)))?;
        }
        Ok(())
    }
}

/// `true`/`false`, `1`/`0`, `yes`/`no`, case-insensitive.
fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid(format!("{} is not a boolean: {}", key, value))),
    }
}
