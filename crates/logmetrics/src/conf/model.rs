//! Model — ToolConfig and related structs.

use serde::{Deserialize, Serialize};

use crate::parser::{HeaderLayout, TimestampFormat, DEFAULT_YEAR, MAX_LINE_SIZE, VOTE_SENTINEL};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub header_layout: HeaderLayout,
    pub timestamp_format: TimestampFormat,
    /// Substituted when `timestamp_format = "short"`.
    pub default_year: i32,
    pub vote_sentinel: String,
    pub strip_ansi: bool,
    pub max_line_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: ColorMode,
    pub show_callsites: bool,
    /// Bound of the queue between the parsing task and the printer.
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Indented key/value listing.
    Dump,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "dump" => Ok(OutputFormat::Dump),
            other => Err(format!("unknown output format '{}' (expected json|dump)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!("unknown color mode '{}' (expected auto|always|never)", other)),
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_layout: HeaderLayout::default(),
            timestamp_format: TimestampFormat::default(),
            default_year: DEFAULT_YEAR,
            vote_sentinel: VOTE_SENTINEL.to_string(),
            strip_ansi: true,
            max_line_size: MAX_LINE_SIZE,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: ColorMode::default(),
            show_callsites: false,
            channel_capacity: 1024,
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(1970..=9999).contains(&self.default_year) {
            return Err(format!("parser.default_year must be within 1970..=9999, got {}", self.default_year));
        }
        if self.max_line_size == 0 {
            return Err("parser.max_line_size must be > 0".to_string());
        }
        if self.vote_sentinel.is_empty() {
            return Err("parser.vote_sentinel must not be empty".to_string());
        }
        Ok(())
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_capacity == 0 {
            return Err("output.channel_capacity must be > 0".to_string());
        }
        Ok(())
    }
}
