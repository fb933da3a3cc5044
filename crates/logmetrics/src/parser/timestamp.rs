//! Header timestamp grammar.
//!
//! Two layouts are seen in node logs:
//! - full: `2020-12-30 00:01:57,131`
//! - short: `1230 00:01:57,131` (no year; a configured default is substituted)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `YYYY-MM-DD HH:MM:SS,mmm`
    #[default]
    Full,
    /// `MMDD HH:MM:SS,mmm`
    Short,
}

impl TimestampFormat {
    /// Regex fragment matching the syntactic shape of the timestamp.
    /// Calendar validity is checked later by [`TimestampParser::parse`].
    pub fn pattern(&self) -> &'static str {
        match self {
            TimestampFormat::Full => r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3}",
            TimestampFormat::Short => r"\d{4} \d{2}:\d{2}:\d{2},\d{3}",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampFormat::Full => "full",
            TimestampFormat::Short => "short",
        }
    }
}

impl std::str::FromStr for TimestampFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(TimestampFormat::Full),
            "short" => Ok(TimestampFormat::Short),
            other => Err(format!("unknown timestamp_format '{}' (expected full|short)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimestampParser {
    format: TimestampFormat,
    default_year: i32,
}

impl TimestampParser {
    pub fn new(format: TimestampFormat, default_year: i32) -> Self {
        Self { format, default_year }
    }

    pub fn format(&self) -> TimestampFormat {
        self.format
    }

    /// Parse a captured timestamp. Returns `None` for anything chrono rejects
    /// (e.g. month 13), which demotes the header to a plain line.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        // chrono wants a dot before the fraction
        let dotted = raw.replacen(',', ".", 1);
        match self.format {
            TimestampFormat::Full => {
                NaiveDateTime::parse_from_str(&dotted, "%Y-%m-%d %H:%M:%S%.3f").ok()
            }
            TimestampFormat::Short => {
                let with_year = format!("{:04}-{}", self.default_year, dotted);
                NaiveDateTime::parse_from_str(&with_year, "%Y-%m%d %H:%M:%S%.3f").ok()
            }
        }
    }
}
