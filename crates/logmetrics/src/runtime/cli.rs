//! Cli — command-line surface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::conf::{ColorMode, OutputFormat};
use crate::parser::{HeaderLayout, TimestampFormat};

pub const DEFAULT_LOGFILE: &str = "/app/prep/data/loopchain/log/loopchain.channel.icon_dex.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReadCommand {
    /// Read the file once, start to end.
    #[default]
    Cat,
    /// Read from the first line and keep following (`tail -n +1 -F`).
    Tail,
}

/// Turn loopchain-style logs into metric events.
#[derive(Debug, Parser)]
#[command(name = "logmetrics", version, about)]
pub struct Cli {
    /// How to read the log file.
    #[arg(value_enum, default_value_t = ReadCommand::Cat)]
    pub command: ReadCommand,

    #[arg(long, default_value = DEFAULT_LOGFILE)]
    pub logfile: PathBuf,

    /// Parse this text instead of reading a file.
    #[arg(long)]
    pub literal: Option<String>,

    /// TOML config file; overrides `LOGMETRICS_CONFIG_FILE`.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[arg(long, value_parser = parse_layout)]
    pub layout: Option<HeaderLayout>,

    #[arg(long, value_parser = parse_timestamp_format)]
    pub timestamp_format: Option<TimestampFormat>,

    /// Year used for short timestamps.
    #[arg(long)]
    pub default_year: Option<i32>,

    #[arg(long, value_parser = parse_output_format)]
    pub format: Option<OutputFormat>,

    #[arg(long, value_parser = parse_color)]
    pub color: Option<ColorMode>,

    /// Print per-call-site header counts when the stream ends.
    #[arg(long)]
    pub callsites: bool,
}

fn parse_layout(s: &str) -> Result<HeaderLayout, String> {
    s.parse()
}

fn parse_timestamp_format(s: &str) -> Result<TimestampFormat, String> {
    s.parse()
}

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn parse_color(s: &str) -> Result<ColorMode, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["logmetrics"]).unwrap();
        assert_eq!(cli.command, ReadCommand::Cat);
        assert_eq!(cli.logfile, PathBuf::from(DEFAULT_LOGFILE));
        assert!(cli.literal.is_none());
        assert!(!cli.callsites);
    }

    #[test]
    fn test_tail_with_overrides() {
        let cli = Cli::try_parse_from([
            "logmetrics",
            "tail",
            "--logfile",
            "/tmp/node.log",
            "--layout",
            "space",
            "--timestamp-format",
            "short",
            "--default-year",
            "2021",
            "--format",
            "dump",
            "--color",
            "never",
            "--callsites",
        ])
        .unwrap();
        assert_eq!(cli.command, ReadCommand::Tail);
        assert_eq!(cli.layout, Some(HeaderLayout::SpaceDelimited));
        assert_eq!(cli.timestamp_format, Some(TimestampFormat::Short));
        assert_eq!(cli.default_year, Some(2021));
        assert_eq!(cli.format, Some(OutputFormat::Dump));
        assert_eq!(cli.color, Some(ColorMode::Never));
        assert!(cli.callsites);
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["logmetrics", "head"]).is_err());
        assert!(Cli::try_parse_from(["logmetrics", "--color", "sometimes"]).is_err());
    }
}
