//! Boot — logging init and config resolution.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::ToolConfig;
use crate::error::ConfigError;
use crate::runtime::cli::Cli;

/// Initialise the tracing / logging subsystem. Diagnostics go to stderr so
/// stdout carries records only.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logmetrics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve the effective configuration.
/// Priority: CLI flags > Environment Variables > Config File > Defaults
pub fn load_config(cli: &Cli) -> Result<ToolConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            let mut config = ToolConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => ToolConfig::load()?,
    };

    apply_cli(&mut config, cli);

    config.validate().map_err(|e| {
        error!("Configuration rejected: {}", e);
        ConfigError::Invalid(e)
    })?;

    info!(
        "Parser: layout={}, timestamp_format={}, default_year={}",
        config.parser.header_layout.as_str(),
        config.parser.timestamp_format.as_str(),
        config.parser.default_year
    );
    Ok(config)
}

fn apply_cli(config: &mut ToolConfig, cli: &Cli) {
    if let Some(layout) = cli.layout {
        config.parser.header_layout = layout;
    }
    if let Some(format) = cli.timestamp_format {
        config.parser.timestamp_format = format;
    }
    if let Some(year) = cli.default_year {
        config.parser.default_year = year;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(color) = cli.color {
        config.output.color = color;
    }
    if cli.callsites {
        config.output.show_callsites = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::OutputFormat;
    use crate::parser::HeaderLayout;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]\nheader_layout = \"pipe_delimited\"\ndefault_year = 2018\n[output]\nformat = \"json\"").unwrap();
        let path = file.path().display().to_string();

        let cli = Cli::try_parse_from([
            "logmetrics", "--config", path.as_str(), "--layout", "space", "--format", "dump",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.parser.header_layout, HeaderLayout::SpaceDelimited);
        assert_eq!(config.output.format, OutputFormat::Dump);
        // untouched by flags
        assert_eq!(config.parser.default_year, 2018);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser]").unwrap();
        let path = file.path().display().to_string();

        let cli = Cli::try_parse_from(["logmetrics", "--config", path.as_str(), "--default-year", "0"]).unwrap();
        assert!(matches!(load_config(&cli), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let cli = Cli::try_parse_from(["logmetrics", "--config", "/nonexistent/logmetrics.toml"]).unwrap();
        assert!(matches!(load_config(&cli), Err(ConfigError::Io { .. })));
    }
}
