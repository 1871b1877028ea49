use std::io::IsTerminal;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

use crate::error::CliError;

/// Installs the stderr subscriber. Our crates log at `level`; dependencies
/// never go below `warn`, so `--log-level debug` does not flood the terminal
/// with HTTP internals.
pub fn init(level: &str, ansi: bool) -> Result<(), CliError> {
    let level = parse_level(level)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi && std::io::stderr().is_terminal())
        .with_filter(filter_for(level));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .map_err(|error| CliError::Command(format!("logging setup failed: {error}")))
}

fn parse_level(level: &str) -> Result<LevelFilter, CliError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| CliError::Command(format!("invalid log level '{level}'")))
}

fn filter_for(level: LevelFilter) -> Targets {
    Targets::new()
        .with_target("pregao_core", level)
        .with_target("pregao", level)
        .with_default(level.min(LevelFilter::WARN))
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(parse_level("DEBUG").expect("level"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" off ").expect("level"), LevelFilter::OFF);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn dependencies_stay_at_warn() {
        let filter = filter_for(LevelFilter::DEBUG);
        assert!(filter.would_enable("pregao_core::scanner", &Level::DEBUG));
        assert!(!filter.would_enable("hyper::proto", &Level::INFO));
        assert!(filter.would_enable("hyper::proto", &Level::WARN));
    }

    #[test]
    fn quiet_levels_apply_everywhere() {
        let filter = filter_for(LevelFilter::ERROR);
        assert!(!filter.would_enable("reqwest", &Level::WARN));
        assert!(!filter.would_enable("pregao_core", &Level::WARN));
    }
}
