//! Layered settings: built-in defaults, then the TOML file, then `PREGAO_*`
//! environment variables, then global flags. Command flags such as
//! `--concurrency` are applied by the command itself.
//!
//! ```toml
//! tickers = ["PETR4", "VALE3", "ITUB4"]
//! report_dir = "reports"
//! concurrency = 6
//! timeout_ms = 8000
//! log_level = "info"
//! range = "1y"
//! adjusted_prices = true
//!
//! [analysis]
//! fast_window = 50
//! slow_window = 200
//! min_history = 200
//! ```

use std::path::{Path, PathBuf};

use pregao_core::{AnalysisConfig, HistoryRange, ProviderPolicy, DEFAULT_TIMEOUT_MS};
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::CliError;

pub const DEFAULT_CONFIG_FILE: &str = "pregao.toml";

const DEFAULT_CONCURRENCY: usize = ProviderPolicy::yahoo().max_concurrency;
/// Same ceiling as `scan --concurrency`.
const MAX_CONCURRENCY: usize = 32;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Contents of `pregao.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub tickers: Option<Vec<String>>,
    pub tickers_file: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub range: Option<HistoryRange>,
    pub adjusted_prices: Option<bool>,
    pub analysis: Option<AnalysisConfig>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|error| CliError::Config {
            path: path.to_path_buf(),
            message: error.to_string(),
        })
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `None` means the default B3 list.
    pub tickers: Option<Vec<String>>,
    pub tickers_file: Option<PathBuf>,
    pub report_dir: PathBuf,
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub log_level: String,
    pub range: HistoryRange,
    pub adjusted_prices: bool,
    pub analysis: AnalysisConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tickers: None,
            tickers_file: None,
            report_dir: PathBuf::from("."),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            range: HistoryRange::default(),
            adjusted_prices: true,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self, CliError> {
        let file = read_config_file(cli.config.as_deref())?;
        let mut settings = Self::default();
        if let Some(file) = file {
            settings.apply_file(file);
        }
        settings.apply_env(|name| std::env::var(name).ok())?;

        if let Some(timeout_ms) = cli.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(level) = &cli.log_level {
            settings.log_level = level.clone();
        }

        let origin = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        settings.check_concurrency(&origin)?;
        settings.analysis.validate()?;
        Ok(settings)
    }

    /// `concurrency` comes from the file or `PREGAO_CONCURRENCY`; both are
    /// held to the range the command flag accepts.
    fn check_concurrency(&self, origin: &Path) -> Result<(), CliError> {
        if (1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Ok(());
        }
        Err(CliError::Config {
            path: origin.to_path_buf(),
            message: format!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {} \
                 (from the file or PREGAO_CONCURRENCY)",
                self.concurrency
            ),
        })
    }

    fn apply_file(&mut self, file: FileConfig) {
        if file.tickers.is_some() {
            self.tickers = file.tickers;
        }
        if file.tickers_file.is_some() {
            self.tickers_file = file.tickers_file;
        }
        if let Some(dir) = file.report_dir {
            self.report_dir = dir;
        }
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout_ms) = file.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(range) = file.range {
            self.range = range;
        }
        if let Some(adjusted) = file.adjusted_prices {
            self.adjusted_prices = adjusted;
        }
        if let Some(analysis) = file.analysis {
            self.analysis = analysis;
        }
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<(), CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tickers) = lookup("PREGAO_TICKERS").filter(|value| !value.trim().is_empty()) {
            self.tickers = Some(vec![tickers]);
        }
        if let Some(dir) = lookup("PREGAO_REPORT_DIR").filter(|value| !value.trim().is_empty()) {
            self.report_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("PREGAO_CONCURRENCY") {
            self.concurrency = parse_env("PREGAO_CONCURRENCY", &value)?;
        }
        if let Some(value) = lookup("PREGAO_TIMEOUT_MS") {
            self.timeout_ms = parse_env("PREGAO_TIMEOUT_MS", &value)?;
        }
        if let Some(level) = lookup("PREGAO_LOG").filter(|value| !value.trim().is_empty()) {
            self.log_level = level;
        }
        Ok(())
    }
}

fn read_config_file(explicit: Option<&Path>) -> Result<Option<FileConfig>, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                return Ok(None);
            }
            fallback
        }
    };

    let text = std::fs::read_to_string(&path).map_err(|error| CliError::Config {
        path: path.clone(),
        message: error.to_string(),
    })?;
    FileConfig::parse(&text, &path).map(Some)
}

fn parse_env<T>(name: &'static str, value: &str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|error: T::Err| CliError::Env {
        name,
        message: error.to_string(),
    })
}
