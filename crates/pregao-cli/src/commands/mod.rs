mod guide;
pub mod scan;
mod watch;
mod watchlist;

use std::sync::Arc;

use pregao_core::{
    Envelope, HttpClient, NoopHttpClient, ReqwestHttpClient, Watchlist, YahooAdapter,
};

use crate::cli::{Cli, Command, TickerArgs};
use crate::config::Settings;
use crate::error::CliError;

/// What `main` needs to pick the exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub warning_count: usize,
    pub error_count: usize,
}

impl CommandResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn from_envelope<T>(envelope: &Envelope<T>) -> Self {
        Self {
            warning_count: envelope.meta.warnings.len(),
            error_count: envelope.errors.len(),
        }
    }
}

pub async fn run(cli: &Cli, settings: &Settings) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Scan(args) => scan::run(cli, settings, args).await,
        Command::Watch(args) => watch::run(cli, settings, args).await,
        Command::Watchlist(args) => watchlist::run(cli, settings, args),
        Command::Guide => guide::run(cli),
    }
}

/// Yahoo adapter over the real transport, or the synthetic one with `--mock`.
pub fn build_adapter(cli: &Cli, settings: &Settings) -> YahooAdapter {
    let http_client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    YahooAdapter::with_http_client(http_client)
        .with_timeout_ms(settings.timeout_ms)
        .with_adjusted_prices(settings.adjusted_prices)
}

/// Tickers from arguments and `--tickers-file` win over configured ones;
/// with nothing given anywhere the default B3 list is used.
pub fn resolve_watchlist(args: &TickerArgs, settings: &Settings) -> Result<Watchlist, CliError> {
    if !args.tickers.is_empty() || args.tickers_file.is_some() {
        return collect(&args.tickers, args.tickers_file.as_deref());
    }
    if settings.tickers.is_some() || settings.tickers_file.is_some() {
        let tickers = settings.tickers.clone().unwrap_or_default();
        return collect(&tickers, settings.tickers_file.as_deref());
    }
    Ok(Watchlist::default_b3())
}

fn collect(tickers: &[String], file: Option<&std::path::Path>) -> Result<Watchlist, CliError> {
    let mut entries = tickers.to_vec();
    if let Some(path) = file {
        let text = std::fs::read_to_string(path).map_err(|error| {
            CliError::Command(format!("cannot read tickers file {}: {error}", path.display()))
        })?;
        entries.push(text);
    }
    Ok(Watchlist::from_args(entries)?)
}
