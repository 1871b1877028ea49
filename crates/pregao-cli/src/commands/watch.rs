use std::sync::Arc;
use std::time::Duration;

use pregao_core::ScanProgress;
use tokio::time::MissedTickBehavior;

use crate::cli::{Cli, OutputFormat, WatchArgs};
use crate::config::Settings;
use crate::error::CliError;
use crate::output::{self, StderrProgress};

use super::scan::{render_options, scan_once};
use super::{build_adapter, resolve_watchlist, CommandResult};

/// Scans every `--every` seconds with one adapter, so its response cache
/// carries over between runs. Ctrl-C is honored between scans.
pub async fn run(cli: &Cli, settings: &Settings, args: &WatchArgs) -> Result<CommandResult, CliError> {
    let watchlist = resolve_watchlist(&args.scan.tickers, settings)?;
    let adapter = Arc::new(build_adapter(cli, settings));
    let options = render_options(cli, &args.scan);

    let mut ticker = tokio::time::interval(Duration::from_secs(args.every));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last = CommandResult::ok();
    let mut runs: u32 = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(runs, "watch interrupted");
                break;
            }
            _ = ticker.tick() => {
                adapter.cache().clear_expired().await;
                if runs > 0 && cli.format == OutputFormat::Table {
                    println!();
                }

                let progress: Arc<dyn ScanProgress> = Arc::new(StderrProgress::new(cli.format));
                let outcome = scan_once(&adapter, watchlist.symbols(), settings, &args.scan, progress).await?;
                output::render_scan(&outcome, cli.format, cli.pretty, options)?;

                last = CommandResult::from_envelope(&outcome.envelope);
                runs += 1;
                tracing::info!(
                    runs,
                    analyzed = outcome.rows.len(),
                    next_in_secs = args.every,
                    "watch scan finished"
                );

                if args.runs.is_some_and(|limit| runs >= limit) {
                    break;
                }
            }
        }
    }

    Ok(last)
}
