use std::path::PathBuf;
use std::sync::Arc;

use pregao_core::{
    default_report_name, sort_analyses, write_csv, Analysis, DataSource, Envelope, EnvelopeError,
    MarketScanner, ProviderId, ReportRow, ScanOptions, ScanProgress, Symbol, SummaryMetrics,
    TickerIssue, YahooAdapter,
};
use serde::Serialize;

use crate::cli::{Cli, ScanArgs};
use crate::config::Settings;
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{self, RenderOptions, StderrProgress};

use super::{build_adapter, resolve_watchlist, CommandResult};

#[derive(Debug, Serialize)]
pub struct ScanData {
    pub summary: SummaryMetrics,
    /// In display order.
    pub analyses: Vec<Analysis>,
    pub skipped: Vec<TickerIssue>,
    pub quote_errors: Vec<TickerIssue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

/// A finished scan, ready for any output format.
#[derive(Debug)]
pub struct ScanOutcome {
    pub envelope: Envelope<ScanData>,
    pub rows: Vec<ReportRow>,
}

pub async fn run(cli: &Cli, settings: &Settings, args: &ScanArgs) -> Result<CommandResult, CliError> {
    let watchlist = resolve_watchlist(&args.tickers, settings)?;
    let adapter = Arc::new(build_adapter(cli, settings));
    let progress: Arc<dyn ScanProgress> = Arc::new(StderrProgress::new(cli.format));

    let outcome = scan_once(&adapter, watchlist.symbols(), settings, args, progress).await?;
    output::render_scan(&outcome, cli.format, cli.pretty, render_options(cli, args))?;

    Ok(CommandResult::from_envelope(&outcome.envelope))
}

pub(crate) fn render_options(cli: &Cli, args: &ScanArgs) -> RenderOptions {
    RenderOptions {
        color: output::color_enabled(cli.no_color),
        chart: !args.no_chart,
    }
}

/// Runs one scan, sorts it, writes the CSV report when asked and wraps the
/// result in an envelope.
pub(crate) async fn scan_once(
    adapter: &Arc<YahooAdapter>,
    symbols: &[Symbol],
    settings: &Settings,
    args: &ScanArgs,
    progress: Arc<dyn ScanProgress>,
) -> Result<ScanOutcome, CliError> {
    let options = ScanOptions {
        range: settings.range,
        concurrency: args
            .concurrency
            .map_or(settings.concurrency, usize::from)
            .max(1),
        analysis: settings.analysis,
        fetch_quotes: !args.no_quotes,
    };

    let hits_before = adapter.cache().hits().await;
    let source: Arc<dyn DataSource> = Arc::clone(adapter) as Arc<dyn DataSource>;
    let mut report = MarketScanner::new(source, options).scan(symbols, progress).await;
    let cache_hit = adapter.cache().hits().await > hits_before;

    sort_analyses(&mut report.analyses, args.sort);
    let rows = report
        .analyses
        .iter()
        .map(ReportRow::from_analysis)
        .collect::<Vec<_>>();
    let summary = SummaryMetrics::from_report(&report);

    let metadata = Metadata::new(ProviderId::Yahoo);
    let mut meta = metadata.scan_meta(&report, cache_hit)?;

    let mut report_path = None;
    if let Some(requested) = &args.report {
        if rows.is_empty() {
            meta.push_warning("report not written: no ticker was analyzed");
        } else {
            let path = requested.clone().unwrap_or_else(|| {
                args.report_dir
                    .clone()
                    .unwrap_or_else(|| settings.report_dir.clone())
                    .join(default_report_name(report.generated_at))
            });
            write_csv(&path, &rows)?;
            report_path = Some(path);
        }
    }

    let mut errors = Vec::new();
    if report.is_empty() {
        errors.push(
            EnvelopeError::new(
                "scan.no_results",
                format!("none of the {} tickers could be analyzed", report.requested),
            )?
            .with_source(ProviderId::Yahoo),
        );
        for issue in &report.skipped {
            errors.push(EnvelopeError::from_issue(issue, ProviderId::Yahoo)?);
        }
    }

    let data = ScanData {
        summary,
        analyses: report.analyses,
        skipped: report.skipped,
        quote_errors: report.quote_errors,
        report_path,
    };
    let envelope = Envelope::with_errors(meta, data, errors)?;

    Ok(ScanOutcome { envelope, rows })
}
