//! Watchlist scan: fetch, analyze, collect.
//!
//! Each ticker runs as its own task. A failing ticker never aborts the scan;
//! it lands in [`ScanReport::skipped`] with the reason. A failing quote call
//! only costs the ticker its gap, recorded in [`ScanReport::quote_errors`].

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::analysis::{analyze, Analysis, AnalysisConfig, SkipReason};
use crate::data_source::{BarsRequest, DataSource, QuoteRequest, SourceError};
use crate::{HistoryRange, Interval, ProviderPolicy, Symbol, UtcDateTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    pub range: HistoryRange,
    /// Tickers fetched at the same time.
    pub concurrency: usize,
    pub analysis: AnalysisConfig,
    /// When off, no quote calls are made and every gap is `None`.
    pub fetch_quotes: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            range: HistoryRange::OneYear,
            concurrency: ProviderPolicy::yahoo().max_concurrency,
            analysis: AnalysisConfig::default(),
            fetch_quotes: true,
        }
    }
}

/// Receives per-ticker progress. `index` is the ticker's position in the
/// input, `completed` the number of tickers finished so far.
pub trait ScanProgress: Send + Sync {
    fn on_start(&self, index: usize, total: usize, symbol: &Symbol) {
        let _ = (index, total, symbol);
    }

    fn on_finish(&self, completed: usize, total: usize, symbol: &Symbol, analyzed: bool) {
        let _ = (completed, total, symbol, analyzed);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ScanProgress for NoProgress {}

/// A ticker-level problem kept for the report instead of failing the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerIssue {
    pub symbol: Symbol,
    pub code: String,
    pub message: String,
}

impl TickerIssue {
    fn new(symbol: Symbol, reason: &SkipReason) -> Self {
        Self {
            symbol,
            code: reason.code().to_owned(),
            message: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: UtcDateTime,
    pub requested: usize,
    /// In input order.
    pub analyses: Vec<Analysis>,
    pub skipped: Vec<TickerIssue>,
    pub quote_errors: Vec<TickerIssue>,
    pub latency_ms: u64,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    /// Human-readable lines for every skipped ticker and failed quote.
    pub fn warnings(&self) -> Vec<String> {
        let skipped = self
            .skipped
            .iter()
            .map(|issue| format!("{} skipped: {}", issue.symbol, issue.message));
        let quotes = self
            .quote_errors
            .iter()
            .map(|issue| format!("{} gap unavailable: {}", issue.symbol, issue.message));
        skipped.chain(quotes).collect()
    }
}

enum TickerOutcome {
    Analyzed {
        analysis: Analysis,
        quote_error: Option<TickerIssue>,
    },
    Skipped(TickerIssue),
}

/// Runs scans against one data source.
#[derive(Clone)]
pub struct MarketScanner {
    source: Arc<dyn DataSource>,
    options: ScanOptions,
}

impl MarketScanner {
    pub fn new(source: Arc<dyn DataSource>, options: ScanOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub async fn scan(&self, symbols: &[Symbol], progress: Arc<dyn ScanProgress>) -> ScanReport {
        let started = Instant::now();
        let total = symbols.len();
        let permits = Arc::new(Semaphore::new(
            self.options.concurrency.clamp(1, Semaphore::MAX_PERMITS),
        ));
        let mut tasks = JoinSet::new();

        tracing::info!(
            tickers = total,
            concurrency = self.options.concurrency,
            source = %self.source.id(),
            "scan started"
        );

        for (index, symbol) in symbols.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            let progress = Arc::clone(&progress);
            let options = self.options;

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    let reason = SkipReason::from(SourceError::internal("scan was cancelled"));
                    return (index, TickerOutcome::Skipped(TickerIssue::new(symbol, &reason)));
                };
                progress.on_start(index, total, &symbol);
                let outcome = scan_ticker(source.as_ref(), symbol, &options).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<TickerOutcome>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut completed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    completed += 1;
                    let analyzed = matches!(outcome, TickerOutcome::Analyzed { .. });
                    progress.on_finish(completed, total, &symbols[index], analyzed);
                    slots[index] = Some(outcome);
                }
                Err(error) => {
                    tracing::error!(%error, "ticker task failed");
                }
            }
        }

        let mut analyses = Vec::new();
        let mut skipped = Vec::new();
        let mut quote_errors = Vec::new();
        for (symbol, slot) in symbols.iter().zip(slots) {
            match slot {
                Some(TickerOutcome::Analyzed {
                    analysis,
                    quote_error,
                }) => {
                    analyses.push(analysis);
                    quote_errors.extend(quote_error);
                }
                Some(TickerOutcome::Skipped(issue)) => skipped.push(issue),
                None => {
                    let reason = SkipReason::from(SourceError::internal("ticker task aborted"));
                    skipped.push(TickerIssue::new(symbol.clone(), &reason));
                }
            }
        }

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            analyzed = analyses.len(),
            skipped = skipped.len(),
            latency_ms,
            "scan finished"
        );

        ScanReport {
            generated_at: UtcDateTime::now(),
            requested: total,
            analyses,
            skipped,
            quote_errors,
            latency_ms,
        }
    }
}

async fn scan_ticker(source: &dyn DataSource, symbol: Symbol, options: &ScanOptions) -> TickerOutcome {
    tracing::debug!(%symbol, "fetching history");

    let request = BarsRequest::new(symbol.clone(), Interval::OneDay, options.range);
    let series = match source.bars(request).await {
        Ok(series) => series,
        Err(error) => {
            tracing::warn!(%symbol, %error, "history unavailable, skipping");
            let reason = SkipReason::from(error);
            return TickerOutcome::Skipped(TickerIssue::new(symbol, &reason));
        }
    };

    let mut quote_error = None;
    let quote = if options.fetch_quotes {
        match source.quote(QuoteRequest::single(symbol.clone())).await {
            Ok(batch) => batch.find(&symbol).cloned(),
            Err(error) => {
                tracing::warn!(%symbol, %error, "quote unavailable, gap will be empty");
                quote_error = Some(TickerIssue::new(symbol.clone(), &SkipReason::from(error)));
                None
            }
        }
    } else {
        None
    };

    match analyze(&series, quote.as_ref(), &options.analysis) {
        Ok(analysis) => {
            tracing::debug!(%symbol, trend = %analysis.trend, gap = ?analysis.gap_pct, "analyzed");
            TickerOutcome::Analyzed {
                analysis,
                quote_error,
            }
        }
        Err(reason) => {
            tracing::info!(%symbol, %reason, "skipping ticker");
            TickerOutcome::Skipped(TickerIssue::new(symbol, &reason))
        }
    }
}
