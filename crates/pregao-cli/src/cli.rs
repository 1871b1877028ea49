//! CLI argument definitions for pregao.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Trend and pre-market gap scan of a watchlist |
//! | `watch` | Repeat the scan on an interval |
//! | `watchlist` | Print the effective watchlist |
//! | `guide` | Explain the indicators |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json, csv) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--mock` | `false` | Offline synthetic market data |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--config` | `./pregao.toml` | Configuration file |
//! | `--log-level` | `warn` | Diagnostics level on stderr |
//! | `--no-color` | `false` | Plain terminal output |
//!
//! # Examples
//!
//! ```bash
//! # Scan the default B3 list and save the CSV report
//! pregao scan --report
//!
//! # A few tickers, largest gaps first
//! pregao scan PETR4 VALE3 ITUB4 --sort gap
//!
//! # Refresh every five minutes
//! pregao watch --every 300
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pregao_core::SortKey;

/// 📈 pregao - B3 trend and pre-market gap scanner
///
/// Fetches one year of daily bars for Brazilian equities, classifies the
/// trend against the 50 and 200 day moving averages and measures the gap
/// between the pre-market price and the previous close.
#[derive(Debug, Parser)]
#[command(
    name = "pregao",
    author,
    version,
    about = "B3 trend and pre-market gap scanner",
    long_about = "pregao scans a watchlist of B3 equities and reports, per ticker:\n\
\n\
  • last price and its distance to the 50 day average\n\
  • trend class from the 50 and 200 day averages\n\
  • pre-market gap against the previous close\n\
\n\
Use 'pregao <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - table: colored terminal dashboard (default)
    /// - json: single JSON envelope
    /// - csv: report rows as CSV
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    ///
    /// A skipped ticker or a missing gap counts as a warning.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve deterministic synthetic data instead of calling Yahoo Finance.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Configuration file (defaults to ./pregao.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Diagnostics level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Disable ANSI colors.
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored table, summary and chart.
    Table,
    /// Single JSON envelope.
    Json,
    /// Report rows as CSV on stdout.
    Csv,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📊 Scan a watchlist for trend and pre-market gap.
    ///
    /// Without tickers the default B3 list is used. Tickers without an
    /// exchange suffix get `.SA`.
    ///
    /// # Examples
    ///
    ///   pregao scan
    ///   pregao scan PETR4 VALE3 --sort gap
    ///   pregao scan --tickers-file carteira.txt --report
    Scan(ScanArgs),

    /// 🔁 Repeat the scan on an interval until Ctrl-C.
    ///
    /// Responses are cached for 15 minutes, so short intervals only
    /// refetch what expired.
    ///
    /// # Examples
    ///
    ///   pregao watch --every 300
    ///   pregao watch PETR4 VALE3 --every 60 --runs 3
    Watch(WatchArgs),

    /// 📋 Print the effective watchlist.
    Watchlist(TickerArgs),

    /// 📖 Explain moving averages, trend classes and gaps.
    Guide,
}

/// Ticker selection shared by the scanning commands.
#[derive(Debug, Clone, Default, Args)]
pub struct TickerArgs {
    /// Tickers to scan (e.g., PETR4 VALE3.SA).
    pub tickers: Vec<String>,

    /// File with tickers separated by commas or newlines; `#` starts a comment.
    #[arg(long)]
    pub tickers_file: Option<PathBuf>,
}

/// Arguments for the `scan` command.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub tickers: TickerArgs,

    /// Write the CSV report, to PATH or to market_analysis_<date>.csv.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub report: Option<Option<PathBuf>>,

    /// Directory for the default report name.
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Row order: input, ticker, gap, distance, trend.
    #[arg(long, default_value_t = SortKey::Input)]
    pub sort: SortKey,

    /// Skip the distance-to-SMA50 chart.
    #[arg(long, default_value_t = false)]
    pub no_chart: bool,

    /// Skip quote calls; every gap shows N/A.
    #[arg(long, default_value_t = false)]
    pub no_quotes: bool,

    /// Tickers fetched at the same time.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=32))]
    pub concurrency: Option<u16>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Seconds between scans.
    #[arg(long, default_value_t = 900, value_parser = clap::value_parser!(u64).range(1..))]
    pub every: u64,

    /// Stop after this many scans.
    #[arg(long)]
    pub runs: Option<u32>,
}
