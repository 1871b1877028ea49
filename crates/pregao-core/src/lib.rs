//! # Pregão Core
//!
//! Market data, trend classification and pre-market gap analysis for B3
//! (Brasil Bolsa Balcão) equities.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, bars, series and quotes
//! - **Yahoo Finance adapter** for daily chart history and quotes, with an
//!   offline synthetic mode
//! - **Resilience**: retry with backoff, circuit breaker, request throttling
//!   and a TTL response cache
//! - **Analysis**: SMA50/SMA200 trend classes and the pre-market gap
//! - **Scanner** running a watchlist with bounded concurrency
//! - **Report** rows, summary metrics and CSV output
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance adapter and session handling |
//! | [`analysis`] | Trend, gap and distance calculations |
//! | [`cache`] | In-memory TTL response cache |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`data_source`] | Data source trait and request/response types |
//! | [`domain`] | Domain models (Symbol, Bar, BarSeries, Quote) |
//! | [`envelope`] | JSON response envelope |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`indicators`] | Moving averages |
//! | [`provider_policy`] | Request budget per provider |
//! | [`report`] | Table rows, summary metrics, CSV |
//! | [`retry`] | Retry policy and backoff |
//! | [`scanner`] | Watchlist scan |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Rate limiting |
//! | [`watchlist`] | Default B3 list and ticker parsing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pregao_core::{MarketScanner, NoProgress, ScanOptions, Watchlist, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = MarketScanner::new(Arc::new(YahooAdapter::default()), ScanOptions::default());
//!     let watchlist = Watchlist::default_b3();
//!     let report = scanner.scan(watchlist.symbols(), Arc::new(NoProgress)).await;
//!
//!     for row in &report.analyses {
//!         println!("{} {} {:?}", row.symbol, row.trend, row.gap_pct);
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Per-ticker failures never abort a scan; they are collected in the report:
//!
//! ```rust
//! use pregao_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::NotFound => "unknown or delisted ticker",
//!         SourceErrorKind::RateLimited => "slow down",
//!         _ => "upstream problem",
//!     }
//! }
//! ```

pub mod adapters;
pub mod analysis;
pub mod cache;
pub mod circuit_breaker;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod indicators;
pub mod provider_policy;
pub mod report;
pub mod retry;
pub mod scanner;
pub mod source;
pub mod throttling;
pub mod watchlist;

// Adapter implementations
pub use adapters::{YahooAdapter, YahooAuthManager};

// Analysis
pub use analysis::{
    analyze, classify_trend, distance_percent, gap_percent, Analysis, AnalysisConfig, SkipReason,
    Trend,
};

// Caching
pub use cache::{CacheMode, CacheStore, DEFAULT_CACHE_TTL};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState, Permit};

// Data source trait and types
pub use data_source::{
    BarsRequest, DataSource, Endpoint, HealthState, HealthStatus, QuoteBatch, QuoteRequest,
    SourceError, SourceErrorKind, SourceFuture,
};

// Domain models
pub use domain::{
    validate_currency_code, Bar, BarSeries, HistoryRange, Interval, Quote, Symbol, UtcDateTime,
    B3_SUFFIX,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};

// Indicators
pub use indicators::{rolling_sma, sma};

// Provider policies
pub use provider_policy::ProviderPolicy;

// Report
pub use report::{
    default_report_name, sort_analyses, to_csv, write_csv, write_csv_to, ReportRow, SortKey,
    SummaryMetrics, REPORT_COLUMNS,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Scanner
pub use scanner::{MarketScanner, NoProgress, ScanOptions, ScanProgress, ScanReport, TickerIssue};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::ThrottlingQueue;

// Watchlist
pub use watchlist::{Watchlist, DEFAULT_B3_TICKERS};
