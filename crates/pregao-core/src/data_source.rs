//! Data source trait and request/response types.
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | Bars | [`BarsRequest`] | [`BarSeries`] | Daily OHLCV history |
//! | Quote | [`QuoteRequest`] | [`QuoteBatch`] | Latest price and pre-market print |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BarSeries, HistoryRange, Interval, ProviderId, Quote, Symbol, ValidationError};

/// Boxed future returned by [`DataSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Bars,
    Quote,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Bars => "bars",
            Self::Quote => "quote",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    /// Circuit half-open: one trial call is testing the upstream.
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    /// `false` when calls are currently queued behind the rate limiter.
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, 5xx, or circuit open.
    Unavailable,
    RateLimited,
    InvalidRequest,
    /// Unknown or delisted ticker.
    NotFound,
    /// Payload the parser could not make sense of.
    Internal,
}

impl SourceErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unavailable => "source.unavailable",
            Self::RateLimited => "source.rate_limited",
            Self::InvalidRequest => "source.invalid_request",
            Self::NotFound => "source.not_found",
            Self::Internal => "source.internal",
        }
    }
}

/// Why one bars or quote call failed. Carried per ticker; never aborts a scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({})", kind.code())]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The same call may succeed later.
    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::Unavailable | SourceErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::internal(error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub symbol: Symbol,
    pub interval: Interval,
    pub range: HistoryRange,
}

impl BarsRequest {
    pub fn new(symbol: Symbol, interval: Interval, range: HistoryRange) -> Self {
        Self {
            symbol,
            interval,
            range,
        }
    }

    /// One year of daily bars, enough for both moving averages.
    pub fn daily(symbol: Symbol) -> Self {
        Self::new(symbol, Interval::OneDay, HistoryRange::OneYear)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub symbols: Vec<Symbol>,
}

impl QuoteRequest {
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, SourceError> {
        if symbols.is_empty() {
            return Err(SourceError::invalid_request(
                "quote request must include at least one symbol",
            ));
        }
        Ok(Self { symbols })
    }

    pub fn single(symbol: Symbol) -> Self {
        Self {
            symbols: vec![symbol],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub quotes: Vec<Quote>,
}

impl QuoteBatch {
    pub fn find(&self, symbol: &Symbol) -> Option<&Quote> {
        self.quotes.iter().find(|quote| &quote.symbol == symbol)
    }
}

/// Market data provider.
///
/// A scan shares one source across all of its ticker jobs, hence
/// `Send + Sync`.
pub trait DataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Bars oldest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown symbols, `Unavailable` for transport or upstream
    /// failures, `Internal` for unparseable payloads.
    fn bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, Result<BarSeries, SourceError>>;

    /// Symbols the provider does not know are left out of the batch rather
    /// than failing it.
    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Result<QuoteBatch, SourceError>>;

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_quote_request_is_rejected() {
        let error = QuoteRequest::new(Vec::new()).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert!(!error.retryable());
    }

    #[test]
    fn daily_request_covers_one_year() {
        let request = BarsRequest::daily(Symbol::b3("PETR4").expect("symbol"));
        assert_eq!(request.interval, Interval::OneDay);
        assert_eq!(request.range, HistoryRange::OneYear);
    }

    #[test]
    fn only_upstream_trouble_is_retryable() {
        assert!(SourceError::unavailable("503").retryable());
        assert!(SourceError::rate_limited("429").retryable());
        assert!(!SourceError::not_found("404").retryable());
        assert!(!SourceError::internal("bad json").retryable());
    }

    #[test]
    fn display_carries_code() {
        let error = SourceError::not_found("no data for XPTO3.SA");
        assert_eq!(error.to_string(), "no data for XPTO3.SA (source.not_found)");
        assert_eq!(Endpoint::Quote.to_string(), "quote");
    }
}
