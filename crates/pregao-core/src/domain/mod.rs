//! # Domain Models
//!
//! Canonical market data types for pregao.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Quote`] | Latest price with previous close and pre-market print |
//! | [`Bar`] | OHLCV bar with timestamp |
//! | [`BarSeries`] | Ordered bars for a symbol/interval |
//! | [`Symbol`] | Validated ticker (B3 tickers carry the `.SA` suffix) |
//! | [`Interval`] | Bar interval (1m, 5m, 15m, 1h, 1d) |
//! | [`HistoryRange`] | Chart lookback (1mo .. 2y) |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All constructors validate their invariants, so a `Bar` with `high < low`
//! or a `Quote` with a NaN price cannot be built.

mod interval;
mod models;
mod symbol;
mod timestamp;

pub use interval::{HistoryRange, Interval};
pub use models::{validate_currency_code, Bar, BarSeries, Quote};
pub use symbol::{Symbol, B3_SUFFIX};
pub use timestamp::UtcDateTime;
