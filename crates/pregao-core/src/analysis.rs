//! Trend classification and pre-market gap for a single ticker.
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | SMA(w) | mean of the last `w` closes |
//! | Trend | price against SMA50 and SMA200, see [`classify_trend`] |
//! | Gap % | `(pre_market - previous_close) / previous_close * 100` |
//! | Dist. SMA50 % | `(price / sma50 - 1) * 100` |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::sma;
use crate::{BarSeries, Quote, Symbol, ValidationError};

const FALLBACK_CURRENCY: &str = "BRL";

/// Position of the price relative to the fast and slow averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    StrongUp,
    Up,
    Down,
    StrongDown,
}

impl Trend {
    /// Strongest first.
    pub const ALL: [Self; 4] = [Self::StrongUp, Self::Up, Self::Down, Self::StrongDown];

    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongUp => "Strong Up",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::StrongDown => "Strong Down",
        }
    }

    /// Ordering key, higher is more bullish.
    pub const fn strength(self) -> u8 {
        match self {
            Self::StrongUp => 3,
            Self::Up => 2,
            Self::Down => 1,
            Self::StrongDown => 0,
        }
    }

    pub const fn is_bullish(self) -> bool {
        matches!(self, Self::StrongUp | Self::Up)
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies `price` against both averages.
///
/// Above both is `StrongUp`, above exactly one is `Up`, below both is
/// `StrongDown`. Anything else (price touching an average without being above
/// the other) is `Down`.
pub fn classify_trend(price: f64, sma_fast: f64, sma_slow: f64) -> Trend {
    let above_fast = price > sma_fast;
    let above_slow = price > sma_slow;

    if above_fast && above_slow {
        Trend::StrongUp
    } else if above_fast ^ above_slow {
        Trend::Up
    } else if price < sma_fast && price < sma_slow {
        Trend::StrongDown
    } else {
        Trend::Down
    }
}

/// Percentage move from the previous close to the pre-market print.
///
/// `None` when the previous close is not a positive finite number or the
/// pre-market price is not finite.
pub fn gap_percent(pre_market: f64, previous_close: f64) -> Option<f64> {
    if !previous_close.is_finite() || previous_close <= 0.0 || !pre_market.is_finite() {
        return None;
    }
    Some((pre_market - previous_close) / previous_close * 100.0)
}

/// Percentage distance of `price` from a moving average.
pub fn distance_percent(price: f64, average: f64) -> Option<f64> {
    if !average.is_finite() || average <= 0.0 || !price.is_finite() {
        return None;
    }
    Some((price / average - 1.0) * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub fast_window: usize,
    pub slow_window: usize,
    /// Tickers with fewer bars are skipped.
    pub min_history: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fast_window: 50,
            slow_window: 200,
            min_history: 200,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fast_window == 0 || self.slow_window == 0 {
            return Err(ValidationError::ZeroWindow);
        }
        Ok(())
    }

    /// Bars needed before a ticker can be analyzed: both windows must fill
    /// and a previous close must exist.
    pub fn required_history(&self) -> usize {
        self.min_history
            .max(self.fast_window)
            .max(self.slow_window)
            .max(2)
    }
}

/// Why a ticker produced no analysis row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("insufficient history: {available} bars, need {required}")]
    InsufficientHistory { available: usize, required: usize },
    #[error("moving average is not positive")]
    InvalidAverage,
    #[error("{message}")]
    Source { code: &'static str, message: String },
}

impl SkipReason {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientHistory { .. } => "analysis.insufficient_history",
            Self::InvalidAverage => "analysis.invalid_average",
            Self::Source { code, .. } => *code,
        }
    }
}

impl From<crate::SourceError> for SkipReason {
    fn from(error: crate::SourceError) -> Self {
        Self::Source {
            code: error.code(),
            message: error.message().to_owned(),
        }
    }
}

/// One analyzed ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: Symbol,
    pub price: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub trend: Trend,
    pub previous_close: f64,
    pub pre_market_price: Option<f64>,
    pub gap_pct: Option<f64>,
    pub distance_fast_pct: f64,
    pub distance_slow_pct: f64,
    pub currency: String,
}

impl Analysis {
    pub fn is_above_slow(&self) -> bool {
        self.price > self.sma_slow
    }
}

/// Builds the analysis row for one ticker from its daily history and, when
/// available, its latest quote.
///
/// Price is the last close. The gap compares the quote's pre-market print to
/// the second-to-last close; without a pre-market print the gap is `None`.
pub fn analyze(
    series: &BarSeries,
    quote: Option<&Quote>,
    config: &AnalysisConfig,
) -> Result<Analysis, SkipReason> {
    let required = config.required_history();
    if series.len() < required {
        return Err(SkipReason::InsufficientHistory {
            available: series.len(),
            required,
        });
    }

    let closes = series.closes();
    let insufficient = || SkipReason::InsufficientHistory {
        available: closes.len(),
        required,
    };
    let price = series.last_close().ok_or_else(insufficient)?;
    let previous_close = series.previous_close().ok_or_else(insufficient)?;
    let sma_fast = sma(&closes, config.fast_window).ok_or_else(insufficient)?;
    let sma_slow = sma(&closes, config.slow_window).ok_or_else(insufficient)?;

    let distance_fast_pct = distance_percent(price, sma_fast).ok_or(SkipReason::InvalidAverage)?;
    let distance_slow_pct = distance_percent(price, sma_slow).ok_or(SkipReason::InvalidAverage)?;

    let pre_market_price = quote.and_then(|quote| quote.pre_market_price);
    let gap_pct = pre_market_price.and_then(|pre_market| gap_percent(pre_market, previous_close));

    Ok(Analysis {
        symbol: series.symbol.clone(),
        price,
        sma_fast,
        sma_slow,
        trend: classify_trend(price, sma_fast, sma_slow),
        previous_close,
        pre_market_price,
        gap_pct,
        distance_fast_pct,
        distance_slow_pct,
        currency: quote
            .map(|quote| quote.currency.clone())
            .unwrap_or_else(|| FALLBACK_CURRENCY.to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_table() {
        assert_eq!(classify_trend(12.0, 10.0, 11.0), Trend::StrongUp);
        assert_eq!(classify_trend(10.5, 10.0, 11.0), Trend::Up);
        assert_eq!(classify_trend(10.5, 11.0, 10.0), Trend::Up);
        assert_eq!(classify_trend(9.0, 10.0, 11.0), Trend::StrongDown);
    }

    #[test]
    fn touching_an_average_is_down() {
        assert_eq!(classify_trend(10.0, 10.0, 10.0), Trend::Down);
        assert_eq!(classify_trend(10.0, 10.0, 11.0), Trend::Down);
        assert_eq!(classify_trend(11.0, 10.0, 11.0), Trend::Up);
    }

    #[test]
    fn gap_requires_positive_previous_close() {
        let gap = gap_percent(101.0, 100.0).expect("gap");
        assert!((gap - 1.0).abs() < 1e-12);
        assert_eq!(gap_percent(10.0, 0.0), None);
        assert_eq!(gap_percent(10.0, f64::NAN), None);
        assert_eq!(gap_percent(f64::INFINITY, 10.0), None);
    }

    #[test]
    fn distance_is_relative_to_average() {
        let distance = distance_percent(110.0, 100.0).expect("distance");
        assert!((distance - 10.0).abs() < 1e-9);
        assert_eq!(distance_percent(1.0, 0.0), None);
    }

    #[test]
    fn required_history_covers_slow_window() {
        let config = AnalysisConfig {
            fast_window: 5,
            slow_window: 20,
            min_history: 10,
        };
        assert_eq!(config.required_history(), 20);
        assert_eq!(AnalysisConfig::default().required_history(), 200);
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = AnalysisConfig {
            fast_window: 0,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ZeroWindow));
    }

    #[test]
    fn labels_are_stable() {
        let labels = Trend::ALL.map(Trend::label);
        assert_eq!(labels, ["Strong Up", "Up", "Down", "Strong Down"]);
    }
}
