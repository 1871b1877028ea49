use serde::{Deserialize, Serialize};

use crate::{Interval, Symbol, UtcDateTime, ValidationError};

/// Latest quote snapshot, including the pre-market print when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub pre_market_price: Option<f64>,
    pub currency: String,
    pub as_of: UtcDateTime,
}

impl Quote {
    /// Prices must be finite and non-negative; `currency` is normalized to
    /// uppercase.
    pub fn new(
        symbol: Symbol,
        price: f64,
        previous_close: Option<f64>,
        pre_market_price: Option<f64>,
        currency: impl AsRef<str>,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            symbol,
            price: checked_price("price", price)?,
            previous_close: previous_close
                .map(|value| checked_price("previous_close", value))
                .transpose()?,
            pre_market_price: pre_market_price
                .map(|value| checked_price("pre_market_price", value))
                .transpose()?,
            currency: validate_currency_code(currency.as_ref())?,
            as_of,
        })
    }
}

/// One session of a daily chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        let open = checked_price("open", open)?;
        let high = checked_price("high", high)?;
        let low = checked_price("low", low)?;
        let close = checked_price("close", close)?;
        if low > high {
            return Err(ValidationError::InvalidBarRange);
        }
        let session = low..=high;
        if !session.contains(&open) || !session.contains(&close) {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Bars for one symbol, ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: Symbol,
    pub interval: Interval,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: Symbol, interval: Interval, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|bar| bar.ts);
        Self {
            symbol,
            interval,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    /// Close of the second-to-last bar.
    pub fn previous_close(&self) -> Option<f64> {
        self.bars.iter().rev().nth(1).map(|bar| bar.close)
    }
}

/// `brl` becomes `BRL`; anything but three ASCII letters is rejected.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let code = input.trim();
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        })
    }
}

fn checked_price(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    match value {
        v if !v.is_finite() => Err(ValidationError::NonFiniteValue { field }),
        v if v < 0.0 => Err(ValidationError::NegativeValue { field }),
        v => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(seconds).expect("timestamp")
    }

    #[test]
    fn currency_is_uppercased() {
        assert_eq!(validate_currency_code(" brl ").expect("code"), "BRL");
        assert!(matches!(
            validate_currency_code("REAL"),
            Err(ValidationError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn close_outside_the_session_range_is_rejected() {
        assert_eq!(
            Bar::new(ts(0), 10.0, 12.0, 9.0, 12.5, Some(10)),
            Err(ValidationError::InvalidBarBounds)
        );
        assert_eq!(
            Bar::new(ts(0), 10.0, 9.0, 12.0, 10.0, None),
            Err(ValidationError::InvalidBarRange)
        );
        assert_eq!(
            Bar::new(ts(0), -1.0, 1.0, 0.0, 1.0, None),
            Err(ValidationError::NegativeValue { field: "open" })
        );
    }

    #[test]
    fn rejects_nan_pre_market_price() {
        let symbol = Symbol::parse("PETR4.SA").expect("symbol");
        let err = Quote::new(symbol, 37.0, Some(36.5), Some(f64::NAN), "BRL", ts(0))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { field: "pre_market_price" }));
    }

    #[test]
    fn series_sorts_bars_and_exposes_previous_close() {
        let symbol = Symbol::parse("VALE3.SA").expect("symbol");
        let bars = vec![
            Bar::new(ts(200), 11.0, 11.0, 11.0, 11.0, None).expect("bar"),
            Bar::new(ts(100), 10.0, 10.0, 10.0, 10.0, None).expect("bar"),
        ];
        let series = BarSeries::new(symbol, Interval::OneDay, bars);

        assert_eq!(series.closes(), vec![10.0, 11.0]);
        assert_eq!(series.last_close(), Some(11.0));
        assert_eq!(series.previous_close(), Some(10.0));
    }
}
