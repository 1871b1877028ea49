//! Shared fixtures for the behavior tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use pregao_core::{
    Bar, BarSeries, BarsRequest, DataSource, HealthState, HealthStatus, Interval, ProviderId,
    Quote, QuoteBatch, QuoteRequest, SourceError, SourceFuture, Symbol, UtcDateTime,
};

/// 2024-01-02 13:00 UTC, a B3 session open.
const FIRST_SESSION: i64 = 1_704_200_400;
const DAY: i64 = 86_400;

pub fn symbol(ticker: &str) -> Symbol {
    Symbol::b3(ticker).expect("valid ticker")
}

/// Daily bars whose OHLC all equal the given closes.
pub fn series(ticker: &str, closes: &[f64]) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(index, close)| {
            let ts = UtcDateTime::from_unix_timestamp(FIRST_SESSION + index as i64 * DAY)
                .expect("timestamp");
            Bar::new(ts, *close, *close, *close, *close, Some(1_000)).expect("bar")
        })
        .collect();
    BarSeries::new(symbol(ticker), Interval::OneDay, bars)
}

/// `len` closes rising linearly from `start` by `step` per session.
pub fn ramp(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|index| start + step * index as f64).collect()
}

pub fn quote(ticker: &str, price: f64, pre_market: Option<f64>) -> Quote {
    Quote::new(
        symbol(ticker),
        price,
        None,
        pre_market,
        "BRL",
        UtcDateTime::now(),
    )
    .expect("quote")
}

#[derive(Clone)]
struct Script {
    bars: Result<BarSeries, SourceError>,
    quote: Result<Option<Quote>, SourceError>,
}

/// In-memory data source with one scripted answer per ticker.
///
/// Unscripted tickers answer `not_found`. Every call sleeps for `delay` so
/// concurrent calls overlap, and the peak number of in-flight bars calls is
/// recorded.
pub struct StubSource {
    scripts: HashMap<Symbol, Script>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            delay: Duration::from_millis(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ticker(mut self, series: BarSeries, quote: Option<Quote>) -> Self {
        self.scripts.insert(
            series.symbol.clone(),
            Script {
                bars: Ok(series),
                quote: Ok(quote),
            },
        );
        self
    }

    pub fn failing_bars(mut self, ticker: &str, error: SourceError) -> Self {
        self.scripts.insert(
            symbol(ticker),
            Script {
                bars: Err(error),
                quote: Ok(None),
            },
        );
        self
    }

    pub fn failing_quote(mut self, series: BarSeries, error: SourceError) -> Self {
        self.scripts.insert(
            series.symbol.clone(),
            Script {
                bars: Ok(series),
                quote: Err(error),
            },
        );
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self, kind: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| call.starts_with(kind))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl DataSource for StubSource {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, Result<BarSeries, SourceError>> {
        Box::pin(async move {
            self.record(format!("bars:{}", req.symbol));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.scripts.get(&req.symbol) {
                Some(script) => script.bars.clone(),
                None => Err(SourceError::not_found(format!("no data for {}", req.symbol))),
            }
        })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Result<QuoteBatch, SourceError>> {
        Box::pin(async move {
            let mut quotes = Vec::new();
            for symbol in &req.symbols {
                self.record(format!("quote:{symbol}"));
                match self.scripts.get(symbol).map(|script| script.quote.clone()) {
                    Some(Ok(Some(quote))) => quotes.push(quote),
                    Some(Ok(None)) | None => {}
                    Some(Err(error)) => return Err(error),
                }
            }
            Ok(QuoteBatch { quotes })
        })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move { HealthStatus::new(HealthState::Healthy, true) })
    }
}
