use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Deserialize;
use time::{OffsetDateTime, Weekday};

use crate::cache::{CacheMode, CacheStore};
use crate::circuit_breaker::{CircuitBreaker, CircuitState, Permit};
use crate::data_source::{
    BarsRequest, DataSource, Endpoint, HealthState, HealthStatus, QuoteBatch, QuoteRequest,
    SourceError, SourceFuture,
};
use crate::http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::retry::RetryConfig;
use crate::throttling::ThrottlingQueue;
use crate::{
    Bar, BarSeries, HistoryRange, Interval, ProviderId, Quote, Symbol, UtcDateTime,
    ValidationError,
};

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_BASE: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const QUOTE_FIELDS: &str =
    "regularMarketPrice,regularMarketPreviousClose,preMarketPrice,currency,regularMarketTime";
const REFERER: &str = "https://finance.yahoo.com/";
const DEFAULT_CURRENCY: &str = "BRL";

// ============================================================================
// Yahoo Auth Manager - cookie/crumb session
// ============================================================================

#[derive(Debug, Default)]
struct AuthState {
    crumb: Option<String>,
    refreshed_at: Option<Instant>,
}

/// Yahoo session handling.
///
/// The unofficial API wants a session cookie from `fc.yahoo.com` (kept in the
/// transport's cookie jar) plus a crumb token passed as a query parameter.
/// Setting `YAHOO_COOKIE` sends that cookie explicitly instead.
#[derive(Debug)]
pub struct YahooAuthManager {
    state: Mutex<AuthState>,
    refreshing: AtomicBool,
    ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl YahooAuthManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            refreshing: AtomicBool::new(false),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cached_crumb(&self) -> Option<String> {
        let state = self.lock();
        let fresh = state
            .refreshed_at
            .is_some_and(|refreshed_at| refreshed_at.elapsed() < self.ttl);
        if fresh {
            state.crumb.clone()
        } else {
            None
        }
    }

    /// Current crumb, fetching a new session when the cached one expired.
    pub async fn get_crumb(&self, http_client: &Arc<dyn HttpClient>) -> Result<String, SourceError> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if let Some(crumb) = self.cached_crumb() {
                return Ok(crumb);
            }
        }

        let result = self.refresh(http_client).await;
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    async fn refresh(&self, http_client: &Arc<dyn HttpClient>) -> Result<String, SourceError> {
        tracing::debug!("refreshing yahoo session");

        let cookie_request =
            HttpRequest::get("https://fc.yahoo.com").with_header("referer", REFERER);
        http_client.execute(cookie_request).await.map_err(|error| {
            SourceError::unavailable(format!("failed to fetch yahoo cookie: {}", error.message()))
        })?;

        let crumb_endpoints = [
            "https://query1.finance.yahoo.com/v1/test/getcrumb",
            "https://query2.finance.yahoo.com/v1/test/getcrumb",
        ];

        for endpoint in crumb_endpoints {
            let request = HttpRequest::get(endpoint).with_header("referer", REFERER);

            let Ok(response) = http_client.execute(request).await else {
                continue;
            };
            if !response.is_success() {
                continue;
            }

            let body = response.body.trim();
            if body.to_ascii_lowercase().contains("too many requests") {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited while fetching crumb",
                ));
            }
            if body.contains("<html") || body.contains("<!DOCTYPE") {
                continue;
            }
            if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                let mut state = self.lock();
                state.crumb = Some(body.to_owned());
                state.refreshed_at = Some(Instant::now());
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }

    /// Forces a new session on the next call.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.crumb = None;
        state.refreshed_at = None;
    }

    fn env_cookie() -> Option<String> {
        std::env::var("YAHOO_COOKIE")
            .ok()
            .filter(|cookie| !cookie.trim().is_empty())
    }
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance adapter for daily chart history and quotes.
///
/// Every upstream call is paced by the throttling queue, served from the
/// response cache when fresh, gated by the circuit breaker and retried with
/// backoff. An adapter built on a mock transport serves deterministic
/// synthetic data instead.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth_manager: Arc<YahooAuthManager>,
    circuit_breaker: Arc<CircuitBreaker>,
    throttle: ThrottlingQueue,
    cache: CacheStore,
    cache_mode: CacheMode,
    retry: RetryConfig,
    timeout_ms: u64,
    adjust_prices: bool,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(NoopHttpClient))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            auth_manager: Arc::new(YahooAuthManager::default()),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            throttle: ThrottlingQueue::default(),
            cache: CacheStore::default(),
            cache_mode: CacheMode::default(),
            retry: RetryConfig::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            adjust_prices: true,
            use_real_api,
        }
    }

    pub fn with_cache(mut self, cache: CacheStore, mode: CacheMode) -> Self {
        self.cache = cache;
        self.cache_mode = mode;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottlingQueue) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Toggle split/dividend adjustment of OHLC values (on by default).
    pub fn with_adjusted_prices(mut self, adjust: bool) -> Self {
        self.adjust_prices = adjust;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn is_mock(&self) -> bool {
        !self.use_real_api
    }

    async fn fetch_body(&self, endpoint: Endpoint, url: String) -> Result<String, SourceError> {
        self.throttle.wait().await;

        let key = CacheStore::key_for(&url);
        if self.cache_mode.reads() {
            if let Some(body) = self.cache.get(&key).await {
                tracing::debug!(%endpoint, url = %key, "served from cache");
                return Ok(body);
            }
        }

        let Some(permit) = self.circuit_breaker.try_acquire() else {
            return Err(SourceError::unavailable(
                "yahoo circuit breaker is open; skipping upstream call",
            ));
        };

        let body = self.execute_with_retry(endpoint, &url, permit).await?;
        if self.cache_mode.writes() {
            self.cache.put(key, body.clone(), None).await;
        }
        Ok(body)
    }

    /// Every exit settles `permit`, so a failed session renewal counts
    /// against the breaker like any other upstream failure.
    async fn execute_with_retry(
        &self,
        endpoint: Endpoint,
        url: &str,
        permit: Permit<'_>,
    ) -> Result<String, SourceError> {
        let cookie = YahooAuthManager::env_cookie();
        let mut crumb = match self.auth_manager.get_crumb(&self.http_client).await {
            Ok(crumb) => crumb,
            Err(error) => return Err(session_failed(endpoint, permit, error)),
        };
        let mut session_refreshed = false;
        let mut attempt = 0;

        loop {
            let request = HttpRequest::get(with_crumb(url, &crumb))
                .with_header("referer", REFERER)
                .with_cookie(cookie.as_deref())
                .with_timeout_ms(self.timeout_ms);
            let outcome = self.http_client.execute(request).await;

            // An expired session shows up as 401/429; renew it once per call.
            if let Ok(response) = &outcome {
                if matches!(response.status, 401 | 429) && !session_refreshed {
                    tracing::debug!(%endpoint, status = response.status, "renewing yahoo session");
                    session_refreshed = true;
                    self.auth_manager.invalidate();
                    crumb = match self.auth_manager.get_crumb(&self.http_client).await {
                        Ok(crumb) => crumb,
                        Err(error) => return Err(session_failed(endpoint, permit, error)),
                    };
                    continue;
                }
            }

            if self.retry.should_retry(attempt, &outcome) {
                let delay = self.retry.delay(attempt);
                tracing::debug!(%endpoint, attempt, ?delay, "retrying yahoo request");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return settle(endpoint, outcome, permit);
        }
    }

    async fn fetch_real_bars(&self, req: &BarsRequest) -> Result<BarSeries, SourceError> {
        let url = format!(
            "{CHART_BASE}/{}?range={}&interval={}",
            urlencoding::encode(req.symbol.as_str()),
            req.range.as_str(),
            req.interval.as_str(),
        );
        let body = self.fetch_body(Endpoint::Bars, url).await?;
        parse_chart(&body, &req.symbol, req.interval, self.adjust_prices)
    }

    async fn fetch_real_quotes(&self, req: &QuoteRequest) -> Result<QuoteBatch, SourceError> {
        let symbols = req
            .symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{QUOTE_BASE}?symbols={}&fields={QUOTE_FIELDS}",
            urlencoding::encode(&symbols),
        );
        let body = self.fetch_body(Endpoint::Quote, url).await?;
        parse_quotes(&body)
    }

    fn fetch_fake_bars(&self, req: &BarsRequest) -> Result<BarSeries, SourceError> {
        let body = synthetic_chart_body(&req.symbol, req.range);
        parse_chart(&body, &req.symbol, req.interval, self.adjust_prices)
    }

    fn fetch_fake_quotes(&self, req: &QuoteRequest) -> Result<QuoteBatch, SourceError> {
        let body = synthetic_quote_body(&req.symbols);
        parse_quotes(&body)
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, Result<BarSeries, SourceError>> {
        Box::pin(async move {
            if req.interval != Interval::OneDay {
                return Err(SourceError::invalid_request(format!(
                    "yahoo bars are fetched at 1d, got {}",
                    req.interval
                )));
            }

            if self.use_real_api {
                self.fetch_real_bars(&req).await
            } else {
                self.fetch_fake_bars(&req)
            }
        })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Result<QuoteBatch, SourceError>> {
        Box::pin(async move {
            if req.symbols.is_empty() {
                return Err(SourceError::invalid_request(
                    "yahoo quote request requires at least one symbol",
                ));
            }

            if self.use_real_api {
                self.fetch_real_quotes(&req).await
            } else {
                self.fetch_fake_quotes(&req)
            }
        })
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move {
            let rate_available = self.throttle.waiting_len() == 0;
            match self.circuit_breaker.state() {
                CircuitState::Closed => HealthStatus::new(HealthState::Healthy, rate_available),
                CircuitState::HalfOpen => HealthStatus::new(HealthState::Degraded, rate_available),
                CircuitState::Open => HealthStatus::new(HealthState::Unhealthy, false),
            }
        })
    }
}

fn session_failed(endpoint: Endpoint, permit: Permit<'_>, error: SourceError) -> SourceError {
    permit.fail();
    tracing::warn!(%endpoint, error = %error, "yahoo session renewal failed");
    error
}

fn settle(
    endpoint: Endpoint,
    outcome: Result<HttpResponse, HttpError>,
    permit: Permit<'_>,
) -> Result<String, SourceError> {
    let response = match outcome {
        Ok(response) => response,
        Err(error) => {
            permit.fail();
            tracing::warn!(%endpoint, error = error.message(), "yahoo transport error");
            let message = format!("yahoo transport error: {}", error.message());
            return Err(if error.retryable() {
                SourceError::unavailable(message)
            } else {
                SourceError::internal(message)
            });
        }
    };

    match response.status {
        200..=299 => {
            permit.succeed();
            Ok(response.body)
        }
        // Unknown or delisted ticker; the upstream itself is fine.
        404 => {
            permit.succeed();
            Err(SourceError::not_found(format!(
                "yahoo has no {endpoint} data (status 404)"
            )))
        }
        429 => {
            permit.fail();
            tracing::warn!(%endpoint, "yahoo rate limit reached");
            Err(SourceError::rate_limited("yahoo returned status 429"))
        }
        status => {
            permit.fail();
            tracing::warn!(%endpoint, status, "yahoo upstream error");
            Err(SourceError::unavailable(format!(
                "yahoo returned status {status}"
            )))
        }
    }
}

fn with_crumb(url: &str, crumb: &str) -> String {
    format!("{url}&crumb={}", urlencoding::encode(crumb))
}

// ============================================================================
// Payload parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct YahooApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn into_source_error(self) -> SourceError {
        let message = match self.description {
            Some(description) => format!("yahoo API error {}: {description}", self.code),
            None => format!("yahoo API error {}", self.code),
        };
        if self.code.eq_ignore_ascii_case("not found") {
            SourceError::not_found(message)
        } else {
            SourceError::unavailable(message)
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
    #[serde(default)]
    adjclose: Vec<YahooAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    symbol: String,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_previous_close: Option<f64>,
    #[serde(default)]
    pre_market_price: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    regular_market_time: Option<i64>,
}

/// Chart payload to bars. Rows with a missing or non-finite OHLC field are
/// dropped. A row whose high/low do not cover its open and close keeps its
/// close: the range is widened to fit. An empty result is an empty series.
fn parse_chart(
    body: &str,
    symbol: &Symbol,
    interval: Interval,
    adjust: bool,
) -> Result<BarSeries, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(error.into_source_error());
    }

    let Some(result) = response.chart.result.and_then(|results| results.into_iter().next())
    else {
        return Err(SourceError::not_found(format!(
            "no chart data for {symbol}"
        )));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let YahooChartIndicators { quote, adjclose } = result.indicators;
    let quote = quote.into_iter().next().unwrap_or_default();
    let adjclose = adjclose
        .into_iter()
        .next()
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut dropped = 0_usize;
    for (index, &seconds) in timestamps.iter().enumerate() {
        let ohlc = (
            field_at(&quote.open, index),
            field_at(&quote.high, index),
            field_at(&quote.low, index),
            field_at(&quote.close, index),
        );
        let (Some(open), Some(high), Some(low), Some(close)) = ohlc else {
            dropped += 1;
            continue;
        };

        let factor = if adjust {
            adjustment_factor(field_at(&adjclose, index), close)
        } else {
            1.0
        };
        let volume = quote
            .volume
            .get(index)
            .copied()
            .flatten()
            .and_then(|value| u64::try_from(value).ok());

        let (open, close) = (open * factor, close * factor);
        let high = (high * factor).max(open).max(close);
        let low = (low * factor).min(open).min(close);
        let bar = UtcDateTime::from_unix_timestamp(seconds)
            .and_then(|ts| Bar::new(ts, open, high, low, close, volume));
        match bar {
            Ok(bar) => bars.push(bar),
            Err(_) => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(%symbol, dropped, "dropped incomplete chart rows");
    }

    Ok(BarSeries::new(symbol.clone(), interval, bars))
}

fn field_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values
        .get(index)
        .copied()
        .flatten()
        .filter(|value| value.is_finite())
}

fn adjustment_factor(adjclose: Option<f64>, close: f64) -> f64 {
    match adjclose {
        Some(adjusted) if close > 0.0 && adjusted > 0.0 => adjusted / close,
        _ => 1.0,
    }
}

/// Quote payload to a batch. Entries without a regular market price are
/// omitted; a zero pre-market price means none was printed.
fn parse_quotes(body: &str) -> Result<QuoteBatch, SourceError> {
    let response: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo quote: {e}")))?;

    if let Some(error) = response.quote_response.error {
        return Err(error.into_source_error());
    }

    let quotes = response
        .quote_response
        .result
        .into_iter()
        .filter_map(|data| normalize_quote(data).ok())
        .collect();

    Ok(QuoteBatch { quotes })
}

fn normalize_quote(data: YahooQuoteData) -> Result<Quote, ValidationError> {
    let symbol = Symbol::parse(&data.symbol)?;
    let price = data
        .regular_market_price
        .ok_or(ValidationError::NonFiniteValue { field: "price" })?;
    let as_of = match data.regular_market_time {
        Some(seconds) => UtcDateTime::from_unix_timestamp(seconds)?,
        None => UtcDateTime::now(),
    };

    Quote::new(
        symbol,
        price,
        data.regular_market_previous_close,
        data.pre_market_price.filter(|price| *price > 0.0),
        data.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
        as_of,
    )
}

// ============================================================================
// Synthetic payloads for offline mode
// ============================================================================

const SHORT_HISTORY_SESSIONS: usize = 120;

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol
        .as_str()
        .bytes()
        .fold(0_u64, |acc, byte| acc.wrapping_mul(33).wrapping_add(u64::from(byte)))
}

fn seed_mix(symbol: &Symbol) -> u64 {
    symbol_seed(symbol) >> 8
}

/// Recently listed names get less than a year of history.
fn synthetic_session_count(symbol: &Symbol, range: HistoryRange) -> usize {
    if seed_mix(symbol) % 16 == 5 {
        SHORT_HISTORY_SESSIONS.min(range.trading_days())
    } else {
        range.trading_days()
    }
}

/// Session timestamps (13:00 UTC, B3 open) for the last `count` weekdays.
fn synthetic_sessions(count: usize) -> Vec<i64> {
    let mut sessions = Vec::with_capacity(count);
    let mut date = Some(OffsetDateTime::now_utc().date());
    while sessions.len() < count {
        let Some(day) = date else {
            break;
        };
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            sessions.push(day.midnight().assume_utc().unix_timestamp() + 13 * 3600);
        }
        date = day.previous_day();
    }
    sessions.reverse();
    sessions
}

#[derive(Debug, Clone, Copy)]
struct SyntheticBar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn synthetic_bars(symbol: &Symbol, count: usize) -> Vec<SyntheticBar> {
    let seed = symbol_seed(symbol);
    let mix = seed_mix(symbol);
    let mut rng = fastrand::Rng::with_seed(seed);

    // Per-symbol drift between -0.15% and +0.15% a day.
    let drift = ((mix % 7) as f64 - 3.0) / 2000.0;
    let mut close = 8.0 + (mix % 600) as f64 / 10.0;

    (0..count)
        .map(|_| {
            let open = close;
            close = (open * (1.0 + drift + (rng.f64() - 0.5) * 0.03)).max(0.5);
            let high = open.max(close) * (1.0 + rng.f64() * 0.01);
            let low = open.min(close) * (1.0 - rng.f64() * 0.01);
            SyntheticBar {
                open: cents(open),
                high: cents(high),
                low: cents(low),
                close: cents(close),
                volume: 1_000_000 + rng.u64(0..4_000_000),
            }
        })
        .collect()
}

fn synthetic_chart_body(symbol: &Symbol, range: HistoryRange) -> String {
    let count = synthetic_session_count(symbol, range);
    let timestamps = synthetic_sessions(count);
    let bars = synthetic_bars(symbol, timestamps.len());

    serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol.as_str(), "currency": DEFAULT_CURRENCY },
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": bars.iter().map(|bar| bar.open).collect::<Vec<_>>(),
                        "high": bars.iter().map(|bar| bar.high).collect::<Vec<_>>(),
                        "low": bars.iter().map(|bar| bar.low).collect::<Vec<_>>(),
                        "close": bars.iter().map(|bar| bar.close).collect::<Vec<_>>(),
                        "volume": bars.iter().map(|bar| bar.volume).collect::<Vec<_>>(),
                    }],
                    "adjclose": [{
                        "adjclose": bars.iter().map(|bar| bar.close).collect::<Vec<_>>(),
                    }],
                },
            }],
            "error": null,
        }
    })
    .to_string()
}

fn synthetic_quote_body(symbols: &[Symbol]) -> String {
    let now = UtcDateTime::now().unix_timestamp();
    let result = symbols
        .iter()
        .map(|symbol| {
            let count = synthetic_session_count(symbol, HistoryRange::OneYear);
            let bars = synthetic_bars(symbol, count);
            let last = bars.last().map_or(0.0, |bar| bar.close);
            let previous = bars
                .len()
                .checked_sub(2)
                .and_then(|index| bars.get(index))
                .map_or(last, |bar| bar.close);

            // B3 names rarely trade pre-market on Yahoo; a third print nothing.
            let mix = seed_mix(symbol);
            let pre_market = if mix % 3 == 0 {
                None
            } else {
                let move_pct = ((mix >> 4) % 61) as f64 - 30.0;
                Some(cents(last * (1.0 + move_pct / 1000.0)))
            };

            serde_json::json!({
                "symbol": symbol.as_str(),
                "regularMarketPrice": last,
                "regularMarketPreviousClose": previous,
                "preMarketPrice": pre_market,
                "currency": DEFAULT_CURRENCY,
                "regularMarketTime": now,
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({ "quoteResponse": { "result": result, "error": null } }).to_string()
}
