//! Data source contract for the Yahoo adapter, offline and against a
//! scripted transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pregao_core::{
    BarsRequest, CacheMode, CacheStore, CircuitBreaker, CircuitBreakerConfig, CircuitState,
    DataSource, HealthState, HistoryRange, HttpClient, HttpFuture, HttpRequest, HttpResponse,
    Interval, ProviderId, ProviderPolicy, QuoteRequest, RetryConfig, SourceErrorKind, Symbol,
    ThrottlingQueue, YahooAdapter,
};

fn symbol(ticker: &str) -> Symbol {
    Symbol::b3(ticker).expect("valid ticker")
}

// ============================================================================
// Offline adapter
// ============================================================================

#[tokio::test]
async fn offline_bars_are_a_valid_daily_series() {
    let adapter = YahooAdapter::default();
    assert!(adapter.is_mock());
    assert_eq!(adapter.id(), ProviderId::Yahoo);

    let series = adapter
        .bars(BarsRequest::daily(symbol("PETR4")))
        .await
        .expect("bars");

    assert_eq!(series.symbol.as_str(), "PETR4.SA");
    assert_eq!(series.interval, Interval::OneDay);
    assert!(series.len() >= 200, "one year covers both averages");
    for pair in series.bars.windows(2) {
        assert!(pair[0].ts < pair[1].ts, "bars must be oldest to newest");
    }
    for bar in &series.bars {
        assert!(bar.low <= bar.open && bar.open <= bar.high);
        assert!(bar.low <= bar.close && bar.close <= bar.high);
    }
}

#[tokio::test]
async fn offline_data_is_deterministic() {
    let first = YahooAdapter::default()
        .bars(BarsRequest::daily(symbol("VALE3")))
        .await
        .expect("bars");
    let second = YahooAdapter::default()
        .bars(BarsRequest::daily(symbol("VALE3")))
        .await
        .expect("bars");

    assert_eq!(first.closes(), second.closes());
}

#[tokio::test]
async fn offline_short_history_for_recent_listing() {
    let series = YahooAdapter::default()
        .bars(BarsRequest::daily(symbol("TOTS3")))
        .await
        .expect("bars");

    assert!(series.len() < 200);
}

#[tokio::test]
async fn offline_pre_market_prints_are_per_ticker() {
    let batch = YahooAdapter::default()
        .quote(QuoteRequest::new(vec![symbol("PETR4"), symbol("ITUB4")]).expect("request"))
        .await
        .expect("quotes");

    let petr = batch.find(&symbol("PETR4")).expect("PETR4 quote");
    let itub = batch.find(&symbol("ITUB4")).expect("ITUB4 quote");
    assert_eq!(petr.pre_market_price, None);
    assert!(itub.pre_market_price.is_some_and(|price| price > 0.0));
    assert_eq!(itub.currency, "BRL");
}

#[tokio::test]
async fn rejects_intraday_interval() {
    let error = YahooAdapter::default()
        .bars(BarsRequest::new(
            symbol("PETR4"),
            Interval::OneHour,
            HistoryRange::OneYear,
        ))
        .await
        .expect_err("intraday bars are not served");

    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert!(!error.retryable());
}

#[test]
fn empty_quote_request_is_rejected_up_front() {
    let error = QuoteRequest::new(Vec::new()).expect_err("no symbols");
    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
}

#[tokio::test]
async fn usable_behind_a_trait_object() {
    let source: Arc<dyn DataSource> = Arc::new(YahooAdapter::default());
    let health = source.health().await;

    assert_eq!(source.id(), ProviderId::Yahoo);
    assert_eq!(health.state, HealthState::Healthy);
}

// ============================================================================
// Scripted transport
// ============================================================================

const CHART_BODY: &str = r#"{
  "chart": {
    "result": [{
      "timestamp": [1704200400, 1704286800, 1704373200],
      "indicators": {
        "quote": [{
          "open":   [30.0, null, 32.0],
          "high":   [31.0, 31.5, 33.0],
          "low":    [29.0, 30.5, 31.0],
          "close":  [30.0, 31.0, 32.0],
          "volume": [1000, 1100, 1200]
        }],
        "adjclose": [{ "adjclose": [15.0, 15.5, 16.0] }]
      }
    }],
    "error": null
  }
}"#;

const QUOTE_BODY: &str = r#"{
  "quoteResponse": {
    "result": [
      { "symbol": "PETR4.SA", "regularMarketPrice": 32.0, "regularMarketPreviousClose": 31.0,
        "preMarketPrice": 32.5, "currency": "BRL", "regularMarketTime": 1704373200 },
      { "symbol": "VALE3.SA", "regularMarketPrice": 60.0, "preMarketPrice": 0.0 }
    ],
    "error": null
  }
}"#;

/// Answers the session handshake and serves chart and quote bodies,
/// recording every URL it sees. Chart and crumb answers can be swapped
/// between calls.
struct ScriptedHttp {
    chart: Mutex<HttpResponse>,
    crumb: Mutex<HttpResponse>,
    quote: HttpResponse,
    seen: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    fn new(chart: HttpResponse) -> Arc<Self> {
        Arc::new(Self {
            chart: Mutex::new(chart),
            crumb: Mutex::new(HttpResponse::new(200, "crumb42")),
            quote: HttpResponse::ok_json(QUOTE_BODY),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn answer_chart(&self, response: HttpResponse) {
        *self.chart.lock().expect("lock") = response;
    }

    fn answer_crumb(&self, response: HttpResponse) {
        *self.crumb.lock().expect("lock") = response;
    }

    fn urls_containing(&self, fragment: &str) -> Vec<String> {
        self.seen
            .lock()
            .expect("lock")
            .iter()
            .filter(|url| url.contains(fragment))
            .cloned()
            .collect()
    }
}

impl HttpClient for ScriptedHttp {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            self.seen.lock().expect("lock").push(request.url.clone());
            let response = if request.url.contains("fc.yahoo.com") {
                HttpResponse::new(200, "")
            } else if request.url.contains("getcrumb") {
                self.crumb.lock().expect("lock").clone()
            } else if request.url.contains("/v8/finance/chart/") {
                self.chart.lock().expect("lock").clone()
            } else {
                self.quote.clone()
            };
            Ok(response)
        })
    }
}

fn scripted_adapter(http: &Arc<ScriptedHttp>) -> YahooAdapter {
    YahooAdapter::with_http_client(Arc::clone(http) as Arc<dyn HttpClient>)
        .with_cache(CacheStore::disabled(), CacheMode::Bypass)
        .with_retry(RetryConfig::no_retry())
}

#[tokio::test]
async fn chart_request_asks_for_one_year_of_daily_bars() {
    let http = ScriptedHttp::new(HttpResponse::ok_json(CHART_BODY));
    let adapter = scripted_adapter(&http);
    assert!(!adapter.is_mock());

    adapter
        .bars(BarsRequest::daily(symbol("PETR4")))
        .await
        .expect("bars");

    let charts = http.urls_containing("/v8/finance/chart/");
    assert_eq!(charts.len(), 1);
    assert!(charts[0].contains("/PETR4.SA?range=1y&interval=1d"));
    assert!(charts[0].ends_with("&crumb=crumb42"));
}

#[tokio::test]
async fn chart_rows_are_adjusted_and_incomplete_rows_dropped() {
    let http = ScriptedHttp::new(HttpResponse::ok_json(CHART_BODY));

    let series = scripted_adapter(&http)
        .bars(BarsRequest::daily(symbol("PETR4")))
        .await
        .expect("bars");

    // Second row has no open.
    assert_eq!(series.len(), 2);
    assert_eq!(series.closes(), vec![15.0, 16.0]);
    assert!((series.bars[0].high - 15.5).abs() < 1e-9);
}

#[tokio::test]
async fn raw_prices_when_adjustment_is_off() {
    let http = ScriptedHttp::new(HttpResponse::ok_json(CHART_BODY));

    let series = scripted_adapter(&http)
        .with_adjusted_prices(false)
        .bars(BarsRequest::daily(symbol("PETR4")))
        .await
        .expect("bars");

    assert_eq!(series.closes(), vec![30.0, 32.0]);
}

#[tokio::test]
async fn quote_request_lists_symbols_and_pre_market_field() {
    let http = ScriptedHttp::new(HttpResponse::ok_json(CHART_BODY));

    let batch = scripted_adapter(&http)
        .quote(QuoteRequest::new(vec![symbol("PETR4"), symbol("VALE3")]).expect("request"))
        .await
        .expect("quotes");

    let quotes = http.urls_containing("/v7/finance/quote");
    assert_eq!(quotes.len(), 1);
    assert!(quotes[0].contains("symbols=PETR4.SA%2CVALE3.SA"));
    assert!(quotes[0].contains("preMarketPrice"));

    let petr = batch.find(&symbol("PETR4")).expect("PETR4");
    assert_eq!(petr.pre_market_price, Some(32.5));
    assert_eq!(petr.previous_close, Some(31.0));

    // A zero pre-market print means none happened.
    let vale = batch.find(&symbol("VALE3")).expect("VALE3");
    assert_eq!(vale.pre_market_price, None);
    assert_eq!(vale.currency, "BRL");
}

#[tokio::test]
async fn unknown_ticker_is_not_found_and_keeps_breaker_closed() {
    let http = ScriptedHttp::new(HttpResponse::new(404, "{}"));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 1,
        open_timeout: Duration::from_secs(60),
    }));
    let adapter = scripted_adapter(&http).with_circuit_breaker(breaker);

    let error = adapter
        .bars(BarsRequest::daily(symbol("XXXX3")))
        .await
        .expect_err("404");

    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert!(!error.retryable());
    assert_eq!(adapter.health().await.state, HealthState::Healthy);
}

#[tokio::test]
async fn upstream_failures_open_the_breaker() {
    let http = ScriptedHttp::new(HttpResponse::new(503, "unavailable"));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 1,
        open_timeout: Duration::from_secs(60),
    }));
    let adapter = scripted_adapter(&http).with_circuit_breaker(breaker);

    let first = adapter
        .bars(BarsRequest::daily(symbol("PETR4")))
        .await
        .expect_err("503");
    assert_eq!(first.kind(), SourceErrorKind::Unavailable);
    assert!(first.message().contains("503"));

    let second = adapter
        .bars(BarsRequest::daily(symbol("VALE3")))
        .await
        .expect_err("breaker open");
    assert!(second.message().contains("circuit breaker"));
    assert_eq!(
        http.urls_containing("/v8/finance/chart/").len(),
        1,
        "open breaker must not reach upstream"
    );
    assert_eq!(adapter.health().await.state, HealthState::Unhealthy);
}

#[tokio::test]
async fn failed_session_renewal_reopens_the_breaker_and_recovery_closes_it() {
    let http = ScriptedHttp::new(HttpResponse::new(503, "unavailable"));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 1,
        open_timeout: Duration::from_millis(20),
    }));
    let adapter = scripted_adapter(&http).with_circuit_breaker(Arc::clone(&breaker));
    let request = || BarsRequest::daily(symbol("PETR4"));

    // Outage.
    adapter.bars(request()).await.expect_err("503");
    assert_eq!(breaker.state(), CircuitState::Open);

    // The trial call hits 429, and renewing the session fails too.
    tokio::time::sleep(Duration::from_millis(40)).await;
    http.answer_chart(HttpResponse::new(429, ""));
    http.answer_crumb(HttpResponse::new(503, ""));
    let error = adapter.bars(request()).await.expect_err("crumb unavailable");
    assert!(error.message().contains("crumb"), "{}", error.message());
    assert_eq!(breaker.state(), CircuitState::Open);

    // Yahoo is back: the next trial call goes through and closes the circuit.
    tokio::time::sleep(Duration::from_millis(40)).await;
    http.answer_chart(HttpResponse::ok_json(CHART_BODY));
    http.answer_crumb(HttpResponse::new(200, "crumb42"));
    let series = adapter.bars(request()).await.expect("recovered");

    assert_eq!(series.len(), 2);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(adapter.health().await.state, HealthState::Healthy);
}

#[tokio::test]
async fn crumb_failures_count_while_the_circuit_is_closed() {
    let http = ScriptedHttp::new(HttpResponse::ok_json(CHART_BODY));
    http.answer_crumb(HttpResponse::new(503, ""));
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 2,
        open_timeout: Duration::from_secs(60),
    }));
    let adapter = scripted_adapter(&http).with_circuit_breaker(Arc::clone(&breaker));

    for ticker in ["PETR4", "VALE3"] {
        let error = adapter
            .bars(BarsRequest::daily(symbol(ticker)))
            .await
            .expect_err("no session");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }

    assert_eq!(breaker.state(), CircuitState::Open);
    assert!(http.urls_containing("/v8/finance/chart/").is_empty());
}

#[tokio::test]
async fn chart_error_payload_maps_to_not_found() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    let http = ScriptedHttp::new(HttpResponse::ok_json(body));

    let error = scripted_adapter(&http)
        .bars(BarsRequest::daily(symbol("OIBR3")))
        .await
        .expect_err("delisted");

    assert_eq!(error.kind(), SourceErrorKind::NotFound);
    assert!(error.message().contains("delisted"));
}

#[tokio::test]
async fn upstream_calls_spend_the_shared_request_budget() {
    let http = ScriptedHttp::new(HttpResponse::ok_json(CHART_BODY));
    let throttle = ThrottlingQueue::from_policy(&ProviderPolicy {
        max_concurrency: 1,
        quota_window: Duration::from_secs(60),
        quota_limit: 1,
    });
    let adapter = scripted_adapter(&http).with_throttle(throttle.clone());

    adapter
        .bars(BarsRequest::daily(symbol("PETR4")))
        .await
        .expect("bars");

    assert!(!throttle.try_acquire());
    assert_eq!(throttle.waiting_len(), 0);
}
