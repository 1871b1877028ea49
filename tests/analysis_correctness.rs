//! Mathematical correctness of the moving averages, trend classes, gap and
//! distance figures, computed over hand-built price histories.

mod support;

use pregao_core::{
    analyze, classify_trend, gap_percent, rolling_sma, sma, AnalysisConfig, SkipReason, Trend,
};
use support::{quote, ramp, series};

fn flat_then(first: (usize, f64), second: (usize, f64), last: f64) -> Vec<f64> {
    let mut closes = vec![first.1; first.0];
    closes.extend(std::iter::repeat(second.1).take(second.0));
    closes.push(last);
    closes
}

// =============================================================================
// Moving averages
// =============================================================================

#[test]
fn sma_is_the_mean_of_the_last_window_closes() {
    // Given: closes 1, 2, ..., 200
    let closes = ramp(1.0, 1.0, 200);

    // Then: SMA50 = mean(151..=200), SMA200 = mean(1..=200)
    assert_eq!(sma(&closes, 50), Some(175.5));
    assert_eq!(sma(&closes, 200), Some(100.5));
    assert_eq!(sma(&closes, 201), None);
    assert_eq!(sma(&closes, 0), None);
}

#[test]
fn rolling_sma_agrees_with_sma_at_every_point() {
    let closes = ramp(37.0, -0.013, 260);
    let rolling = rolling_sma(&closes, 50);

    assert_eq!(rolling.len(), closes.len());
    assert!(rolling[..49].iter().all(Option::is_none));
    for end in 50..=closes.len() {
        let expected = sma(&closes[..end], 50).expect("window filled");
        let actual = rolling[end - 1].expect("window filled");
        assert!((expected - actual).abs() < 1e-9, "index {end}: {expected} vs {actual}");
    }
}

// =============================================================================
// Trend classes
// =============================================================================

#[test]
fn steady_rally_is_strong_up() {
    let analysis = analyze(&series("PETR4", &ramp(20.0, 0.1, 250)), None, &AnalysisConfig::default())
        .expect("analysis");
    assert!(analysis.price > analysis.sma_fast && analysis.price > analysis.sma_slow);
    assert_eq!(analysis.trend, Trend::StrongUp);
}

#[test]
fn steady_decline_is_strong_down() {
    let analysis = analyze(&series("MGLU3", &ramp(40.0, -0.1, 250)), None, &AnalysisConfig::default())
        .expect("analysis");
    assert_eq!(analysis.trend, Trend::StrongDown);
}

#[test]
fn rebound_above_the_fast_average_only_is_up() {
    // SMA50 = 50.2, SMA200 = 87.55, price 60
    let closes = flat_then((150, 100.0), (49, 50.0), 60.0);
    let analysis = analyze(&series("CVCB3", &closes), None, &AnalysisConfig::default())
        .expect("analysis");

    assert!((analysis.sma_fast - 50.2).abs() < 1e-9);
    assert!((analysis.sma_slow - 87.55).abs() < 1e-9);
    assert_eq!(analysis.trend, Trend::Up);
}

#[test]
fn pullback_above_the_slow_average_only_is_up() {
    // SMA50 = 99.6, SMA200 = 62.4, price 80
    let closes = flat_then((150, 50.0), (49, 100.0), 80.0);
    let analysis = analyze(&series("EMBR3", &closes), None, &AnalysisConfig::default())
        .expect("analysis");

    assert!(analysis.price < analysis.sma_fast);
    assert!(analysis.price > analysis.sma_slow);
    assert_eq!(analysis.trend, Trend::Up);
}

#[test]
fn price_sitting_on_the_averages_is_down() {
    let analysis = analyze(&series("TAEE11", &[20.0; 200]), None, &AnalysisConfig::default())
        .expect("analysis");
    assert_eq!(analysis.trend, Trend::Down);
    assert_eq!(analysis.distance_fast_pct, 0.0);
}

#[test]
fn classification_covers_every_ordering() {
    // price, sma50, sma200
    let cases = [
        (12.0, 10.0, 11.0, Trend::StrongUp),
        (10.5, 10.0, 11.0, Trend::Up),
        (10.5, 11.0, 10.0, Trend::Up),
        (9.0, 10.0, 11.0, Trend::StrongDown),
        (10.0, 10.0, 9.0, Trend::Up),
        (10.0, 10.0, 11.0, Trend::Down),
    ];
    for (price, fast, slow, expected) in cases {
        assert_eq!(classify_trend(price, fast, slow), expected, "{price} {fast} {slow}");
    }
}

// =============================================================================
// Gap and distance
// =============================================================================

#[test]
fn gap_formula() {
    let gap = gap_percent(37.5, 36.0).expect("gap");
    assert!((gap - 4.166_666_666_666_667).abs() < 1e-9);
    assert_eq!(gap_percent(36.0, 36.0), Some(0.0));
    assert_eq!(gap_percent(36.0, 0.0), None);
}

#[test]
fn gap_is_missing_without_a_pre_market_print() {
    let history = series("VALE3", &ramp(60.0, 0.01, 210));
    let config = AnalysisConfig::default();

    let no_quote = analyze(&history, None, &config).expect("analysis");
    let no_print = analyze(&history, Some(&quote("VALE3", 62.0, None)), &config).expect("analysis");

    assert_eq!(no_quote.gap_pct, None);
    assert_eq!(no_print.gap_pct, None);
    assert_eq!(no_print.pre_market_price, None);
}

#[test]
fn distance_to_fast_average_uses_the_last_close() {
    // Last 50 closes average 10.0; the last close is 11.0.
    let mut closes = vec![10.0; 199];
    closes.extend([11.0]);
    closes[150] = 9.0;
    let analysis = analyze(&series("LREN3", &closes), None, &AnalysisConfig::default())
        .expect("analysis");

    assert_eq!(analysis.sma_fast, 10.0);
    assert!((analysis.distance_fast_pct - 10.0).abs() < 1e-9);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn shorter_windows_need_less_history() {
    let config = AnalysisConfig {
        fast_window: 5,
        slow_window: 10,
        min_history: 10,
    };
    let analysis = analyze(&series("HYPE3", &ramp(30.0, 0.5, 12)), None, &config).expect("analysis");
    assert_eq!(analysis.trend, Trend::StrongUp);
    assert_eq!(analysis.sma_fast, 34.5);
}

#[test]
fn history_below_the_minimum_is_rejected() {
    let err = analyze(&series("RRRP3", &ramp(30.0, 0.1, 199)), None, &AnalysisConfig::default())
        .expect_err("must skip");
    assert_eq!(
        err,
        SkipReason::InsufficientHistory {
            available: 199,
            required: 200
        }
    );
}
