//! Display rows, summary metrics and the CSV report.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::analysis::{Analysis, Trend};
use crate::scanner::ScanReport;
use crate::{CoreError, Symbol, UtcDateTime};

pub const REPORT_COLUMNS: [&str; 5] = ["Ticker", "Price", "Trend", "Gap (%)", "Dist. SMA50 (%)"];

const NOT_AVAILABLE: &str = "N/A";

/// One analysis formatted for the table and the CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub ticker: String,
    pub price: String,
    pub trend: String,
    pub gap: String,
    pub distance_fast: String,
}

impl ReportRow {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            ticker: analysis.symbol.to_string(),
            price: format_price(analysis.price, &analysis.currency),
            trend: analysis.trend.label().to_owned(),
            gap: analysis
                .gap_pct
                .map_or_else(|| NOT_AVAILABLE.to_owned(), format_percent),
            distance_fast: format_percent(analysis.distance_fast_pct),
        }
    }

    pub fn cells(&self) -> [&str; 5] {
        [
            self.ticker.as_str(),
            self.price.as_str(),
            self.trend.as_str(),
            self.gap.as_str(),
            self.distance_fast.as_str(),
        ]
    }
}

/// `R$ 37.12` for BRL, `USD 12.30` for anything else.
pub fn format_price(price: f64, currency: &str) -> String {
    match currency {
        "BRL" => format!("R$ {price:.2}"),
        other => format!("{other} {price:.2}"),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapExtreme {
    pub symbol: Symbol,
    pub gap_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrendCounts {
    pub strong_up: usize,
    pub up: usize,
    pub down: usize,
    pub strong_down: usize,
}

impl TrendCounts {
    pub fn get(&self, trend: Trend) -> usize {
        match trend {
            Trend::StrongUp => self.strong_up,
            Trend::Up => self.up,
            Trend::Down => self.down,
            Trend::StrongDown => self.strong_down,
        }
    }

    fn bump(&mut self, trend: Trend) {
        let slot = match trend {
            Trend::StrongUp => &mut self.strong_up,
            Trend::Up => &mut self.up,
            Trend::Down => &mut self.down,
            Trend::StrongDown => &mut self.strong_down,
        };
        *slot += 1;
    }
}

/// Headline numbers shown above the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub requested: usize,
    pub analyzed: usize,
    pub skipped: usize,
    pub trends: TrendCounts,
    /// Tickers with a pre-market print.
    pub with_gap: usize,
    pub average_gap_pct: Option<f64>,
    pub largest_gap_up: Option<GapExtreme>,
    pub largest_gap_down: Option<GapExtreme>,
    /// Share of analyzed tickers trading above the slow average, 0-100.
    pub above_slow_pct: Option<f64>,
}

impl SummaryMetrics {
    pub fn from_report(report: &ScanReport) -> Self {
        let mut metrics = Self::from_analyses(&report.analyses);
        metrics.requested = report.requested;
        metrics.skipped = report.skipped.len();
        metrics
    }

    pub fn from_analyses(analyses: &[Analysis]) -> Self {
        let mut trends = TrendCounts::default();
        for analysis in analyses {
            trends.bump(analysis.trend);
        }

        let gaps = analyses
            .iter()
            .filter_map(|analysis| analysis.gap_pct.map(|gap| (&analysis.symbol, gap)))
            .collect::<Vec<_>>();
        let average_gap_pct = if gaps.is_empty() {
            None
        } else {
            Some(gaps.iter().map(|(_, gap)| gap).sum::<f64>() / gaps.len() as f64)
        };
        let largest_gap_up = gaps
            .iter()
            .filter(|(_, gap)| *gap > 0.0)
            .max_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(symbol, gap)| GapExtreme {
                symbol: (*symbol).clone(),
                gap_pct: *gap,
            });
        let largest_gap_down = gaps
            .iter()
            .filter(|(_, gap)| *gap < 0.0)
            .min_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(symbol, gap)| GapExtreme {
                symbol: (*symbol).clone(),
                gap_pct: *gap,
            });

        let above_slow = analyses.iter().filter(|a| a.is_above_slow()).count();
        let above_slow_pct = if analyses.is_empty() {
            None
        } else {
            Some(above_slow as f64 / analyses.len() as f64 * 100.0)
        };

        Self {
            requested: analyses.len(),
            analyzed: analyses.len(),
            skipped: 0,
            trends,
            with_gap: gaps.len(),
            average_gap_pct,
            largest_gap_up,
            largest_gap_down,
            above_slow_pct,
        }
    }
}

/// Display order for analyzed rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Watchlist order.
    #[default]
    Input,
    Ticker,
    /// Largest gap first, missing gaps last.
    Gap,
    /// Furthest above SMA50 first.
    Distance,
    /// Strong Up first, ties by distance.
    Trend,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Input,
        Self::Ticker,
        Self::Gap,
        Self::Distance,
        Self::Trend,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Ticker => "ticker",
            Self::Gap => "gap",
            Self::Distance => "distance",
            Self::Trend => "trend",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| {
                format!("invalid sort key '{value}', expected one of input, ticker, gap, distance, trend")
            })
    }
}

/// Stable sort, so equal keys keep watchlist order.
pub fn sort_analyses(analyses: &mut [Analysis], key: SortKey) {
    match key {
        SortKey::Input => {}
        SortKey::Ticker => analyses.sort_by(|a, b| a.symbol.cmp(&b.symbol)),
        SortKey::Gap => analyses.sort_by(|a, b| descending_optional(a.gap_pct, b.gap_pct)),
        SortKey::Distance => {
            analyses.sort_by(|a, b| b.distance_fast_pct.total_cmp(&a.distance_fast_pct));
        }
        SortKey::Trend => analyses.sort_by(|a, b| {
            b.trend
                .strength()
                .cmp(&a.trend.strength())
                .then_with(|| b.distance_fast_pct.total_cmp(&a.distance_fast_pct))
        }),
    }
}

fn descending_optional(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => right.total_cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `market_analysis_YYYY-MM-DD.csv`, dated in B3 local time.
pub fn default_report_name(generated_at: UtcDateTime) -> String {
    format!("market_analysis_{}.csv", generated_at.session_date_string())
}

/// Streams the report as CSV: the [`REPORT_COLUMNS`] header, then one
/// record per row. Fields are quoted only when they need it.
pub fn write_csv_to<W: Write>(sink: W, rows: &[ReportRow]) -> Result<(), CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);
    writer.write_record(REPORT_COLUMNS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv(rows: &[ReportRow]) -> Result<String, CoreError> {
    let mut buffer = Vec::new();
    write_csv_to(&mut buffer, rows)?;
    String::from_utf8(buffer)
        .map_err(|error| CoreError::Io(io::Error::new(io::ErrorKind::InvalidData, error)))
}

/// Creates missing parent directories and replaces any existing file.
pub fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_csv_to(fs::File::create(path)?, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_quoted_only_when_needed() {
        let row = ReportRow {
            ticker: "PETR4.SA".to_owned(),
            price: "R$ 1,234.50".to_owned(),
            trend: "say \"up\"".to_owned(),
            gap: NOT_AVAILABLE.to_owned(),
            distance_fast: "0.10%".to_owned(),
        };
        let csv = to_csv(&[row]).expect("csv");
        assert_eq!(
            csv.lines().nth(1),
            Some("PETR4.SA,\"R$ 1,234.50\",\"say \"\"up\"\"\",N/A,0.10%")
        );
    }

    #[test]
    fn formats_brl_and_other_currencies() {
        assert_eq!(format_price(37.126, "BRL"), "R$ 37.13");
        assert_eq!(format_price(12.3, "USD"), "USD 12.30");
        assert_eq!(format_percent(-0.456), "-0.46%");
    }

    #[test]
    fn sort_key_parses_case_insensitively() {
        assert_eq!(SortKey::from_str("GAP"), Ok(SortKey::Gap));
        assert!(SortKey::from_str("volume").is_err());
    }

    #[test]
    fn missing_gaps_sort_last() {
        assert_eq!(descending_optional(Some(1.0), None), Ordering::Less);
        assert_eq!(descending_optional(Some(1.0), Some(2.0)), Ordering::Greater);
        assert_eq!(descending_optional(None, None), Ordering::Equal);
    }

    #[test]
    fn report_name_uses_session_date() {
        // 2024-06-05 01:00 UTC is still 2024-06-04 in Sao Paulo.
        let ts = UtcDateTime::parse("2024-06-05T01:00:00Z").expect("timestamp");
        assert_eq!(default_report_name(ts), "market_analysis_2024-06-04.csv");
    }
}
