use std::fmt::Write as _;
use std::io::{self, Write};

use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use pregao_core::{ReportRow, SummaryMetrics, Trend, REPORT_COLUMNS};

use super::chart::render_distance_chart;
use super::RenderOptions;
use crate::commands::scan::ScanOutcome;

/// Header, summary, table, chart and warnings for one scan, on stdout.
///
/// The table goes through the terminal so its cell styles survive; with
/// `color` off every cell is plain.
pub fn print_dashboard(outcome: &ScanOutcome, options: RenderOptions) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render_heading(outcome, options).as_bytes())?;
    stdout.flush()?;
    drop(stdout);

    if !outcome.rows.is_empty() {
        let trends = trends_of(outcome);
        build_table(&outcome.rows, &trends, options.color).print_tty(options.color)?;
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(render_footer(outcome, options).as_bytes())?;
    stdout.flush()
}

fn trends_of(outcome: &ScanOutcome) -> Vec<Trend> {
    outcome
        .envelope
        .data
        .analyses
        .iter()
        .map(|analysis| analysis.trend)
        .collect()
}

fn render_heading(outcome: &ScanOutcome, options: RenderOptions) -> String {
    let data = &outcome.envelope.data;
    let meta = &outcome.envelope.meta;
    let mut out = String::new();

    let title = format!(
        "📈 B3 market scan · session {} · generated {}",
        meta.generated_at.session_date_string(),
        meta.generated_at.format_rfc3339()
    );
    let _ = writeln!(out, "{}", if options.color { title.bold().to_string() } else { title });
    let _ = writeln!(out);

    out.push_str(&render_summary(&data.summary, options.color));
    let _ = writeln!(out);

    if outcome.rows.is_empty() {
        let _ = writeln!(out, "No ticker could be analyzed.");
    }
    out
}

fn render_footer(outcome: &ScanOutcome, options: RenderOptions) -> String {
    let data = &outcome.envelope.data;
    let meta = &outcome.envelope.meta;
    let mut out = String::new();

    if options.chart && !outcome.rows.is_empty() {
        let _ = writeln!(out);
        out.push_str(&render_distance_chart(&data.analyses, options.color));
    }

    if let Some(path) = &data.report_path {
        let _ = writeln!(out);
        let _ = writeln!(out, "📄 Report saved to {}", path.display());
    }

    if !meta.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Warnings:");
        for warning in &meta.warnings {
            let line = format!("  - {warning}");
            let _ = writeln!(out, "{}", if options.color { line.yellow().to_string() } else { line });
        }
    }

    out
}

pub fn render_summary(summary: &SummaryMetrics, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary");

    let mut line = |label: &str, value: String| {
        let _ = writeln!(out, "  {label:<18}{value}");
    };

    line(
        "Analyzed",
        format!(
            "{} of {} ({} skipped)",
            summary.analyzed, summary.requested, summary.skipped
        ),
    );
    for trend in Trend::ALL {
        let label = trend.label();
        let count = summary.trends.get(trend).to_string();
        line(label, paint_trend(trend, &count, color));
    }
    line(
        "Above SMA200",
        summary
            .above_slow_pct
            .map_or_else(|| "N/A".to_owned(), |pct| format!("{pct:.1}%")),
    );
    line(
        "With gap",
        match summary.average_gap_pct {
            Some(average) => format!(
                "{} tickers, average {}",
                summary.with_gap,
                paint_signed(average, &format!("{average:+.2}%"), color)
            ),
            None => "none".to_owned(),
        },
    );
    if let Some(extreme) = &summary.largest_gap_up {
        let value = format!("{:+.2}%", extreme.gap_pct);
        line(
            "Largest gap up",
            format!("{} {}", extreme.symbol, paint_signed(extreme.gap_pct, &value, color)),
        );
    }
    if let Some(extreme) = &summary.largest_gap_down {
        let value = format!("{:+.2}%", extreme.gap_pct);
        line(
            "Largest gap down",
            format!("{} {}", extreme.symbol, paint_signed(extreme.gap_pct, &value, color)),
        );
    }

    out
}

/// Report rows as a bordered table. `trends` holds each row's trend and is
/// only read for styling.
pub fn build_table(rows: &[ReportRow], trends: &[Trend], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        REPORT_COLUMNS
            .iter()
            .map(|title| styled(title, if color { "b" } else { "" }))
            .collect(),
    ));

    for (row, trend) in rows.iter().zip(trends) {
        let [ticker, price, trend_label, gap, distance] = row.cells();
        let trend_spec = if color { trend_style(*trend) } else { "" };
        let gap_spec = match parse_percent(gap) {
            Some(value) if color && value > 0.0 => "Fgr",
            Some(value) if color && value < 0.0 => "Frr",
            _ => "r",
        };
        table.add_row(Row::new(vec![
            Cell::new(ticker),
            styled(price, "r"),
            styled(trend_label, trend_spec),
            styled(gap, gap_spec),
            styled(distance, "r"),
        ]));
    }

    table
}

fn styled(text: &str, spec: &str) -> Cell {
    Cell::new(text).style_spec(spec)
}

fn trend_style(trend: Trend) -> &'static str {
    match trend {
        Trend::StrongUp => "Fgb",
        Trend::Up => "FG",
        Trend::Down => "FR",
        Trend::StrongDown => "Frb",
    }
}

fn parse_percent(cell: &str) -> Option<f64> {
    cell.strip_suffix('%')?.parse().ok()
}

fn paint_trend(trend: Trend, text: &str, color: bool) -> String {
    if !color {
        return text.to_owned();
    }
    match trend {
        Trend::StrongUp => text.green().bold().to_string(),
        Trend::Up => text.bright_green().to_string(),
        Trend::Down => text.bright_red().to_string(),
        Trend::StrongDown => text.red().bold().to_string(),
    }
}

fn paint_signed(value: f64, text: &str, color: bool) -> String {
    if !color || value == 0.0 {
        return text.to_owned();
    }
    if value > 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}
