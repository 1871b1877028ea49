use std::fmt::Write;

use colored::Colorize;
use pregao_core::Analysis;

/// Cells on each side of the zero axis.
pub const HALF_WIDTH: usize = 20;

const BAR: &str = "█";
const AXIS: &str = "│";

/// Horizontal bars of each ticker's distance to its fast average, negatives
/// to the left of the axis. Bars are scaled to the largest absolute value.
pub fn render_distance_chart(analyses: &[Analysis], color: bool) -> String {
    let mut out = String::new();
    if analyses.is_empty() {
        return out;
    }

    let label_width = analyses
        .iter()
        .map(|analysis| analysis.symbol.as_str().len())
        .max()
        .unwrap_or(0);
    let scale = analyses
        .iter()
        .map(|analysis| analysis.distance_fast_pct.abs())
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);

    let _ = writeln!(out, "Distance to SMA50 (%)");
    for analysis in analyses {
        let value = analysis.distance_fast_pct;
        let cells = bar_cells(value, scale);
        let bar = BAR.repeat(cells);
        let blank = " ".repeat(HALF_WIDTH - cells);
        let empty_side = " ".repeat(HALF_WIDTH);

        let (left, right) = if value < 0.0 {
            let bar = if color { bar.red().to_string() } else { bar };
            (format!("{blank}{bar}"), empty_side)
        } else {
            let bar = if color { bar.green().to_string() } else { bar };
            (empty_side, format!("{bar}{blank}"))
        };

        let _ = writeln!(
            out,
            "{:<label_width$} {left}{AXIS}{right} {value:+.2}%",
            analysis.symbol.as_str(),
        );
    }
    out
}

fn bar_cells(value: f64, scale: f64) -> usize {
    if !value.is_finite() || scale <= 0.0 || value == 0.0 {
        return 0;
    }
    let cells = (value.abs() / scale * HALF_WIDTH as f64).round() as usize;
    cells.clamp(1, HALF_WIDTH)
}

#[cfg(test)]
mod tests {
    use pregao_core::{Symbol, Trend};

    use super::*;

    fn analysis(ticker: &str, distance: f64) -> Analysis {
        Analysis {
            symbol: Symbol::b3(ticker).expect("symbol"),
            price: 10.0,
            sma_fast: 10.0,
            sma_slow: 10.0,
            trend: Trend::Down,
            previous_close: 10.0,
            pre_market_price: None,
            gap_pct: None,
            distance_fast_pct: distance,
            distance_slow_pct: 0.0,
            currency: "BRL".to_owned(),
        }
    }

    #[test]
    fn largest_value_fills_its_side() {
        let chart = render_distance_chart(&[analysis("PETR4", 8.0), analysis("VALE3", -4.0)], false);
        let lines = chart.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Distance to SMA50 (%)");
        let (left, right) = lines[1].split_once(AXIS).expect("axis");
        assert_eq!(right.matches(BAR).count(), HALF_WIDTH);
        assert!(!left.contains(BAR));
        assert!(right.ends_with("+8.00%"));

        let (left, right) = lines[2].split_once(AXIS).expect("axis");
        assert_eq!(left.matches(BAR).count(), HALF_WIDTH / 2);
        assert!(!right.contains(BAR));
        assert!(right.ends_with("-4.00%"));
    }

    #[test]
    fn axis_is_aligned_across_rows() {
        let chart = render_distance_chart(&[analysis("KLBN11", 1.0), analysis("B3SA3", -0.01)], false);
        let columns = chart
            .lines()
            .skip(1)
            .map(|line| line.chars().position(|ch| ch == '│').expect("axis"))
            .collect::<Vec<_>>();
        assert_eq!(columns[0], columns[1]);
    }

    #[test]
    fn tiny_values_still_show_one_cell() {
        assert_eq!(bar_cells(0.001, 50.0), 1);
        assert_eq!(bar_cells(0.0, 50.0), 0);
        assert_eq!(bar_cells(f64::NAN, 50.0), 0);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_distance_chart(&[], true).is_empty());
    }
}
