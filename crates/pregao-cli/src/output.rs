mod chart;
mod table;

use std::io::{IsTerminal, Write};

use pregao_core::{write_csv_to, Envelope, ScanProgress, Symbol};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::scan::ScanOutcome;
use crate::error::CliError;

use self::table::print_dashboard;

/// Terminal rendering switches for the table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
    pub chart: bool,
}

/// ANSI colors only for an interactive stdout, unless disabled by flag or
/// `NO_COLOR`.
pub fn color_enabled(no_color: bool) -> bool {
    !no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

pub fn render_scan(
    outcome: &ScanOutcome,
    format: OutputFormat,
    pretty: bool,
    options: RenderOptions,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => render_json(&outcome.envelope, pretty)?,
        OutputFormat::Csv => write_csv_to(std::io::stdout().lock(), &outcome.rows)?,
        OutputFormat::Table => print_dashboard(outcome, options)?,
    }
    Ok(())
}

pub fn render_json<T: Serialize>(envelope: &Envelope<T>, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    println!("{payload}");
    Ok(())
}

/// One-line progress on stderr while a scan runs.
pub struct StderrProgress {
    enabled: bool,
}

impl StderrProgress {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            enabled: format == OutputFormat::Table && std::io::stderr().is_terminal(),
        }
    }
}

impl ScanProgress for StderrProgress {
    fn on_finish(&self, completed: usize, total: usize, symbol: &Symbol, _analyzed: bool) {
        if !self.enabled {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = if completed == total {
            write!(stderr, "\r{:width$}\r", "", width = 48)
        } else {
            write!(stderr, "\rAnalyzing {completed}/{total}: {:<16}", symbol.as_str())
        };
        let _ = stderr.flush();
    }
}
