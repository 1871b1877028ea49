use pregao_core::{Envelope, ProviderId};
use serde::Serialize;

use crate::cli::{Cli, OutputFormat};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output;

use super::CommandResult;

#[derive(Debug, Clone, Copy, Serialize)]
struct Section {
    title: &'static str,
    body: &'static str,
}

const SECTIONS: [Section; 5] = [
    Section {
        title: "Moving averages (SMA50 / SMA200)",
        body: "A simple moving average is the mean of the last N daily closes. \
The 50 day average follows the medium-term direction; the 200 day average is \
the long-term reference most desks watch. A price above an average means \
buyers have been in control over that window.",
    },
    Section {
        title: "Trend classes",
        body: "Strong Up: last close above both averages.\n\
Up: above exactly one of them, usually a trend starting or fading.\n\
Strong Down: below both averages.\n\
Down: everything else, including a close sitting exactly on an average.",
    },
    Section {
        title: "Pre-market gap",
        body: "Gap (%) = (pre-market price - previous close) / previous close x 100. \
A positive gap means the stock is set to open above yesterday's close. \
Tickers with no pre-market trade show N/A.",
    },
    Section {
        title: "Distance to SMA50",
        body: "How far the last close sits from the 50 day average, in percent. \
Large positive values flag stretched moves; large negative values flag \
oversold names. The bar chart plots this column.",
    },
    Section {
        title: "Caveats",
        body: "Data comes from Yahoo Finance with a delay and prices are adjusted \
for splits and dividends. Tickers with less than 200 sessions of history are \
skipped. This is a screening aid, not a recommendation.",
    },
];

pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match cli.format {
        OutputFormat::Json => {
            let meta = Metadata::new(ProviderId::Yahoo).local_meta()?;
            output::render_json(&Envelope::success(meta, SECTIONS), cli.pretty)?;
        }
        OutputFormat::Table | OutputFormat::Csv => print!("{}", render_text()),
    }
    Ok(CommandResult::ok())
}

fn render_text() -> String {
    let mut out = String::from("📖 How to read the scan\n");
    for section in SECTIONS {
        out.push('\n');
        out.push_str(section.title);
        out.push('\n');
        out.push_str(&"-".repeat(section.title.chars().count()));
        out.push('\n');
        out.push_str(section.body);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_trend_label_is_explained() {
        let text = render_text();
        for trend in pregao_core::Trend::ALL {
            assert!(text.contains(&format!("{}:", trend.label())), "missing {trend}");
        }
    }
}
