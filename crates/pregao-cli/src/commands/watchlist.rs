use std::io::Write;

use pregao_core::{Envelope, ProviderId, Symbol, Watchlist};
use serde::Serialize;

use crate::cli::{Cli, OutputFormat, TickerArgs};
use crate::config::Settings;
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output;

use super::{resolve_watchlist, CommandResult};

#[derive(Debug, Serialize)]
struct TickerRecord<'a> {
    #[serde(rename = "Ticker")]
    ticker: &'a str,
}

#[derive(Debug, Serialize)]
struct WatchlistData<'a> {
    count: usize,
    tickers: &'a [Symbol],
}

pub fn run(cli: &Cli, settings: &Settings, args: &TickerArgs) -> Result<CommandResult, CliError> {
    let watchlist = resolve_watchlist(args, settings)?;

    match cli.format {
        OutputFormat::Json => {
            let meta = Metadata::new(ProviderId::Yahoo).local_meta()?;
            let data = WatchlistData {
                count: watchlist.len(),
                tickers: watchlist.symbols(),
            };
            output::render_json(&Envelope::success(meta, data), cli.pretty)?;
        }
        OutputFormat::Csv => write_csv(std::io::stdout().lock(), &watchlist)?,
        OutputFormat::Table => print!("{}", render_lines(&watchlist)),
    }

    Ok(CommandResult::ok())
}

fn write_csv<W: Write>(sink: W, watchlist: &Watchlist) -> Result<(), CliError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);
    for symbol in watchlist.symbols() {
        writer
            .serialize(TickerRecord {
                ticker: symbol.as_str(),
            })
            .map_err(|error| CliError::Io(std::io::Error::other(error)))?;
    }
    writer.flush()?;
    Ok(())
}

fn render_lines(watchlist: &Watchlist) -> String {
    let mut out = format!("{} tickers\n", watchlist.len());
    for (index, symbol) in watchlist.symbols().iter().enumerate() {
        out.push_str(&format!("{:>3}  {symbol}\n", index + 1));
    }
    out
}
