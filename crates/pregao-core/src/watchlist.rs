//! Ticker lists to scan.

use std::path::Path;

use crate::{CoreError, Symbol, ValidationError};

/// Liquid B3 names scanned when no list is given.
pub const DEFAULT_B3_TICKERS: [&str; 63] = [
    "PETR4", "VALE3", "ITUB4", "BBDC4", "B3SA3", "ELET3", "ABEV3", "RENT3", "WEGE3", "PRIO3",
    "HAPV3", "ITSA4", "SUZB3", "GGBR4", "BBAS3", "EQTL3", "RADL3", "RDOR3", "CSAN3", "UGPA3",
    "VBBR3", "MGLU3", "VIVT3", "RAIL3", "LREN3", "ASAI3", "KLBN11", "TOTS3", "EMBR3", "HYPE3",
    "CMIG4", "NTCO3", "BRFS3", "SBSP3", "GOAU4", "TIMS3", "CSNA3", "CPLE6", "ENEV3", "CRFB3",
    "CCRO3", "RAIZ4", "CIEL3", "ALPA4", "BEEF3", "RRRP3", "CYRE3", "IRBR3", "PCAR3", "MRFG3",
    "PETZ3", "ARZZ3", "SOMA3", "EZTC3", "CVCB3", "USIM5", "MRVE3", "DXCO3", "MULT3", "BRKM5",
    "YDUQ3", "COGN3", "VIIA3",
];

/// Ordered, de-duplicated list of B3 symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    symbols: Vec<Symbol>,
}

impl Watchlist {
    pub fn default_b3() -> Self {
        let symbols = DEFAULT_B3_TICKERS
            .iter()
            .filter_map(|ticker| Symbol::b3(ticker).ok())
            .collect();
        Self { symbols }
    }

    /// Parses tickers separated by commas, semicolons, whitespace or newlines.
    ///
    /// Text after `#` on a line is ignored. Tickers without an exchange
    /// suffix get `.SA`. Repeats keep their first position.
    ///
    /// # Errors
    ///
    /// The first invalid ticker, or [`ValidationError::EmptyWatchlist`] when
    /// nothing is left.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let tokens = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default())
            .flat_map(|line| line.split(|ch: char| ch == ',' || ch == ';' || ch.is_whitespace()))
            .filter(|token| !token.is_empty());

        let mut symbols = Vec::new();
        for token in tokens {
            push_unique(&mut symbols, Symbol::b3(token)?);
        }
        Self::from_symbols(symbols)
    }

    /// Same rules as [`Watchlist::parse`], one call per argument.
    pub fn from_args<I, S>(args: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse(&joined)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    pub fn from_symbols(symbols: Vec<Symbol>) -> Result<Self, ValidationError> {
        let mut unique = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            push_unique(&mut unique, symbol);
        }
        if unique.is_empty() {
            return Err(ValidationError::EmptyWatchlist);
        }
        Ok(Self { symbols: unique })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::default_b3()
    }
}

fn push_unique(symbols: &mut Vec<Symbol>, symbol: Symbol) {
    if !symbols.contains(&symbol) {
        symbols.push(symbol);
    }
}
