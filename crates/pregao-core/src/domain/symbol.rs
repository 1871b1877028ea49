use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Longest ticker accepted, suffix included (`BBDC4.SA` is 8).
const MAX_TICKER_LEN: usize = 15;

/// Listing suffix Yahoo uses for B3 (Brasil Bolsa Balcão) instruments.
pub const B3_SUFFIX: &str = ".SA";

/// Uppercased Yahoo ticker such as `PETR4.SA`.
///
/// Orders lexicographically, which is what `--sort ticker` shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Takes the ticker as written, suffix and all.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();

        let Some(first) = ticker.chars().next() else {
            return Err(ValidationError::EmptySymbol);
        };
        let len = ticker.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }
        if !first.is_ascii_alphabetic() {
            return Err(ValidationError::SymbolInvalidStart { ch: first });
        }
        if let Some((index, ch)) = ticker
            .chars()
            .enumerate()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-')))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(ticker))
    }

    /// What users type: `petr4` becomes `PETR4.SA`, anything already carrying
    /// an exchange suffix is kept.
    pub fn b3(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.contains('.') {
            Self::parse(trimmed)
        } else {
            Self::parse(&format!("{trimmed}{B3_SUFFIX}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `PETR4.SA` -> `PETR4`.
    pub fn base(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(base, _)| base)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::b3(value)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
