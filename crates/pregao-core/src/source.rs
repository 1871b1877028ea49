use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Provider named in `meta.source_chain` and on envelope errors.
///
/// Yahoo Finance is the only market data provider; the enum keeps the JSON
/// shape stable should another feed be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Yahoo => "yahoo",
        })
    }
}
