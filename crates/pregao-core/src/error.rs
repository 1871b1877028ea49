use thiserror::Error;

/// A value rejected at a `pregao-core` boundary: a ticker, a bar, a
/// watchlist or an envelope field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    // tickers and watchlists
    #[error("ticker cannot be empty")]
    EmptySymbol,
    #[error("ticker is {len} characters long, at most {max} allowed")]
    SymbolTooLong { len: usize, max: usize },
    #[error("ticker must start with a letter, found '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("ticker has '{ch}' at position {index}; only letters, digits, '.' and '-' are allowed")]
    SymbolInvalidChar { ch: char, index: usize },
    #[error("watchlist has no tickers")]
    EmptyWatchlist,

    // chart request parameters
    #[error("unknown bar interval '{value}' (1m, 5m, 15m, 1h, 1d)")]
    InvalidInterval { value: String },
    #[error("unknown history range '{value}' (1mo, 3mo, 6mo, 1y, 2y)")]
    InvalidRange { value: String },
    #[error("moving average window cannot be zero")]
    ZeroWindow,

    // timestamps
    #[error("expected an RFC3339 UTC timestamp ending in Z, got '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix time {value} does not fit a calendar date")]
    TimestampOutOfRange { value: i64 },

    // prices and bars
    #[error("'{value}' is not a three letter uppercase currency code")]
    InvalidCurrency { value: String },
    #[error("{field} is NaN or infinite")]
    NonFiniteValue { field: &'static str },
    #[error("{field} is negative")]
    NegativeValue { field: &'static str },
    #[error("bar low is above its high")]
    InvalidBarRange,
    #[error("bar open or close falls outside its low..high range")]
    InvalidBarBounds,

    // json envelope
    #[error("request_id is shorter than 8 characters")]
    InvalidRequestId,
    #[error("trace_id is not 32 hex characters")]
    InvalidTraceId,
    #[error("schema_version '{value}' is not vMAJOR.MINOR.PATCH")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain is empty")]
    EmptySourceChain,
    #[error("error code is blank")]
    EmptyErrorCode,
    #[error("error message is blank")]
    EmptyErrorMessage,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv report error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
