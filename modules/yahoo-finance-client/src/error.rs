use thiserror::Error;

pub type Result<T> = std::result::Result<T, YahooError>;

#[derive(Debug, Error)]
pub enum YahooError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("yahoo returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("no chart data for {symbol}: {reason}")]
    NoData { symbol: String, reason: String },

    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),
}

impl From<reqwest::Error> for YahooError {
    fn from(err: reqwest::Error) -> Self {
        YahooError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for YahooError {
    fn from(err: serde_json::Error) -> Self {
        YahooError::Parse(err.to_string())
    }
}
