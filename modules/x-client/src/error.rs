use thiserror::Error;

pub type Result<T> = std::result::Result<T, XError>;

#[derive(Debug, Error)]
pub enum XError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{provider} returned status {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("invalid X URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for XError {
    fn from(err: reqwest::Error) -> Self {
        XError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for XError {
    fn from(err: serde_json::Error) -> Self {
        XError::Parse(err.to_string())
    }
}
