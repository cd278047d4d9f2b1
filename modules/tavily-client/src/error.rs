use thiserror::Error;

pub type Result<T> = std::result::Result<T, TavilyError>;

#[derive(Debug, Error)]
pub enum TavilyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("tavily returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TavilyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TavilyError::Parse(err.to_string())
        } else {
            TavilyError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TavilyError {
    fn from(err: serde_json::Error) -> Self {
        TavilyError::Parse(err.to_string())
    }
}
