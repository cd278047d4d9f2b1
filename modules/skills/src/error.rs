use thiserror::Error;

/// A provider response that doesn't fit the output schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("response missing required field `{0}`")]
    MissingField(&'static str),

    #[error("{0}")]
    Rejected(String),
}
