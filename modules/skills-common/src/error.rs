use thiserror::Error;

pub type Result<T> = std::result::Result<T, SkillError>;

/// Startup failures. Raised before any network call and always fatal.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("{0} not set")]
    MissingCredential(&'static str),

    #[error("{0}")]
    InvalidArgument(String),
}
