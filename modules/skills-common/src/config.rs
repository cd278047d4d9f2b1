use crate::error::{Result, SkillError};

pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
pub const TWITTERAPI_IO_KEY: &str = "TWITTERAPI_IO_KEY";

/// Provider credentials, read once at startup and handed to each skill.
/// Keys are optional here; each skill asks for the ones it needs.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub tavily_api_key: Option<String>,
    pub twitterapi_io_key: Option<String>,
}

impl Config {
    /// Load from the process environment, after an optional `.env` file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok());
        config.log_keys();
        config
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            tavily_api_key: get(TAVILY_API_KEY),
            twitterapi_io_key: get(TWITTERAPI_IO_KEY),
        }
    }

    pub fn tavily_api_key(&self) -> Result<&str> {
        self.tavily_api_key
            .as_deref()
            .ok_or(SkillError::MissingCredential(TAVILY_API_KEY))
    }

    pub fn twitterapi_io_key(&self) -> Result<&str> {
        self.twitterapi_io_key
            .as_deref()
            .ok_or(SkillError::MissingCredential(TWITTERAPI_IO_KEY))
    }

    fn log_keys(&self) {
        fn preview(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let head: String = v.chars().take(5).collect();
                    format!("{}...({} chars)", head, v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::debug!("Config loaded:");
        tracing::debug!("  {}: {}", TAVILY_API_KEY, preview(&self.tavily_api_key));
        tracing::debug!("  {}: {}", TWITTERAPI_IO_KEY, preview(&self.twitterapi_io_key));
    }
}
