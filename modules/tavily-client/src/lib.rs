pub mod error;
pub mod types;

pub use error::{Result, TavilyError};
pub use types::{
    AnswerMode, ContentFormat, ExtractDepth, ExtractRequest, ExtractResponse, ExtractedPage,
    FailedExtraction, SearchDepth, SearchHit, SearchRequest, SearchResponse, TimeRange, Topic,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

const BASE_URL: &str = "https://api.tavily.com";

/// HTTP timeout for `/search` calls.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack added on top of the provider-side extract timeout so the server
/// gives up before we do.
const EXTRACT_TIMEOUT_SLACK: Duration = Duration::from_secs(30);

/// HTTP timeout for an extract call with the given provider timeout.
fn extract_timeout(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .and_then(|t| t.checked_add(EXTRACT_TIMEOUT_SLACK))
        .ok_or_else(|| TavilyError::InvalidRequest(format!("timeout out of range: {secs}")))
}

pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run a single web search.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        tracing::debug!(query = %request.query, "tavily: search");
        self.post("search", request, SEARCH_TIMEOUT).await
    }

    /// Extract page content for the given URLs. The HTTP timeout is the
    /// provider timeout plus a fixed slack.
    pub async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        tracing::debug!(
            urls = request.urls.len(),
            depth = ?request.extract_depth,
            "tavily: extract"
        );
        let timeout = extract_timeout(request.timeout)?;
        self.post("extract", request, timeout).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TavilyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_timeout_adds_slack() {
        assert_eq!(extract_timeout(60.0).unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn extract_timeout_rejects_unrepresentable_values() {
        assert!(matches!(
            extract_timeout(1e20),
            Err(TavilyError::InvalidRequest(_))
        ));
        assert!(extract_timeout(-1.0).is_err());
        assert!(extract_timeout(f64::NAN).is_err());
    }

    #[tokio::test]
    async fn extract_with_huge_timeout_errors_without_sending() {
        let client = TavilyClient::with_base_url("tvly-test".into(), "http://127.0.0.1:9");
        let request = ExtractRequest {
            urls: vec!["https://a.example".into()],
            extract_depth: ExtractDepth::Basic,
            format: ContentFormat::Markdown,
            timeout: 1e20,
            include_images: true,
            include_favicon: false,
            query: None,
            chunks_per_source: None,
        };

        let err = client.extract(&request).await.unwrap_err();
        assert!(err.to_string().starts_with("invalid request: timeout out of range"));
    }
}
