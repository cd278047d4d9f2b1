//! `web-fetch`: extract page content for up to 20 URLs through Tavily.
//!
//! Each URL is its own work item with its own retry sequence; a page that
//! keeps failing at `basic` depth is retried at `advanced` for the second half
//! of its budget. Output is one JSON object per line.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tavily_client::{ContentFormat, ExtractDepth, ExtractRequest, ExtractResponse, TavilyClient};
use tracing::info;

use skills_common::retry::{DEFAULT_RETRY_DELAY, RetryPolicy};
use skills_common::{run_all, Config, Depth, OutputFormat, Reporter, RunResult, SkillError};

use crate::error::SchemaError;

/// Hard cap on URLs per invocation; also the fan-out width.
pub const MAX_URLS: usize = 20;

/// Longest provider timeout accepted, in seconds.
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

pub const REPORTER: Reporter = Reporter::new(OutputFormat::Lines, "url", "urls");

// --- Input ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Markdown,
    Text,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "web-fetch",
    about = "Fetch raw content from web pages via the Tavily extract API"
)]
pub struct FetchArgs {
    /// One or more URLs to extract (max 20)
    #[arg(required = true, num_args = 1..)]
    pub urls: Vec<String>,

    /// Query for targeted extraction; reranks chunks by relevance
    #[arg(short, long)]
    pub query: Option<String>,

    /// Chunks per source. Only used with --query
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=5))]
    pub chunks: u32,

    /// basic (faster) or advanced (for JS/complex pages)
    #[arg(short, long, value_enum, default_value_t = DepthArg::Basic)]
    pub depth: DepthArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Markdown)]
    pub format: FormatArg,

    /// Don't include image URLs
    #[arg(long)]
    pub no_images: bool,

    /// Include favicon URL
    #[arg(long)]
    pub favicon: bool,

    /// Max provider wait time in seconds
    #[arg(short, long, default_value_t = 60.0)]
    pub timeout: f64,

    /// Max attempts per URL
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,
}

/// Flags applied uniformly to every URL in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub depth: Depth,
    pub format: ContentFormat,
    pub include_images: bool,
    pub include_favicon: bool,
    pub timeout: f64,
    pub query: Option<String>,
    pub chunks_per_source: u32,
}

impl ExtractOptions {
    /// Request for one URL at the given attempt depth.
    pub fn request_for(&self, url: &str, depth: Depth) -> ExtractRequest {
        ExtractRequest {
            urls: vec![url.to_string()],
            extract_depth: match depth {
                Depth::Basic => ExtractDepth::Basic,
                Depth::Advanced => ExtractDepth::Advanced,
            },
            format: self.format,
            timeout: self.timeout,
            include_images: self.include_images,
            include_favicon: self.include_favicon,
            query: self.query.clone(),
            chunks_per_source: self.query.as_ref().map(|_| self.chunks_per_source),
        }
    }
}

fn validate_url(raw: &str) -> Result<(), SkillError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| SkillError::InvalidArgument(format!("invalid URL {raw:?}: {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(SkillError::InvalidArgument(format!(
            "only http/https URLs are allowed, got {raw:?}"
        )));
    }
    Ok(())
}

impl FetchArgs {
    pub fn to_options(&self) -> Result<ExtractOptions, SkillError> {
        if self.urls.len() > MAX_URLS {
            return Err(SkillError::InvalidArgument(format!(
                "maximum {MAX_URLS} URLs allowed, got {}",
                self.urls.len()
            )));
        }
        for url in &self.urls {
            validate_url(url)?;
        }
        if !self.timeout.is_finite() || self.timeout <= 0.0 || self.timeout > MAX_TIMEOUT_SECS {
            return Err(SkillError::InvalidArgument(format!(
                "timeout must be between 0 and {MAX_TIMEOUT_SECS} seconds, got {}",
                self.timeout
            )));
        }

        Ok(ExtractOptions {
            depth: match self.depth {
                DepthArg::Basic => Depth::Basic,
                DepthArg::Advanced => Depth::Advanced,
            },
            format: match self.format {
                FormatArg::Markdown => ContentFormat::Markdown,
                FormatArg::Text => ContentFormat::Text,
            },
            include_images: !self.no_images,
            include_favicon: self.favicon,
            timeout: self.timeout,
            query: self.query.clone().filter(|q| !q.trim().is_empty()),
            chunks_per_source: self.chunks,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, DEFAULT_RETRY_DELAY)
    }
}

// --- Dispatch ---

#[async_trait]
pub trait ExtractBackend: Send + Sync {
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse>;
}

#[async_trait]
impl ExtractBackend for TavilyClient {
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse> {
        Ok(TavilyClient::extract(self, request).await?)
    }
}

// --- Output ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOutput {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: String,
    pub author: String,
    pub text: String,
    pub images: Vec<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Map an `/extract` response for a single URL onto the output schema.
/// Provider-side failures and empty results are errors so the caller retries.
pub fn normalize(url: &str, mut response: ExtractResponse, include_favicon: bool) -> Result<PageOutput> {
    if response.results.is_empty() {
        if let Some(failed) = response.failed_results.first() {
            let reason = failed.error.as_deref().unwrap_or("unknown error");
            return Err(anyhow!("extract failed: {reason}"));
        }
        return Err(anyhow!("no content extracted"));
    }

    let index = response
        .results
        .iter()
        .position(|r| r.url.as_deref() == Some(url))
        .unwrap_or(0);
    let page = response.results.swap_remove(index);

    let text = page
        .raw_content
        .ok_or(SchemaError::MissingField("raw_content"))?;

    Ok(PageOutput {
        kind: "webpage",
        title: page.title.unwrap_or_default(),
        author: String::new(),
        text,
        images: page.images,
        url: url.to_string(),
        favicon: page.favicon.filter(|f| include_favicon && !f.is_empty()),
    })
}

// --- Pipeline ---

/// Extract one URL, retrying per `policy`.
pub async fn extract_page(
    backend: &dyn ExtractBackend,
    url: &str,
    options: &ExtractOptions,
    policy: RetryPolicy,
) -> Result<PageOutput> {
    let page = policy
        .run(options.depth, |attempt| async move {
            info!(
                url,
                attempt = attempt.number,
                depth = %attempt.depth,
                "Extracting page"
            );
            let request = options.request_for(url, attempt.depth);
            let response = backend.extract(&request).await?;
            normalize(url, response, options.include_favicon)
        })
        .await
        .context("tavily extraction")?;

    info!(url, bytes = page.text.len(), "Extracted page");
    Ok(page)
}

/// Extract every URL concurrently, each with its own retry sequence.
pub async fn run(
    backend: &dyn ExtractBackend,
    urls: Vec<String>,
    options: &ExtractOptions,
    policy: RetryPolicy,
) -> RunResult<PageOutput> {
    run_all(urls, MAX_URLS, |item| async move {
        extract_page(backend, &item.target, options, policy).await
    })
    .await
}

pub async fn execute_with<B, F>(
    config: &Config,
    args: FetchArgs,
    connect: F,
) -> Result<RunResult<PageOutput>, SkillError>
where
    B: ExtractBackend,
    F: FnOnce(String) -> B,
{
    let api_key = config.tavily_api_key()?.to_string();
    let options = args.to_options()?;
    let policy = args.retry_policy();
    let backend = connect(api_key);
    Ok(run(&backend, args.urls, &options, policy).await)
}

pub async fn execute(config: &Config, args: FetchArgs) -> Result<RunResult<PageOutput>, SkillError> {
    execute_with(config, args, TavilyClient::new).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(args: &[&str]) -> FetchArgs {
        let mut argv = vec!["web-fetch"];
        argv.extend_from_slice(args);
        FetchArgs::try_parse_from(argv).unwrap()
    }

    fn response(value: serde_json::Value) -> ExtractResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_match_documented_flags() {
        let args = parse(&["https://example.com"]);
        let options = args.to_options().unwrap();
        assert_eq!(options.depth, Depth::Basic);
        assert_eq!(options.format, ContentFormat::Markdown);
        assert!(options.include_images);
        assert!(!options.include_favicon);
        assert_eq!(options.timeout, 60.0);
        assert_eq!(args.retry_policy().max_attempts(), 5);
    }

    #[test]
    fn chunks_only_sent_with_query() {
        let options = parse(&["https://example.com", "-c", "4"]).to_options().unwrap();
        let request = options.request_for("https://example.com", Depth::Basic);
        assert_eq!(request.chunks_per_source, None);

        let options = parse(&["https://example.com", "-q", "pricing", "-c", "4"])
            .to_options()
            .unwrap();
        let request = options.request_for("https://example.com", Depth::Advanced);
        assert_eq!(request.chunks_per_source, Some(4));
        assert_eq!(request.extract_depth, ExtractDepth::Advanced);
    }

    #[test]
    fn chunks_out_of_range_is_a_usage_error() {
        assert!(FetchArgs::try_parse_from(["web-fetch", "https://a.example", "-c", "6"]).is_err());
    }

    #[test]
    fn more_than_twenty_urls_is_rejected() {
        let urls: Vec<String> = (0..21).map(|i| format!("https://example.com/{i}")).collect();
        let mut argv = vec!["web-fetch".to_string()];
        argv.extend(urls);
        let args = FetchArgs::try_parse_from(argv).unwrap();
        let err = args.to_options().unwrap_err();
        assert_eq!(err.to_string(), "maximum 20 URLs allowed, got 21");
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = parse(&["ftp://example.com/file"]).to_options().unwrap_err();
        assert!(err.to_string().contains("only http/https"));
        assert!(parse(&["not a url"]).to_options().is_err());
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        assert!(parse(&["https://example.com", "-t", "0"]).to_options().is_err());
    }

    #[test]
    fn oversized_timeout_is_rejected() {
        let err = parse(&["https://a.example", "-t", "1e20"]).to_options().unwrap_err();
        assert!(matches!(err, SkillError::InvalidArgument(_)));
        assert!(err.to_string().starts_with("timeout must be between 0 and 3600"));

        let options = parse(&["https://a.example", "-t", "3600"]).to_options().unwrap();
        assert_eq!(options.timeout, 3600.0);
    }

    #[test]
    fn normalize_maps_page() {
        let page = normalize(
            "https://example.com",
            response(json!({
                "results": [{
                    "url": "https://example.com",
                    "title": "Example",
                    "raw_content": "# Example",
                    "images": ["https://example.com/a.png"],
                    "favicon": "https://example.com/favicon.ico"
                }]
            })),
            false,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({
                "type": "webpage",
                "title": "Example",
                "author": "",
                "text": "# Example",
                "images": ["https://example.com/a.png"],
                "url": "https://example.com"
            })
        );
    }

    #[test]
    fn favicon_only_when_requested() {
        let body = json!({"results": [{"raw_content": "x", "favicon": "https://e.com/f.ico"}]});
        let page = normalize("https://e.com", response(body), true).unwrap();
        assert_eq!(page.favicon.as_deref(), Some("https://e.com/f.ico"));
    }

    #[test]
    fn failed_result_surfaces_provider_error() {
        let err = normalize(
            "https://example.com",
            response(json!({"results": [], "failed_results": [{"url": "https://example.com", "error": "timeout"}]})),
            false,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "extract failed: timeout");
    }

    #[test]
    fn empty_results_is_no_content() {
        let err = normalize("https://example.com", response(json!({})), false).unwrap_err();
        assert_eq!(err.to_string(), "no content extracted");
    }

    #[test]
    fn missing_raw_content_is_a_schema_error() {
        let err = normalize(
            "https://example.com",
            response(json!({"results": [{"url": "https://example.com", "title": "t"}]})),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SchemaError>(),
            Some(&SchemaError::MissingField("raw_content"))
        );
    }
}
