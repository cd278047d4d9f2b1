//! `web-search`: run one or more Tavily searches concurrently and print a
//! JSON array with one object per query, in the order the queries were given.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tavily_client::{
    AnswerMode, ContentFormat, SearchDepth, SearchHit, SearchRequest, SearchResponse,
    TavilyClient, TimeRange, Topic,
};
use tracing::info;

use skills_common::{run_all, Config, OutputFormat, Reporter, RunResult, SkillError};

use crate::error::SchemaError;

/// Queries searched at once. Extra queries wait for a free slot.
pub const MAX_CONCURRENT_QUERIES: usize = 10;

pub const REPORTER: Reporter = Reporter::new(OutputFormat::Array, "query", "queries");

// --- Input ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    UltraFast,
    Fast,
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopicArg {
    General,
    News,
    Finance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRangeArg {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnswerArg {
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RawContentArg {
    Markdown,
    Text,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "web-search",
    about = "Search the web using the Tavily API",
    after_help = "Examples:\n  \
        web-search \"latest AI trends\"\n  \
        web-search \"AAPL earnings\" --topic finance --time-range week\n  \
        web-search \"machine learning\" --include-domains arxiv.org,github.com --max-results 10\n  \
        web-search \"quantum computing\" --depth advanced --include-answer --include-raw-content"
)]
pub struct SearchArgs {
    /// One or more search queries (keep each under 400 chars)
    #[arg(required = true, num_args = 1..)]
    pub queries: Vec<String>,

    /// Search depth: ultra-fast, fast, basic, or advanced (highest relevance)
    #[arg(long, value_enum)]
    pub depth: Option<DepthArg>,

    /// Topic category. News includes published_date.
    #[arg(long, value_enum)]
    pub topic: Option<TopicArg>,

    /// Maximum results per query
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=20))]
    pub max_results: Option<u32>,

    /// Chunks per source for advanced/fast depth
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=3))]
    pub chunks_per_source: Option<u32>,

    /// Restrict to a relative time range
    #[arg(long, value_enum)]
    pub time_range: Option<TimeRangeArg>,

    /// Results after date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Results before date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Comma-separated domains to include (wildcards like *.com allowed)
    #[arg(long, value_delimiter = ',')]
    pub include_domains: Vec<String>,

    /// Comma-separated domains to exclude
    #[arg(long, value_delimiter = ',')]
    pub exclude_domains: Vec<String>,

    /// Boost results from a country (e.g. "united states", "japan")
    #[arg(long)]
    pub country: Option<String>,

    /// Include an AI-generated answer; `=advanced` for a better one
    #[arg(long, value_enum, num_args = 0..=1, require_equals = true, default_missing_value = "basic")]
    pub include_answer: Option<AnswerArg>,

    /// Include full page content in the given format
    #[arg(long, value_enum, num_args = 0..=1, require_equals = true, default_missing_value = "markdown")]
    pub include_raw_content: Option<RawContentArg>,

    /// Include image results
    #[arg(long)]
    pub include_images: bool,

    /// Include AI descriptions for images
    #[arg(long, requires = "include_images")]
    pub include_image_descriptions: bool,

    /// Include a favicon URL per result
    #[arg(long)]
    pub include_favicon: bool,

    /// Let Tavily pick parameters from the query intent
    #[arg(long)]
    pub auto_parameters: bool,

    /// Include credit usage in the response
    #[arg(long)]
    pub include_usage: bool,
}

impl SearchArgs {
    /// Validate the arguments and build the request shared by every query.
    /// The `query` field of the returned template is left empty.
    pub fn to_template(&self) -> Result<SearchRequest, SkillError> {
        if let Some(pos) = self.queries.iter().position(|q| q.trim().is_empty()) {
            return Err(SkillError::InvalidArgument(format!(
                "query {} is empty",
                pos + 1
            )));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(SkillError::InvalidArgument(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }

        let domains = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect()
        };
        let flag = |set: bool| set.then_some(true);

        Ok(SearchRequest {
            query: String::new(),
            search_depth: self.depth.map(|d| match d {
                DepthArg::UltraFast => SearchDepth::UltraFast,
                DepthArg::Fast => SearchDepth::Fast,
                DepthArg::Basic => SearchDepth::Basic,
                DepthArg::Advanced => SearchDepth::Advanced,
            }),
            topic: self.topic.map(|t| match t {
                TopicArg::General => Topic::General,
                TopicArg::News => Topic::News,
                TopicArg::Finance => Topic::Finance,
            }),
            max_results: self.max_results,
            chunks_per_source: self.chunks_per_source,
            time_range: self.time_range.map(|r| match r {
                TimeRangeArg::Day => TimeRange::Day,
                TimeRangeArg::Week => TimeRange::Week,
                TimeRangeArg::Month => TimeRange::Month,
                TimeRangeArg::Year => TimeRange::Year,
            }),
            start_date: self.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            end_date: self.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
            include_domains: domains(&self.include_domains),
            exclude_domains: domains(&self.exclude_domains),
            country: self.country.clone().filter(|c| !c.trim().is_empty()),
            include_answer: self.include_answer.map(|a| match a {
                AnswerArg::Basic => AnswerMode::Basic,
                AnswerArg::Advanced => AnswerMode::Advanced,
            }),
            include_raw_content: self.include_raw_content.map(|f| match f {
                RawContentArg::Markdown => ContentFormat::Markdown,
                RawContentArg::Text => ContentFormat::Text,
            }),
            include_images: flag(self.include_images),
            include_image_descriptions: flag(self.include_image_descriptions),
            include_favicon: flag(self.include_favicon),
            auto_parameters: flag(self.auto_parameters),
            include_usage: flag(self.include_usage),
        })
    }
}

// --- Dispatch ---

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

#[async_trait]
impl SearchBackend for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        Ok(TavilyClient::search(self, request).await?)
    }
}

// --- Output ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutput {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub query: String,
    pub results: Vec<SearchResultOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultOutput {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn normalize_hit(hit: SearchHit) -> Result<SearchResultOutput, SchemaError> {
    let url = non_empty(hit.url).ok_or(SchemaError::MissingField("results[].url"))?;
    Ok(SearchResultOutput {
        title: hit.title.unwrap_or_default(),
        url,
        content: hit.content.unwrap_or_default(),
        score: hit.score,
        raw_content: non_empty(hit.raw_content),
        published_date: non_empty(hit.published_date),
        favicon: non_empty(hit.favicon),
    })
}

/// Map a raw `/search` response onto the output schema.
pub fn normalize(query: &str, response: SearchResponse) -> Result<SearchOutput, SchemaError> {
    let hits = response
        .results
        .ok_or(SchemaError::MissingField("results"))?;
    let results = hits
        .into_iter()
        .map(normalize_hit)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchOutput {
        kind: "search",
        query: query.to_string(),
        results,
        answer: non_empty(response.answer),
        images: response.images.filter(|i| !i.is_empty()),
        response_time: response.response_time.filter(|t| !t.is_null()),
        request_id: non_empty(response.request_id),
        usage: response.usage.filter(|u| !u.is_null()),
    })
}

// --- Pipeline ---

/// Search every query against `backend`, at most `MAX_CONCURRENT_QUERIES` at once.
pub async fn run(
    backend: &dyn SearchBackend,
    queries: Vec<String>,
    template: &SearchRequest,
) -> RunResult<SearchOutput> {
    run_all(queries, MAX_CONCURRENT_QUERIES, |item| async move {
        let request = SearchRequest {
            query: item.target.clone(),
            ..template.clone()
        };
        info!(query = %item.target, "Searching");
        let response = backend.search(&request).await?;
        let output = normalize(&item.target, response)
            .with_context(|| format!("unexpected response for query {:?}", item.target))?;
        info!(query = %item.target, results = output.results.len(), "Search complete");
        Ok::<_, anyhow::Error>(output)
    })
    .await
}

/// Resolve credentials and arguments, then run with a backend built by `connect`.
pub async fn execute_with<B, F>(
    config: &Config,
    args: SearchArgs,
    connect: F,
) -> Result<RunResult<SearchOutput>, SkillError>
where
    B: SearchBackend,
    F: FnOnce(String) -> B,
{
    let api_key = config.tavily_api_key()?.to_string();
    let template = args.to_template()?;
    let backend = connect(api_key);
    Ok(run(&backend, args.queries, &template).await)
}

pub async fn execute(
    config: &Config,
    args: SearchArgs,
) -> Result<RunResult<SearchOutput>, SkillError> {
    execute_with(config, args, TavilyClient::new).await
}
