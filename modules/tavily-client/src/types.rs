use serde::{Deserialize, Serialize, Serializer};

// --- Shared enums ---

/// Search depth for `/search`. Trades latency for relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchDepth {
    UltraFast,
    Fast,
    Basic,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    General,
    News,
    Finance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

/// Format of page content returned by `/extract` and `include_raw_content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    Text,
}

/// `include_answer` is sent as `true` for a basic answer and as the string
/// `"advanced"` for the slower, better one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    Basic,
    Advanced,
}

impl Serialize for AnswerMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnswerMode::Basic => serializer.serialize_bool(true),
            AnswerMode::Advanced => serializer.serialize_str("advanced"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractDepth {
    Basic,
    Advanced,
}

// --- /search ---

/// Body for `POST /search`. Only populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_depth: Option<SearchDepth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_per_source: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_domains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_answer: Option<AnswerMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_raw_content: Option<ContentFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_images: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_image_descriptions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_favicon: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_parameters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_usage: Option<bool>,
}

/// Raw `/search` response. Every field is optional here; the caller decides
/// which ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    pub query: Option<String>,
    pub results: Option<Vec<SearchHit>>,
    pub answer: Option<String>,
    /// Plain URLs, or `{url, description}` objects when descriptions were requested.
    pub images: Option<Vec<serde_json::Value>>,
    /// Seconds; older API versions send it as a string.
    pub response_time: Option<serde_json::Value>,
    pub request_id: Option<String>,
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub score: Option<f64>,
    pub raw_content: Option<String>,
    pub published_date: Option<String>,
    pub favicon: Option<String>,
}

// --- /extract ---

/// Body for `POST /extract`.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractRequest {
    pub urls: Vec<String>,
    pub extract_depth: ExtractDepth,
    pub format: ContentFormat,
    /// Provider-side timeout in seconds.
    pub timeout: f64,
    pub include_images: bool,
    pub include_favicon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_per_source: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub results: Vec<ExtractedPage>,
    #[serde(default)]
    pub failed_results: Vec<FailedExtraction>,
    pub response_time: Option<serde_json::Value>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedPage {
    pub url: Option<String>,
    pub title: Option<String>,
    pub raw_content: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FailedExtraction {
    pub url: Option<String>,
    pub error: Option<String>,
}
