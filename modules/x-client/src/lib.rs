pub mod error;
pub mod types;

pub use error::{Result, XError};
pub use types::{
    FxArticle, FxArticleBlock, FxArticleContent, FxAuthor, FxMedia, FxPhoto, FxResponse, FxTweet,
    RepliesPage, Reply, ReplyAuthor, StatusRef,
};

use std::time::Duration;

const FXTWITTER_BASE_URL: &str = "https://api.fxtwitter.com";
const TWITTERAPI_BASE_URL: &str = "https://api.twitterapi.io";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on reply pages walked for one status.
const MAX_REPLY_PAGES: usize = 50;

pub struct XClient {
    client: reqwest::Client,
    api_key: String,
    fxtwitter_base: String,
    twitterapi_base: String,
}

impl XClient {
    /// `api_key` is the twitterapi.io key; fxtwitter needs none.
    pub fn new(api_key: String) -> Self {
        Self::with_base_urls(api_key, FXTWITTER_BASE_URL, TWITTERAPI_BASE_URL)
    }

    pub fn with_base_urls(api_key: String, fxtwitter_base: &str, twitterapi_base: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            fxtwitter_base: fxtwitter_base.trim_end_matches('/').to_string(),
            twitterapi_base: twitterapi_base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a status (tweet, media, article) from fxtwitter.
    pub async fn status(&self, status: &StatusRef) -> Result<FxResponse> {
        let url = format!(
            "{}/{}/status/{}",
            self.fxtwitter_base, status.username, status.tweet_id
        );
        tracing::debug!(%url, "fxtwitter: fetching status");

        let resp = self.client.get(&url).send().await?;
        let status_code = resp.status();
        if !status_code.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(XError::Api {
                provider: "fxtwitter",
                status: status_code.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch one page of replies, ranked by relevance.
    pub async fn replies_page(&self, tweet_id: &str, cursor: Option<&str>) -> Result<RepliesPage> {
        let url = format!("{}/twitter/tweet/replies/v2", self.twitterapi_base);
        let mut query = vec![("tweetId", tweet_id), ("queryType", "Relevance")];
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            query.push(("cursor", cursor));
        }

        let resp = self
            .client
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(XError::Api {
                provider: "twitterapi.io",
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Walk every page of replies until the cursor runs out.
    pub async fn replies(&self, tweet_id: &str) -> Result<Vec<Reply>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;

        for page_no in 1..=MAX_REPLY_PAGES {
            let page = self.replies_page(tweet_id, cursor.as_deref()).await?;
            all.extend(page.tweets);

            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }

            if page_no == MAX_REPLY_PAGES {
                tracing::warn!(tweet_id, pages = MAX_REPLY_PAGES, "Reply page cap reached");
            }
        }

        tracing::debug!(tweet_id, count = all.len(), "twitterapi.io: fetched replies");
        Ok(all)
    }
}
