use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, XError};

static RE_STATUS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:x\.com|twitter\.com)/(\w+)/status/(\d+)").unwrap()
});

/// The `<user>/status/<id>` pair pulled out of an X or Twitter link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRef {
    pub username: String,
    pub tweet_id: String,
}

impl StatusRef {
    pub fn parse(url: &str) -> Result<Self> {
        let caps = RE_STATUS_URL
            .captures(url)
            .ok_or_else(|| XError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            username: caps[1].to_string(),
            tweet_id: caps[2].to_string(),
        })
    }
}

// --- fxtwitter ---

/// Envelope returned by `api.fxtwitter.com/<user>/status/<id>`.
#[derive(Debug, Clone, Deserialize)]
pub struct FxResponse {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub tweet: Option<FxTweet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxTweet {
    pub id: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
    pub author: Option<FxAuthor>,
    pub media: Option<FxMedia>,
    pub article: Option<FxArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxAuthor {
    pub screen_name: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxMedia {
    #[serde(default)]
    pub photos: Vec<FxPhoto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxPhoto {
    pub url: Option<String>,
}

/// Long-form X article attached to a status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxArticle {
    pub title: Option<String>,
    pub content: Option<FxArticleContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxArticleContent {
    #[serde(default)]
    pub blocks: Vec<FxArticleBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxArticleBlock {
    pub text: Option<String>,
}

// --- twitterapi.io ---

/// One page of `GET /twitter/tweet/replies/v2`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepliesPage {
    #[serde(default)]
    pub tweets: Vec<Reply>,
    #[serde(default)]
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reply {
    pub id: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "inReplyToId")]
    pub in_reply_to_id: Option<String>,
    pub author: Option<ReplyAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyAuthor {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

impl Reply {
    pub fn author_handle(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.user_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_status_url() {
        assert_eq!(
            StatusRef::parse("https://x.com/jack/status/20").unwrap(),
            StatusRef {
                username: "jack".into(),
                tweet_id: "20".into(),
            }
        );
    }

    #[test]
    fn twitter_status_url_with_www_and_query() {
        let status = StatusRef::parse("https://www.twitter.com/rustlang/status/1234567?s=20").unwrap();
        assert_eq!(status.username, "rustlang");
        assert_eq!(status.tweet_id, "1234567");
    }

    #[test]
    fn profile_url_is_rejected() {
        match StatusRef::parse("https://x.com/jack") {
            Err(XError::InvalidUrl(url)) => assert_eq!(url, "https://x.com/jack"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn other_host_is_rejected() {
        assert!(StatusRef::parse("https://example.com/jack/status/20").is_err());
    }

    #[test]
    fn replies_page_reads_camel_case_fields() {
        let page: RepliesPage = serde_json::from_str(
            r#"{"tweets":[{"id":"2","text":"more","inReplyToId":"1","author":{"userName":"jack"}}],
                "has_next_page":false}"#,
        )
        .unwrap();
        assert_eq!(page.tweets[0].in_reply_to_id.as_deref(), Some("1"));
        assert_eq!(page.tweets[0].author_handle(), Some("jack"));
        assert!(page.next_cursor.is_none());
    }
}
