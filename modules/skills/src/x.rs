//! `fetch-x`: one X/Twitter status as a post, a self-reply thread, or an article.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use x_client::{FxResponse, FxTweet, Reply, StatusRef, XClient};

use skills_common::{run_all, Config, OutputFormat, Reporter, RunResult, SkillError};

use crate::error::SchemaError;

pub const REPORTER: Reporter = Reporter::new(OutputFormat::Single, "url", "urls");

#[derive(Debug, Clone, Parser)]
#[command(
    name = "fetch-x",
    about = "Fetch an X/Twitter post, thread, or article as JSON"
)]
pub struct XArgs {
    /// Status URL, e.g. https://x.com/user/status/123
    pub url: String,
}

#[async_trait]
pub trait XBackend: Send + Sync {
    async fn status(&self, status: &StatusRef) -> Result<FxResponse>;
    async fn replies(&self, tweet_id: &str) -> Result<Vec<Reply>>;
}

#[async_trait]
impl XBackend for XClient {
    async fn status(&self, status: &StatusRef) -> Result<FxResponse> {
        Ok(XClient::status(self, status).await?)
    }

    async fn replies(&self, tweet_id: &str) -> Result<Vec<Reply>> {
        Ok(XClient::replies(self, tweet_id).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum XContent {
    XPost {
        author: String,
        text: String,
        images: Vec<String>,
        url: String,
    },
    XThread {
        author: String,
        text: String,
        images: Vec<String>,
        url: String,
    },
    XArticle {
        title: String,
        author: String,
        text: String,
        images: Vec<String>,
        url: String,
    },
}

/// Follow the author's self-replies starting at `root_id`: each link is a
/// reply by `author` to the previous link. Stops at the first gap or when an
/// id repeats.
pub fn thread_chain<'a>(author: &str, root_id: &str, replies: &'a [Reply]) -> Vec<&'a Reply> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([root_id]);
    let mut current = root_id.to_string();

    while let Some(next) = replies.iter().find(|r| {
        r.author_handle() == Some(author) && r.in_reply_to_id.as_deref() == Some(current.as_str())
    }) {
        let Some(id) = next.id.as_deref() else {
            chain.push(next);
            break;
        };
        if !seen.insert(id) {
            break;
        }
        chain.push(next);
        current = id.to_string();
    }

    chain
}

fn images(tweet: &FxTweet) -> Vec<String> {
    tweet
        .media
        .as_ref()
        .map(|m| m.photos.iter().map(|p| p.url.clone().unwrap_or_default()).collect())
        .unwrap_or_default()
}

fn post(author: String, tweet: &FxTweet, images: Vec<String>, url: &str) -> XContent {
    let text = format!(
        "Author: @{author}\n\n{}",
        tweet.text.as_deref().unwrap_or_default()
    );
    XContent::XPost {
        author,
        text,
        images,
        url: url.to_string(),
    }
}

fn article(author: String, tweet: &FxTweet, images: Vec<String>, url: &str) -> Option<XContent> {
    let article = tweet.article.as_ref()?;
    let title = article.title.clone().unwrap_or_default();

    let mut parts = vec![format!("Author: @{author}"), String::new(), title.clone(), String::new()];
    let blocks = article.content.iter().flat_map(|c| c.blocks.iter());
    for block in blocks {
        let text = block.text.as_deref().unwrap_or_default().trim();
        if !text.is_empty() {
            parts.push(text.to_string());
            parts.push(String::new());
        }
    }

    Some(XContent::XArticle {
        title,
        author,
        text: parts.join("\n").trim().to_string(),
        images,
        url: url.to_string(),
    })
}

fn thread(author: String, tweet: &FxTweet, chain: &[&Reply], images: Vec<String>, url: &str) -> XContent {
    let mut parts = vec![
        format!("Author: @{author}"),
        String::new(),
        format!("1\n{}", tweet.text.as_deref().unwrap_or_default()),
    ];
    for (i, reply) in chain.iter().enumerate() {
        parts.push(format!(
            "\n{}\n{}",
            i + 2,
            reply.text.as_deref().unwrap_or_default()
        ));
    }

    XContent::XThread {
        author,
        text: parts.join("\n"),
        images,
        url: url.to_string(),
    }
}

/// Fetch one status and shape it. Articles skip the reply lookup; a failed
/// reply lookup degrades to a single post.
pub async fn fetch_status(backend: &dyn XBackend, status: &StatusRef, url: &str) -> Result<XContent> {
    let response = backend.status(status).await?;
    let tweet = match response.tweet {
        Some(tweet) => tweet,
        None => {
            return Err(match response.message {
                Some(message) => SchemaError::Rejected(format!("fxtwitter: {message}")).into(),
                None => SchemaError::MissingField("tweet").into(),
            })
        }
    };

    let author = tweet
        .author
        .as_ref()
        .and_then(|a| a.screen_name.clone())
        .unwrap_or_default();
    let images = images(&tweet);

    if let Some(content) = article(author.clone(), &tweet, images.clone(), url) {
        info!(url, "Fetched X article");
        return Ok(content);
    }

    let replies = match backend.replies(&status.tweet_id).await {
        Ok(replies) => replies,
        Err(e) => {
            warn!(url, error = %format!("{e:#}"), "Reply lookup failed, returning single post");
            return Ok(post(author, &tweet, images, url));
        }
    };

    let chain = thread_chain(&author, &status.tweet_id, &replies);
    if chain.is_empty() {
        info!(url, replies = replies.len(), "Fetched X post");
        return Ok(post(author, &tweet, images, url));
    }

    info!(url, posts = chain.len() + 1, "Fetched X thread");
    Ok(thread(author, &tweet, &chain, images, url))
}

pub async fn execute_with<B, F>(
    config: &Config,
    args: XArgs,
    connect: F,
) -> Result<RunResult<XContent>, SkillError>
where
    B: XBackend,
    F: FnOnce(String) -> B,
{
    let api_key = config.twitterapi_io_key()?.to_string();
    let status =
        StatusRef::parse(&args.url).map_err(|e| SkillError::InvalidArgument(e.to_string()))?;
    let backend = connect(api_key);

    let backend = &backend;
    let status = &status;
    Ok(run_all(vec![args.url], 1, |item| async move {
        fetch_status(backend, status, &item.target).await
    })
    .await)
}

pub async fn execute(config: &Config, args: XArgs) -> Result<RunResult<XContent>, SkillError> {
    execute_with(config, args, XClient::new).await
}
