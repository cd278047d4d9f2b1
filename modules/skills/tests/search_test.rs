//! web-search pipeline against a scripted backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::Parser;
use serde_json::json;
use skills::search::{self, SearchArgs, SearchBackend};
use skills_common::{Config, RunStatus, SkillError};
use tavily_client::{SearchRequest, SearchResponse};

/// Answers queries from a fixed table; unknown queries fail.
#[derive(Default)]
struct ScriptedSearch {
    responses: HashMap<String, serde_json::Value>,
    seen: Mutex<Vec<SearchRequest>>,
}

impl ScriptedSearch {
    fn with(mut self, query: &str, body: serde_json::Value) -> Self {
        self.responses.insert(query.to_string(), body);
        self
    }

    fn seen_queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = self
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.query.clone())
            .collect();
        queries.sort();
        queries
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.seen.lock().unwrap().push(request.clone());
        match self.responses.get(&request.query) {
            Some(body) => Ok(serde_json::from_value(body.clone())?),
            None => Err(anyhow!("tavily returned status 500: upstream error")),
        }
    }
}

fn hit(url: &str) -> serde_json::Value {
    json!({"title": "t", "url": url, "content": "c", "score": 0.5})
}

fn args(argv: &[&str]) -> SearchArgs {
    let mut full = vec!["web-search"];
    full.extend_from_slice(argv);
    SearchArgs::try_parse_from(full).unwrap()
}

fn config() -> Config {
    Config::from_lookup(|key| (key == "TAVILY_API_KEY").then(|| "tvly-test".to_string()))
}

fn render(run: &skills_common::RunResult<search::SearchOutput>) -> (String, String, RunStatus) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = search::REPORTER.report(run, &mut out, &mut err).unwrap();
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
        status,
    )
}

#[tokio::test]
async fn partial_failure_keeps_successes_in_input_order() {
    let backend = ScriptedSearch::default()
        .with("rust", json!({"results": [hit("https://rust-lang.org")]}))
        .with("tokio", json!({"results": [hit("https://tokio.rs")]}));
    let template = args(&["x"]).to_template().unwrap();

    let queries = vec!["rust".to_string(), "broken".to_string(), "tokio".to_string()];
    let run = search::run(&backend, queries, &template).await;

    let (out, err, status) = render(&run);
    let parsed: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    let queries: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["query"].as_str().unwrap())
        .collect();
    assert_eq!(queries, vec!["rust", "tokio"]);
    assert_eq!(parsed[0]["type"], "search");
    assert_eq!(parsed[0]["results"][0]["url"], "https://rust-lang.org");
    assert!(err.contains("warning: query \"broken\" failed: tavily returned status 500"));
    assert_eq!(status, RunStatus::Success);
}

#[tokio::test]
async fn every_query_failing_is_all_failed() {
    let backend = ScriptedSearch::default();
    let template = args(&["x"]).to_template().unwrap();

    let run = search::run(&backend, vec!["a".into(), "b".into()], &template).await;

    let (out, err, status) = render(&run);
    assert!(out.is_empty());
    assert!(err.ends_with("error: all queries failed\n"));
    assert_eq!(status, RunStatus::AllFailed);
}

#[tokio::test]
async fn response_without_results_is_a_failure() {
    let backend = ScriptedSearch::default().with("rust", json!({"answer": "no list"}));
    let template = args(&["x"]).to_template().unwrap();

    let run = search::run(&backend, vec!["rust".into()], &template).await;

    let failure = run.failures().next().unwrap();
    assert!(failure.error.contains("missing required field `results`"));
}

#[tokio::test]
async fn template_flags_reach_every_request() {
    let backend = ScriptedSearch::default()
        .with("a", json!({"results": []}))
        .with("b", json!({"results": []}));
    let template = args(&["x", "--topic", "news", "--max-results", "3"])
        .to_template()
        .unwrap();

    let run = search::run(&backend, vec!["a".into(), "b".into()], &template).await;

    assert_eq!(run.successes().count(), 2);
    assert_eq!(backend.seen_queries(), vec!["a", "b"]);
    for request in backend.seen.lock().unwrap().iter() {
        assert_eq!(request.max_results, Some(3));
        assert!(request.topic.is_some());
    }
}

#[tokio::test]
async fn more_queries_than_the_cap_all_run() {
    let mut backend = ScriptedSearch::default();
    let queries: Vec<String> = (0..25).map(|i| format!("q{i}")).collect();
    for q in &queries {
        backend = backend.with(q, json!({"results": [hit("https://example.com")]}));
    }
    let template = args(&["x"]).to_template().unwrap();

    let run = search::run(&backend, queries.clone(), &template).await;

    let got: Vec<String> = run.successes().map(|o| o.query.clone()).collect();
    assert_eq!(got, queries);
}

#[tokio::test]
async fn missing_credential_fails_before_connecting() {
    let connects = AtomicUsize::new(0);
    let result = search::execute_with(&Config::default(), args(&["rust"]), |_key| {
        connects.fetch_add(1, Ordering::SeqCst);
        ScriptedSearch::default()
    })
    .await;

    match result {
        Err(SkillError::MissingCredential(name)) => assert_eq!(name, "TAVILY_API_KEY"),
        other => panic!("expected missing credential, got {:?}", other.map(|r| r.len())),
    }
    assert_eq!(connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn execute_with_passes_the_key_to_the_backend() {
    let mut key_seen = None;
    let run = search::execute_with(&config(), args(&["rust"]), |key| {
        key_seen = Some(key);
        ScriptedSearch::default().with("rust", json!({"results": []}))
    })
    .await
    .unwrap();

    assert_eq!(key_seen.as_deref(), Some("tvly-test"));
    assert_eq!(run.len(), 1);
    assert!(!run.all_failed());
}
