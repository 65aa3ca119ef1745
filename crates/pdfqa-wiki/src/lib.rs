//! Wikipedia knowledge source over the MediaWiki action API.
//!
//! `search` uses `list=search`; `summarize` reads the plain-text intro extract
//! of a page (`prop=extracts&exintro&explaintext&exsentences=N`), following
//! redirects.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use pdfqa_core::config::WikiSettings;
use pdfqa_core::traits::KnowledgeSource;

pub struct WikipediaClient {
    client: Client,
    api_url: String,
}

impl WikipediaClient {
    pub fn new(settings: &WikiSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, api_url: settings.api_url.clone() })
    }

    fn get(&self, params: &[(&str, String)]) -> Result<serde_json::Value> {
        let resp = self.client
            .get(&self.api_url)
            .query(&[("action", "query"), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .with_context(|| format!("request to {} failed", self.api_url))?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

impl KnowledgeSource for WikipediaClient {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let body = self.get(&[
            ("list", "search".to_string()),
            ("srsearch", query.to_string()),
            ("srlimit", max_results.to_string()),
            ("srprop", String::new()),
        ])?;
        let titles = parse_search_response(&body)?;
        debug!(query, hits = titles.len(), "wikipedia search");
        Ok(titles)
    }

    fn summarize(&self, title: &str, max_sentences: usize) -> Result<String> {
        let body = self.get(&[
            ("prop", "extracts".to_string()),
            ("explaintext", "1".to_string()),
            ("exintro", "1".to_string()),
            ("exsentences", max_sentences.to_string()),
            ("redirects", "1".to_string()),
            ("titles", title.to_string()),
        ])?;
        parse_extract_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Envelope<Q> {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    query: Option<Q>,
}

fn decode<Q: for<'de> Deserialize<'de> + Default>(body: &serde_json::Value) -> Result<Option<Q>> {
    let env: Envelope<Q> = serde_json::from_value(body.clone()).context("unexpected MediaWiki response shape")?;
    if let Some(err) = env.error { bail!("MediaWiki error {}: {}", err.code, err.info); }
    Ok(env.query)
}

/// Titles from a `list=search` response (formatversion=2), best first.
pub fn parse_search_response(body: &serde_json::Value) -> Result<Vec<String>> {
    let query: SearchQuery = decode(body)?.unwrap_or_default();
    Ok(query.search.into_iter().map(|h| h.title).collect())
}

/// The intro extract from a `prop=extracts` response (formatversion=2).
pub fn parse_extract_response(body: &serde_json::Value) -> Result<String> {
    let query: PagesQuery = decode(body)?.unwrap_or_default();
    let page = query.pages.into_iter().next().ok_or_else(|| anyhow!("response contains no page"))?;
    if page.missing || page.invalid { bail!("page '{}' does not exist", page.title); }
    let extract = page.extract.map(|e| e.trim().to_string()).unwrap_or_default();
    if extract.is_empty() { bail!("page '{}' has no summary text", page.title); }
    Ok(extract)
}
