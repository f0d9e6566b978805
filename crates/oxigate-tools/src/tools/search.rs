//! Web search tools — Bing, DuckDuckGo, SearXNG and Tavily.
//!
//! All of them take a `query` and return a list of [`SearchResult`]s, so the
//! model sees the same shape whichever engine is configured.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::base::{require_string, Tool, ToolError};

const BING_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/search";
const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";
const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

const SEARCH_DESCRIPTION: &str = "Search online if the requested information cannot be found in the \
     language model or the information could be present in a time after the language model was trained.";

/// One normalised search hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub content: String,
}

fn query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "the text to search online to get the necessary information"
            }
        },
        "required": ["query"]
    })
}

fn http_client() -> Client {
    Client::builder()
        .timeout(SEARCH_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Fail on a non-2xx status, keeping the body for the error.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ToolError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ToolError::Backend {
        status: status.as_u16(),
        body,
    })
}

fn to_value(results: Vec<SearchResult>) -> Value {
    serde_json::to_value(results).unwrap_or_else(|_| Value::Array(Vec::new()))
}

// ─────────────────────────────────────────────
// Bing
// ─────────────────────────────────────────────

/// Searches with the Bing Web Search API.
pub struct BingTool {
    token: String,
    endpoint: String,
    client: Client,
}

impl BingTool {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: BING_ENDPOINT.to_string(),
            client: http_client(),
        }
    }

    /// Point the tool at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BingResponse {
    web_pages: BingWebPages,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BingWebPages {
    value: Vec<BingPage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BingPage {
    url: String,
    name: String,
    snippet: String,
}

#[async_trait]
impl Tool for BingTool {
    fn name(&self) -> &str {
        "bing"
    }

    fn description(&self) -> &str {
        SEARCH_DESCRIPTION
    }

    fn parameters(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let query = require_string(params, "query")?;
        debug!(query = %query, "searching bing");

        let resp = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.token)
            .query(&[("q", query.as_str())])
            .send()
            .await?;
        let data: BingResponse = check_status(resp).await?.json().await?;

        let results = data
            .web_pages
            .value
            .into_iter()
            .map(|p| SearchResult {
                url: p.url,
                title: p.name,
                content: p.snippet,
            })
            .collect();
        Ok(to_value(results))
    }
}

// ─────────────────────────────────────────────
// DuckDuckGo
// ─────────────────────────────────────────────

/// Searches with the keyless DuckDuckGo Instant Answer API.
pub struct DuckDuckGoTool {
    endpoint: String,
    client: Client,
}

impl DuckDuckGoTool {
    pub fn new() -> Self {
        Self {
            endpoint: DUCKDUCKGO_ENDPOINT.to_string(),
            client: http_client(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for DuckDuckGoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DuckDuckGoResponse {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    related_topics: Vec<DuckDuckGoTopic>,
}

/// Either a single hit or a named group of hits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DuckDuckGoTopic {
    #[serde(rename = "FirstURL")]
    first_url: String,
    text: String,
    topics: Vec<DuckDuckGoTopic>,
}

impl DuckDuckGoTopic {
    fn collect_into(self, out: &mut Vec<SearchResult>) {
        if !self.first_url.is_empty() {
            // "Title - description" is the usual shape of a topic text
            let title = self
                .text
                .split_once(" - ")
                .map(|(title, _)| title.to_string())
                .unwrap_or_else(|| self.text.clone());
            out.push(SearchResult {
                url: self.first_url,
                title,
                content: self.text,
            });
        }
        for topic in self.topics {
            topic.collect_into(out);
        }
    }
}

impl From<DuckDuckGoResponse> for Vec<SearchResult> {
    fn from(data: DuckDuckGoResponse) -> Self {
        let mut out = Vec::new();
        if !data.abstract_url.is_empty() {
            out.push(SearchResult {
                url: data.abstract_url,
                title: data.heading,
                content: data.abstract_text,
            });
        }
        for topic in data.related_topics {
            topic.collect_into(&mut out);
        }
        out
    }
}

#[async_trait]
impl Tool for DuckDuckGoTool {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn description(&self) -> &str {
        SEARCH_DESCRIPTION
    }

    fn parameters(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let query = require_string(params, "query")?;
        debug!(query = %query, "searching duckduckgo");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;
        let data: DuckDuckGoResponse = check_status(resp).await?.json().await?;

        Ok(to_value(data.into()))
    }
}

// ─────────────────────────────────────────────
// SearXNG
// ─────────────────────────────────────────────

/// Searches a self-hosted SearXNG instance.
pub struct SearxngTool {
    url: String,
    client: Client,
}

impl SearxngTool {
    /// `url` is the instance root, e.g. `http://localhost:8888`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }
}

/// Result list shared by SearXNG and Tavily.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultsResponse {
    results: Vec<SearchResult>,
}

#[async_trait]
impl Tool for SearxngTool {
    fn name(&self) -> &str {
        "searxng"
    }

    fn description(&self) -> &str {
        SEARCH_DESCRIPTION
    }

    fn parameters(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let query = require_string(params, "query")?;
        debug!(query = %query, url = %self.url, "searching searxng");

        let resp = self
            .client
            .get(format!("{}/search", self.url))
            .query(&[("q", query.as_str()), ("format", "json")])
            .send()
            .await?;
        let data: ResultsResponse = check_status(resp).await?.json().await?;

        Ok(to_value(data.results))
    }
}

// ─────────────────────────────────────────────
// Tavily
// ─────────────────────────────────────────────

/// Searches with the Tavily API.
pub struct TavilyTool {
    token: String,
    endpoint: String,
    client: Client,
}

impl TavilyTool {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: TAVILY_ENDPOINT.to_string(),
            client: http_client(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Tool for TavilyTool {
    fn name(&self) -> &str {
        "tavily"
    }

    fn description(&self) -> &str {
        SEARCH_DESCRIPTION
    }

    fn parameters(&self) -> Value {
        query_schema()
    }

    async fn execute(&self, params: &HashMap<String, Value>) -> Result<Value, ToolError> {
        let query = require_string(params, "query")?;
        debug!(query = %query, "searching tavily");

        let body = json!({
            "api_key": self.token,
            "query": query,
            "include_answer": false,
        });
        let resp = self.client.post(&self.endpoint).json(&body).send().await?;
        let data: ResultsResponse = check_status(resp).await?.json().await?;

        Ok(to_value(data.results))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
