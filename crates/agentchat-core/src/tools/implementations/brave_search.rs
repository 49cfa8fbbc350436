//! Brave Search tool - only registered when an API key is configured

use std::fmt::Write as _;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::tools::registry::Tool;
use crate::tools::{parse_params, ToolContext, ToolResult};

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const DEFAULT_COUNT: u32 = 10;
const MAX_COUNT: u32 = 20;
const MAX_NEWS_RESULTS: usize = 3;

pub struct BraveSearchTool {
    client: reqwest::Client,
    api_key: String,
}

impl BraveSearchTool {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Freshness {
    Pd,
    Pw,
    Pm,
    Py,
}

impl Freshness {
    fn as_str(self) -> &'static str {
        match self {
            Freshness::Pd => "pd",
            Freshness::Pw => "pw",
            Freshness::Pm => "pm",
            Freshness::Py => "py",
        }
    }
}

#[derive(Deserialize)]
struct Params {
    query: String,
    /// Models sometimes send `5.0`
    #[serde(default)]
    count: Option<f64>,
    #[serde(default)]
    freshness: Option<Freshness>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    web: Option<ResultList<WebResult>>,
    #[serde(default)]
    news: Option<ResultList<NewsResult>>,
}

#[derive(Debug, Deserialize)]
struct ResultList<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn effective_count(requested: Option<f64>) -> u32 {
    match requested {
        Some(n) if n.is_finite() => n.clamp(1.0, MAX_COUNT as f64) as u32,
        _ => DEFAULT_COUNT,
    }
}

/// Render a search response as numbered plain-text results
pub fn format_results(query: &str, response: &SearchResponse) -> String {
    let web = response
        .web
        .as_ref()
        .map(|w| w.results.as_slice())
        .unwrap_or_default();
    if web.is_empty() {
        return format!("No results found for \"{}\"", query);
    }

    let mut out = format!("Search results for: \"{}\"\n\nWeb Results:\n\n", query);
    for (i, result) in web.iter().enumerate() {
        let _ = write!(
            out,
            "{}. {}\n   URL: {}\n   {}\n\n",
            i + 1,
            result.title,
            result.url,
            result.description.as_deref().unwrap_or("No description")
        );
    }

    let news = response
        .news
        .as_ref()
        .map(|n| n.results.as_slice())
        .unwrap_or_default();
    if !news.is_empty() {
        out.push_str("\nNews Results:\n\n");
        for (i, result) in news.iter().take(MAX_NEWS_RESULTS).enumerate() {
            let _ = write!(
                out,
                "{}. {}\n   Source: {}\n   {}\n\n",
                i + 1,
                result.title,
                result.source.as_deref().unwrap_or("Unknown"),
                result.description.as_deref().unwrap_or("")
            );
        }
    }

    out
}

#[async_trait]
impl Tool for BraveSearchTool {
    fn name(&self) -> &str {
        "brave_search"
    }

    fn description(&self) -> &str {
        "Search the web using Brave Search API. Get real-time, up-to-date information from the internet, including news results."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "count": {
                    "type": "number",
                    "description": "Number of results to return (default: 10, max: 20)"
                },
                "freshness": {
                    "type": "string",
                    "enum": ["pd", "pw", "pm", "py"],
                    "description": "Time filter: pd=past day, pw=past week, pm=past month, py=past year"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let count = effective_count(params.count);

        tracing::debug!(
            query = %params.query,
            count,
            freshness = params.freshness.map(Freshness::as_str).unwrap_or("none"),
            "Brave search"
        );

        let mut query = vec![
            ("q", params.query.clone()),
            ("count", count.to_string()),
        ];
        if let Some(freshness) = params.freshness {
            query.push(("freshness", freshness.as_str().to_string()));
        }

        let response = match self
            .client
            .get(BRAVE_SEARCH_URL)
            .query(&query)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Brave Search error: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Brave Search API error");
            return ToolResult::error(format!(
                "Brave Search API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            ));
        }

        match response.json::<SearchResponse>().await {
            Ok(data) => ToolResult::success(format_results(&params.query, &data)),
            Err(e) => ToolResult::error(format!("Brave Search error: {}", e)),
        }
    }
}
