//! Fetch URL tool - GET a page and return it as plain text

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::constants::tools::MAX_TOOL_TEXT_CHARS;
use crate::tools::registry::Tool;
use crate::tools::truncation::take_chars;
use crate::tools::{parse_params, ToolContext, ToolResult};

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").unwrap());
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b.*?</style>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub struct FetchUrlTool {
    client: reqwest::Client,
}

impl FetchUrlTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct Params {
    url: String,
}

/// Drop scripts, styles and tags, then collapse whitespace
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn parse_http_url(raw: &str) -> Result<Url, ToolResult> {
    let url = Url::parse(raw)
        .map_err(|e| ToolResult::invalid_parameters(format!("invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolResult::invalid_parameters(format!(
            "unsupported URL scheme '{}', expected http or https",
            other
        ))),
    }
}

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &str {
        "fetch_url"
    }

    fn description(&self) -> &str {
        "Fetch more detailed content from a URL and convert it to plain text. Useful for reading web pages, documentation, or API responses."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch"
                }
            },
            "required": ["url"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };
        let url = match parse_http_url(&params.url) {
            Ok(u) => u,
            Err(e) => return e,
        };

        tracing::debug!(url = %url, "Fetching URL");

        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::error(format!("Error fetching URL: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "fetch_url HTTP error");
            return ToolResult::error(format!(
                "Error: HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return ToolResult::error(format!("Error fetching URL: {}", e)),
        };

        let text = if content_type.contains("application/json") {
            match serde_json::from_str::<Value>(&body) {
                Ok(json) => serde_json::to_string_pretty(&json).unwrap_or(body),
                Err(e) => {
                    return ToolResult::error(format!("Error fetching URL: invalid JSON: {}", e))
                }
            }
        } else {
            html_to_text(&body)
        };

        tracing::debug!(url = %url, chars = text.chars().count(), "Fetched URL");
        ToolResult::success(take_chars(&text, MAX_TOOL_TEXT_CHARS))
    }
}
