use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use super::config::AiClientConfig;
use crate::ai::error::AiError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for an OpenAI-compatible chat/completions endpoint
#[derive(Debug, Clone)]
pub struct AiClient {
    config: AiClientConfig,
    http: reqwest::Client,
}

impl AiClient {
    pub fn new(config: AiClientConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AiClientConfig {
        &self.config
    }

    pub(super) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        self.http
            .post(url)
            .headers(headers)
            .bearer_auth(&self.config.api_key)
    }
}
