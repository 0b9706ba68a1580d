//! HTTP client for the Ollama hosted web API.

use std::time::Duration;

use proto::ToolError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default base URL of the hosted web API.
pub const DEFAULT_WEB_BASE_URL: &str = "https://ollama.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ERROR_PREVIEW_CHARS: usize = 300;

/// Authenticated client shared by the web tools.
#[derive(Debug, Clone)]
pub struct OllamaWebClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

impl OllamaWebClient {
    /// Creates a client targeting the default hosted API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_WEB_BASE_URL)
    }

    /// Creates a client targeting a custom base URL (useful for proxies/tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON reply.
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ToolError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if self.api_key.trim().is_empty() {
            return Err(ToolError::ExecutionFailed(
                "OLLAMA_API_KEY is not set; web tools require an ollama.com API key".to_string(),
            ));
        }

        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, timeout_secs = self.timeout_secs, "Calling web API");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!(status = %status.as_u16(), bytes = text.len(), "Web API response received");

        if !status.is_success() {
            let preview: String = text.chars().take(ERROR_PREVIEW_CHARS).collect();
            return Err(ToolError::ExecutionFailed(format!("HTTP {status}: {preview}")));
        }

        serde_json::from_str(&text)
            .map_err(|e| ToolError::ExecutionFailed(format!("invalid response body: {e}")))
    }

    fn transport_error(&self, err: reqwest::Error) -> ToolError {
        if err.is_timeout() {
            ToolError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            ToolError::Connection(err.to_string())
        } else {
            ToolError::ExecutionFailed(err.to_string())
        }
    }
}
