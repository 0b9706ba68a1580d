//! Ollama chat API provider implementation.

use async_trait::async_trait;
use proto::{LlmError, Message, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::llm::{ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::normalize::ResponseMessage;

/// Host used when neither config nor `OLLAMA_HOST` names one.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_PORT: u16 = 11434;
const BODY_PREVIEW_CHARS: usize = 200;

// ── Request types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OllamaTool<'a>>,
    think: bool,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: OllamaFunction<'a>,
}

#[derive(Debug, Serialize)]
struct OllamaFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

// ── Response types ─────────────────────────────────────────────────────────────

/// One JSON document of a chat reply; a streamed reply is several of these.
#[derive(Debug, Deserialize)]
struct OllamaChatChunk {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

// ── Provider ───────────────────────────────────────────────────────────────────

/// Ollama `/api/chat` provider.
pub struct OllamaProvider {
    client: reqwest::Client,
    host: String,
}

impl OllamaProvider {
    /// Creates a provider targeting the default local Ollama server.
    pub fn new() -> Self {
        Self::with_host(DEFAULT_OLLAMA_HOST)
    }

    /// Creates a provider targeting `host` (see [`parse_host`] for accepted forms).
    pub fn with_host(host: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: parse_host(host),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, req: ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let body = OllamaChatRequest {
            model: req.model,
            messages: req.messages,
            tools: req.tools.iter().map(convert_tool).collect(),
            think: req.think,
            stream: false,
        };

        let url = format!("{}/api/chat", self.host);
        debug!(
            model = %req.model,
            messages = %req.messages.len(),
            tools = %req.tools.len(),
            think = req.think,
            "Sending request to Ollama"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        debug!(status = %status.as_u16(), "Ollama response received");
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimit);
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or_else(|_| text.chars().take(500).collect());
            return Err(api_error(status.as_u16(), &message, req.model));
        }

        decode_chat_body(&text)
    }
}

impl OllamaProvider {
    fn send_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_connect() {
            LlmError::Connection(format!("{}: {err}", self.host))
        } else if err.is_builder() {
            LlmError::Serialization(err.to_string())
        } else {
            LlmError::Request(err.to_string())
        }
    }
}

// ── Conversion helpers ─────────────────────────────────────────────────────────

fn convert_tool(t: &ToolDefinition) -> OllamaTool<'_> {
    OllamaTool {
        kind: "function",
        function: OllamaFunction {
            name: &t.name,
            description: &t.description,
            parameters: &t.parameters,
        },
    }
}

/// Builds an API error with a remediation hint for well-known failures.
fn api_error(status: u16, message: &str, model: &str) -> LlmError {
    let lower = message.to_lowercase();
    let hint = if lower.contains("not found") && lower.contains("model") {
        format!(" Try `ollama pull {model}`.")
    } else if lower.contains("does not support tools") {
        " Pick a model with tool-calling support.".to_string()
    } else if lower.contains("does not support thinking") {
        " Re-run with --no-think.".to_string()
    } else {
        String::new()
    };
    LlmError::Api(format!("HTTP {status}: {message}{hint}"))
}

/// Decodes a chat reply body into exactly one response.
///
/// The body is read as a sequence of JSON documents. The last document that
/// carries a `message` wins; earlier ones are superseded.
fn decode_chat_body(body: &str) -> Result<ChatResponse, LlmError> {
    let mut last: Option<OllamaChatChunk> = None;
    let mut chunks = 0usize;

    for chunk in serde_json::Deserializer::from_str(body).into_iter::<OllamaChatChunk>() {
        let chunk = chunk.map_err(|e| {
            LlmError::MalformedTransport(format!(
                "{e}; body: {}",
                body.chars().take(BODY_PREVIEW_CHARS).collect::<String>()
            ))
        })?;
        chunks += 1;
        if let Some(error) = chunk.error {
            return Err(LlmError::Api(error));
        }
        if chunk.message.is_some() {
            last = Some(chunk);
        }
    }
    debug!(chunks, "Decoded chat reply");

    let chunk = last.ok_or(LlmError::NoUsableResponse)?;
    let usage = TokenUsage {
        prompt_tokens: chunk.prompt_eval_count.unwrap_or(0),
        completion_tokens: chunk.eval_count.unwrap_or(0),
    };
    Ok(ChatResponse {
        message: chunk.message.unwrap_or_default(),
        usage,
    })
}

/// Resolves an `OLLAMA_HOST`-style value into a base URL.
///
/// Accepts `host`, `host:port` and full URLs. A missing scheme means `http`
/// and a scheme-less host without port gets `11434`.
pub fn parse_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_OLLAMA_HOST.to_string();
    }
    if trimmed.contains("://") {
        return trimmed.to_string();
    }

    let (authority, path) = match trimmed.split_once('/') {
        Some((authority, path)) => (authority, format!("/{path}")),
        None => (trimmed, String::new()),
    };
    let authority = if authority.starts_with(':') {
        format!("127.0.0.1{authority}")
    } else if has_port(authority) {
        authority.to_string()
    } else {
        format!("{authority}:{DEFAULT_OLLAMA_PORT}")
    };
    format!("http://{authority}{path}")
}

fn has_port(authority: &str) -> bool {
    match authority.rsplit_once(':') {
        Some((host, port)) => {
            !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit())
                && (!host.contains(':') || host.ends_with(']'))
        }
        None => false,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
