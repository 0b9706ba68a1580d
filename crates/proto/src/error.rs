use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading/validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Terminal read/write failure.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// LLM provider errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// The model service answered but rejected the call (missing model,
    /// malformed request, server-side failure).
    #[error("{0}")]
    Api(String),

    /// Provider throttled the request.
    #[error("Rate limit exceeded")]
    RateLimit,

    /// The request could not be completed (timeout, protocol error).
    #[error("Request failed: {0}")]
    Request(String),

    /// The model service could not be reached at all.
    #[error("Failed to connect to model service: {0}")]
    Connection(String),

    /// The transport produced chunks but none of them carried a message.
    #[error("No chunk with a message was produced by the model service")]
    NoUsableResponse,

    /// The transport result could not be iterated as response documents.
    #[error("Unexpected response shape from model service: {0}")]
    MalformedTransport(String),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LlmError {
    /// Returns `true` for API-level failures that end the conversation loop
    /// but not the process.
    pub fn ends_conversation_only(&self) -> bool {
        matches!(self, Self::Api(_) | Self::RateLimit | Self::Request(_))
    }
}

/// Tool execution errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Network-level failure reaching the tool backend.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Tool exceeded allowed execution time.
    #[error("Timeout after {0}s")]
    Timeout(u64),

    /// Tool call arguments are invalid.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Tool operation failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Internal proto errors
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Invalid role string value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),
}
