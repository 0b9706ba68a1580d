//! LLM provider abstraction.

use async_trait::async_trait;
use proto::{LlmError, Message, ToolDefinition};

use crate::normalize::ResponseMessage;

/// Request to the LLM
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    /// Target model id.
    pub model: &'a str,
    /// Full conversation history.
    pub messages: &'a [Message],
    /// Available tools schema.
    pub tools: &'a [ToolDefinition],
    /// Whether the model should return its reasoning text.
    pub think: bool,
}

/// Token usage reported by the LLM for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Number of tokens in the prompt / input.
    pub prompt_tokens: u32,
    /// Number of tokens in the generated output.
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Accumulates another usage record into this one.
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// One complete response from the LLM.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Raw message as produced by the model.
    pub message: ResponseMessage,
    /// Token accounting for this call.
    pub usage: TokenUsage,
}

/// LLM provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends the full history and returns exactly one complete response.
    async fn chat(&self, req: ChatRequest<'_>) -> Result<ChatResponse, LlmError>;
}
