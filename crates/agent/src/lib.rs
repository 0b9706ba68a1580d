//! Conversation loop, model adapter, and tool dispatch.

pub mod console;
pub mod llm;
pub mod normalize;
pub mod ollama;
pub mod runtime;
pub mod tool_registry;

/// Terminal seam used by the conversation loop.
pub use console::Console;
/// Chat request/response models and provider interface.
pub use llm::{ChatRequest, ChatResponse, LlmProvider, TokenUsage};
/// Response message normalization.
pub use normalize::{ResponseMessage, normalize_message};
/// Ollama chat API provider.
pub use ollama::{DEFAULT_OLLAMA_HOST, OllamaProvider};
/// Main conversation state machine.
pub use runtime::{
    AgentRuntime, Conversation, DEFAULT_MAX_ITERATIONS, LoopState, SessionOutcome,
};
/// Runtime tool registry.
pub use tool_registry::ToolRegistry;
