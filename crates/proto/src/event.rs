use serde_json::{Map, Value};

/// Progress events emitted by the conversation loop.
///
/// The runtime never writes to the terminal itself; a console consumes
/// these events and decides how to render them.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    /// A model invocation is about to start (1-based within the question).
    IterationStarted { iteration: usize },
    /// Reasoning text returned by the model.
    Thinking(String),
    /// Answer text returned by the model.
    Response(String),
    /// The model requested `count` tool calls in this turn.
    ToolCallsRequested { count: usize },
    /// Tool call number `index` (1-based) is being dispatched.
    ToolCallStarted {
        index: usize,
        tool_name: String,
        arguments: Map<String, Value>,
    },
    /// A tool call produced output or failed.
    ToolCallFinished {
        tool_name: String,
        output: String,
        is_error: bool,
    },
    /// The model answered without requesting tools.
    FinalAnswer,
    /// The safety cutoff ended the conversation.
    IterationLimitReached { max_iterations: usize },
    /// The model service rejected a call; the conversation ends.
    ModelError { message: String },
    /// The user chose to stop.
    ConversationEnded,
}
