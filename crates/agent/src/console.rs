//! Terminal seam between the conversation loop and its user.

use async_trait::async_trait;
use proto::ConversationEvent;

/// Line-oriented user interface driven by [`AgentRuntime`](crate::AgentRuntime).
#[async_trait]
pub trait Console: Send {
    /// Shows `prompt` and reads one line. `Ok(None)` means end of input.
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Renders a progress event.
    fn emit(&mut self, event: ConversationEvent);
}
