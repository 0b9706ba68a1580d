//! Shared protocol types for the agent runtime, tools, and CLI.
//!
//! This crate defines serializable message/event/tool structures and
//! strongly-typed error enums shared across the workspace.

pub mod error;
pub mod event;
pub mod message;
pub mod tool;

/// Re-export of all protocol error types.
pub use error::*;
/// Re-export of conversation progress events.
pub use event::ConversationEvent;
/// Re-export of conversation/message identity types.
pub use message::{Message, Role, SessionId};
/// Re-export of tool call definition and result types.
pub use tool::{FunctionCall, ToolCall, ToolDefinition, ToolResult};
