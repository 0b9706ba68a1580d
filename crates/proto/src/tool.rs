use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// Function name and arguments of a requested tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Registered tool name the model wants to invoke.
    pub name: String,
    /// Named arguments, passed through to the tool unvalidated.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// A tool invocation requested by the model.
///
/// Serializes as `{"function": {"name": ..., "arguments": {...}}}`, the shape
/// the chat API expects when history is replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

impl ToolCall {
    /// Builds a tool call; non-object `arguments` become an empty argument map.
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> &Map<String, Value> {
        &self.function.arguments
    }
}

/// Tool schema advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description used for tool selection.
    pub description: String,
    /// JSON schema of accepted arguments.
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Outcome of one dispatched tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Tool the call was addressed to (also for unknown tools).
    pub tool_name: String,
    /// Text handed back to the model.
    pub output: String,
    /// Whether `output` describes a failure.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            output: output.into(),
            is_error: false,
        }
    }

    /// Creates a failed tool result.
    pub fn error(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            output: output.into(),
            is_error: true,
        }
    }

    /// Wraps the result into the tool-role history message.
    pub fn into_message(self) -> Message {
        Message::tool_result(self.tool_name, self.output)
    }
}
