//! Conversion of raw model messages into replayable history entries.

use proto::{Message, Role, ToolCall};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Message as returned by the chat API, every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default)]
    pub tool_name: Option<String>,
}

/// Tool call as returned by the chat API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireToolCall {
    pub function: WireFunction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireFunction {
    pub name: String,
    /// Usually an object; some servers send a JSON-encoded string.
    #[serde(default)]
    pub arguments: Value,
}

impl ResponseMessage {
    /// Non-empty reasoning text, if any.
    pub fn thinking_text(&self) -> Option<&str> {
        self.thinking.as_deref().filter(|t| !t.is_empty())
    }

    /// Non-empty answer text, if any.
    pub fn content_text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// Converts a model response message into a history [`Message`].
///
/// Absent or empty optional fields stay absent; `content` falls back to the
/// empty string and `role` to `assistant`.
pub fn normalize_message(raw: ResponseMessage) -> Message {
    let role = raw
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or(Role::Assistant);

    let tool_calls = raw
        .tool_calls
        .filter(|calls| !calls.is_empty())
        .map(|calls| calls.into_iter().map(convert_tool_call).collect());

    Message {
        role,
        content: raw.content.unwrap_or_default(),
        thinking: raw.thinking.filter(|t| !t.is_empty()),
        tool_calls,
        tool_name: raw.tool_name.filter(|n| !n.is_empty()),
    }
}

fn convert_tool_call(call: WireToolCall) -> ToolCall {
    let arguments = parse_tool_arguments(call.function.arguments);
    ToolCall::new(call.function.name, Value::Object(arguments))
}

/// Normalizes tool call arguments into an object, with empty-object fallback.
fn parse_tool_arguments(arguments: Value) -> Map<String, Value> {
    match arguments {
        Value::Object(map) => map,
        Value::String(raw) => match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}
