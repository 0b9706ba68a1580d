//! Tool registry used by the runtime to list and execute tools.

use std::collections::BTreeMap;
use std::sync::Arc;

use proto::{ToolCall, ToolDefinition, ToolResult};
use tools::Tool;
use tracing::{debug, warn};

/// Upper bound on the characters of tool output stored in history.
pub const MAX_TOOL_RESULT_CHARS: usize = 8000;
const UNNAMED_TOOL: &str = "unknown";

/// Registry of available tools
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        debug!("Registering tool: {name}");
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get tool definitions for the LLM, ordered by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.parameters_schema()))
            .collect()
    }

    /// Executes one tool call. Never fails: unknown tools and tool errors
    /// come back as error results, and all output is bounded by
    /// [`MAX_TOOL_RESULT_CHARS`].
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let name = match call.name() {
            name if name.trim().is_empty() => UNNAMED_TOOL,
            name => name,
        };

        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Model requested an unknown tool");
            return ToolResult::error(name, truncate_chars(&format!("Tool {name} not found")));
        };

        debug!(tool = %name, args = ?call.arguments(), "Executing tool");
        match tool.execute(call.arguments()).await {
            Ok(output) => ToolResult::success(name, truncate_chars(&output)),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                ToolResult::error(
                    name,
                    truncate_chars(&format!("Error executing tool {name}: {e}")),
                )
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Cuts `text` to at most [`MAX_TOOL_RESULT_CHARS`] characters.
fn truncate_chars(text: &str) -> String {
    match text.char_indices().nth(MAX_TOOL_RESULT_CHARS) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use proto::ToolError;
    use serde_json::{Map, Value};

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the input"
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({
                "type":"object",
                "properties":{"value":{"type":"string"}},
                "required":["value"]
            })
        }

        async fn execute(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
            Ok(args["value"].as_str().unwrap_or_default().to_string())
        }
    }

    struct TimeoutTool;

    #[async_trait]
    impl Tool for TimeoutTool {
        fn name(&self) -> &str {
            "web_search"
        }

        fn description(&self) -> &str {
            "Always times out"
        }

        fn parameters_schema(&self) -> Value {
            serde_json::json!({"type":"object"})
        }

        async fn execute(&self, _args: &Map<String, Value>) -> Result<String, ToolError> {
            Err(ToolError::Timeout(30))
        }
    }

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall::new(name, args)
    }

    #[tokio::test]
    async fn register_and_execute_known_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry
            .execute(&call("echo", serde_json::json!({"value":"hello"})))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output, "hello");
        assert_eq!(result.tool_name, "echo");
    }

    #[tokio::test]
    async fn execute_unknown_tool_returns_error() {
        let registry = ToolRegistry::new();
        let result = registry
            .execute(&call("translate", serde_json::json!({})))
            .await;
        assert!(result.is_error);
        assert_eq!(result.output, "Tool translate not found");
        assert_eq!(result.tool_name, "translate");
    }

    #[tokio::test]
    async fn execute_blank_tool_name_keeps_a_tool_name() {
        let registry = ToolRegistry::new();
        let result = registry.execute(&call("  ", serde_json::json!({}))).await;
        assert!(result.is_error);
        assert_eq!(result.tool_name, UNNAMED_TOOL);
    }

    #[tokio::test]
    async fn execute_tool_failure_is_captured() {
        let mut registry = ToolRegistry::new();
        registry.register(TimeoutTool);

        let result = registry
            .execute(&call("web_search", serde_json::json!({"query":"x"})))
            .await;
        assert!(result.is_error);
        assert_eq!(result.tool_name, "web_search");
        assert_eq!(result.output, "Error executing tool web_search: Timeout after 30s");
    }

    #[tokio::test]
    async fn execute_truncates_long_output() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let long = "é".repeat(MAX_TOOL_RESULT_CHARS + 500);
        let result = registry
            .execute(&call("echo", serde_json::json!({ "value": long })))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.output.chars().count(), MAX_TOOL_RESULT_CHARS);
    }

    #[test]
    fn truncate_chars_keeps_short_text_and_exact_boundary() {
        assert_eq!(truncate_chars("short"), "short");
        let exact = "a".repeat(MAX_TOOL_RESULT_CHARS);
        assert_eq!(truncate_chars(&exact), exact);
    }

    #[tokio::test]
    async fn execute_requires_exact_tool_name() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry
            .execute(&call(" echo ", serde_json::json!({"value":"hello"})))
            .await;
        assert!(result.is_error);
        assert_eq!(result.tool_name, " echo ");
        assert_eq!(result.output, "Tool  echo  not found");

        let result = registry
            .execute(&call("Echo", serde_json::json!({"value":"hello"})))
            .await;
        assert!(result.is_error);
        assert_eq!(result.output, "Tool Echo not found");
    }

    #[test]
    fn definitions_are_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(TimeoutTool);
        registry.register(EchoTool);

        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].description, "Echoes the input");
        assert_eq!(defs[0].parameters["required"][0], "value");
        assert_eq!(defs[1].name, "web_search");
    }
}
