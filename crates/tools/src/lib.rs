//! Tool trait and the built-in web tools.
//!
//! The agent runtime only sees tools through [`Tool`]; the web tools here are
//! thin clients of the Ollama hosted web API.

pub mod web_client;
pub mod web_fetch;
pub mod web_search;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use web_client::{DEFAULT_WEB_BASE_URL, OllamaWebClient};
pub use web_fetch::WebFetchTool;
pub use web_search::WebSearchTool;

use async_trait::async_trait;
use proto::ToolError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name exposed to the LLM.
    fn name(&self) -> &str;
    /// Human-readable description for tool selection.
    fn description(&self) -> &str;
    /// JSON schema for accepted tool arguments.
    fn parameters_schema(&self) -> Value;
    /// Executes the tool with the model-supplied named arguments.
    async fn execute(&self, args: &Map<String, Value>) -> Result<String, ToolError>;
}

/// Deserializes named tool arguments into a typed argument struct.
pub(crate) fn parse_args<T: DeserializeOwned>(args: &Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| ToolError::InvalidArgs(e.to_string()))
}
