//! `web_search` tool.

use async_trait::async_trait;
use proto::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{OllamaWebClient, Tool, parse_args};

const DEFAULT_MAX_RESULTS: u32 = 3;
const MAX_RESULTS_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WebSearchRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Searches the web and returns titled result snippets.
pub struct WebSearchTool {
    client: OllamaWebClient,
}

impl WebSearchTool {
    pub fn new(client: OllamaWebClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns result titles, URLs and \
         content snippets. Use web_fetch afterwards to read a full page."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 3, max: 10)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let args: WebSearchArgs = parse_args(args)?;
        let query = args.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidArgs("query must not be empty".to_string()));
        }
        let max_results = args
            .max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, MAX_RESULTS_LIMIT);

        debug!(query = %query, max_results, "Running web search");
        let response: WebSearchResponse = self
            .client
            .post_json("/api/web_search", &WebSearchRequest { query, max_results })
            .await?;

        Ok(format_results(query, &response.results))
    }
}

fn format_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for '{query}'");
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   {}",
                i + 1,
                hit.title,
                hit.url,
                hit.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn hit(title: &str, url: &str, content: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn metadata_is_stable() {
        let tool = WebSearchTool::new(OllamaWebClient::new("k"));
        assert_eq!(tool.name(), "web_search");
        assert!(tool.description().contains("Search the web"));
        assert_eq!(tool.parameters_schema()["required"][0], "query");
    }

    #[test]
    fn format_results_numbers_hits() {
        let out = format_results(
            "rust",
            &[
                hit("Rust", "https://rust-lang.org", " A language "),
                hit("Crates", "https://crates.io", "Registry"),
            ],
        );
        assert_eq!(
            out,
            "1. Rust\n   URL: https://rust-lang.org\n   A language\n\n\
             2. Crates\n   URL: https://crates.io\n   Registry"
        );
    }

    #[test]
    fn format_results_reports_empty_result_set() {
        assert_eq!(format_results("zzz", &[]), "No results found for 'zzz'");
    }

    #[tokio::test]
    async fn execute_rejects_blank_query() {
        let tool = WebSearchTool::new(OllamaWebClient::new("k"));
        let args = serde_json::json!({"query": "   "});
        let err = tool
            .execute(args.as_object().expect("object"))
            .await
            .expect_err("blank query");
        assert!(matches!(err, ToolError::InvalidArgs(_)));
    }

    #[tokio::test]
    async fn execute_rejects_missing_query() {
        let tool = WebSearchTool::new(OllamaWebClient::new("k"));
        let err = tool.execute(&Map::new()).await.expect_err("no query");
        assert!(matches!(err, ToolError::InvalidArgs(_)));
    }

    #[tokio::test]
    async fn execute_posts_query_and_formats_results() {
        let (base_url, request) = serve_once(
            200,
            r#"{"results":[{"title":"Ollama","url":"https://ollama.com","content":"Run models"}]}"#,
        )
        .await;
        let tool = WebSearchTool::new(OllamaWebClient::with_base_url("key", base_url));

        let args = serde_json::json!({"query": "ollama", "max_results": 50});
        let out = tool
            .execute(args.as_object().expect("object"))
            .await
            .expect("search should succeed");
        assert_eq!(out, "1. Ollama\n   URL: https://ollama.com\n   Run models");

        let request = request.await.expect("server task");
        assert!(request.head.starts_with("POST /api/web_search "));
        let sent: Value = serde_json::from_str(&request.body).expect("json body");
        assert_eq!(sent, serde_json::json!({"query": "ollama", "max_results": 10}));
    }
}
