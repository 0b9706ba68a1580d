//! `web_fetch` tool.

use async_trait::async_trait;
use proto::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{OllamaWebClient, Tool, parse_args};

#[derive(Debug, Deserialize)]
struct WebFetchArgs {
    url: String,
}

#[derive(Debug, Serialize)]
struct WebFetchRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct WebFetchResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    links: Vec<String>,
}

/// Fetches a single web page and returns its readable content.
pub struct WebFetchTool {
    client: OllamaWebClient,
}

impl WebFetchTool {
    pub fn new(client: OllamaWebClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebFetchTool {
    fn name(&self) -> &str {
        "web_fetch"
    }

    fn description(&self) -> &str {
        "Fetch a web page by URL and return its title, main text content and outgoing links."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the page to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<String, ToolError> {
        let args: WebFetchArgs = parse_args(args)?;
        let url = args.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::InvalidArgs(format!(
                "url must start with http:// or https://, got '{url}'"
            )));
        }

        debug!(url = %url, "Fetching web page");
        let page: WebFetchResponse = self
            .client
            .post_json("/api/web_fetch", &WebFetchRequest { url })
            .await?;

        Ok(format_page(url, &page))
    }
}

fn format_page(url: &str, page: &WebFetchResponse) -> String {
    let mut out = format!("Title: {}\nURL: {url}\n\n{}", page.title, page.content.trim());
    if !page.links.is_empty() {
        out.push_str("\n\nLinks:");
        for link in &page.links {
            out.push_str("\n- ");
            out.push_str(link);
        }
    }
    out
}
