//! Line-oriented terminal rendering of the conversation.

use std::io::Write;

use agent::Console;
use async_trait::async_trait;
use proto::ConversationEvent;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

const RULE_WIDTH: usize = 50;
const RESULT_PREVIEW_CHARS: usize = 200;

/// Welcome banner shown before the first prompt.
pub fn banner() -> String {
    format!(
        "Ollama Agent with Web Search\nType 'quit' or 'exit' to stop the conversation\n{}",
        "-".repeat(RULE_WIDTH)
    )
}

/// Renders one conversation event as terminal text.
pub fn format_event(event: &ConversationEvent) -> String {
    match event {
        ConversationEvent::IterationStarted { iteration } => {
            format!("\n--- Iteration {iteration} ---")
        }
        ConversationEvent::Thinking(text) => format!("🤔 Thinking: {text}"),
        ConversationEvent::Response(text) => format!("💬 Response: {text}"),
        ConversationEvent::ToolCallsRequested { count } => format!("🔧 Tool calls: {count}"),
        ConversationEvent::ToolCallStarted {
            index,
            tool_name,
            arguments,
        } => format!(
            "  Tool {index}: {tool_name}\n    Arguments: {}",
            Value::Object(arguments.clone())
        ),
        ConversationEvent::ToolCallFinished {
            output, is_error, ..
        } => {
            if *is_error {
                format!("    ❌ {output}")
            } else {
                format!("    Result (first 200 chars): {}...", preview(output))
            }
        }
        ConversationEvent::FinalAnswer => {
            "\n🎯 Final response received. Would you like to ask another question?".to_string()
        }
        ConversationEvent::IterationLimitReached { max_iterations } => {
            format!("\n⚠️ Maximum iterations ({max_iterations}) reached. Ending conversation.")
        }
        ConversationEvent::ModelError { message } => format!(
            "❌ Ollama API Error: {message}\n\
             Please check that Ollama is running and the model is available."
        ),
        ConversationEvent::ConversationEnded => "👋 Conversation ended.".to_string(),
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(RESULT_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// [`Console`] backed by a line reader and a writer, normally stdin/stdout.
pub struct TerminalConsole<R, W> {
    lines: Lines<R>,
    out: W,
}

impl TerminalConsole<BufReader<Stdin>, std::io::Stdout> {
    /// Console reading from stdin and writing to stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), std::io::stdout())
    }
}

impl<R, W> TerminalConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// Writes `text` followed by a newline.
    pub fn write_line(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_writer(self) -> W {
        self.out
    }
}

#[async_trait]
impl<R, W> Console for TerminalConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        self.lines.next_line().await
    }

    fn emit(&mut self, event: ConversationEvent) {
        if let Err(e) = self.write_line(&format_event(&event)) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}
