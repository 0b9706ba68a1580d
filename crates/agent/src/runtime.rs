//! Conversation loop: model invocation, tool dispatch, and termination.

use std::sync::Arc;

use proto::{ConversationEvent, Message, SessionId, ToolCall, ToolDefinition};
use tracing::{debug, info, warn};

use crate::{
    console::Console,
    llm::{ChatRequest, LlmProvider, TokenUsage},
    normalize::normalize_message,
    tool_registry::ToolRegistry,
};

/// Question used when the first prompt is answered with blank input.
pub const DEFAULT_QUESTION: &str = "what are the latest developments in AI?";
/// Model invocations allowed per user question.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const INITIAL_PROMPT: &str = "Enter your question (or press Enter for default): ";
pub const FOLLOW_UP_PROMPT: &str = "\nEnter your next question (or 'quit'/'exit' to stop): ";
const QUIT_TOKENS: [&str; 4] = ["quit", "exit", "q", ""];

/// Why a conversation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user entered a quit token.
    UserQuit,
    /// Input reached end-of-file.
    InputClosed,
    /// The safety cutoff was hit while the model kept calling tools.
    IterationLimit,
    /// The model service rejected a call.
    ModelError(String),
}

/// States of the conversation loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    AwaitingUserInput,
    InvokingModel,
    DispatchingTools(Vec<ToolCall>),
    AwaitingContinuation,
    Terminated(SessionOutcome),
}

/// History and iteration counter of one interactive session.
#[derive(Debug, Clone)]
pub struct Conversation {
    history: Vec<Message>,
    iteration: usize,
    max_iterations: usize,
    usage: TokenUsage,
}

impl Conversation {
    /// Creates an empty conversation bounded by `max_iterations` model calls
    /// per question.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            history: Vec::new(),
            iteration: 0,
            max_iterations,
            usage: TokenUsage::default(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Model invocations made for the current question.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Token usage accumulated for the current question.
    pub fn usage(&self) -> &TokenUsage {
        &self.usage
    }

    /// Appends a user question and starts a fresh iteration budget.
    pub fn submit_question(&mut self, text: impl Into<String>) {
        self.history.push(Message::user(text));
        self.iteration = 0;
        self.usage = TokenUsage::default();
    }

    fn begin_iteration(&mut self) -> usize {
        self.iteration += 1;
        self.iteration
    }

    fn limit_reached(&self) -> bool {
        self.iteration >= self.max_iterations
    }

    fn push(&mut self, message: Message) {
        self.history.push(message);
    }
}

/// Returns the trimmed question, or [`DEFAULT_QUESTION`] when blank.
pub fn resolve_question(raw: &str) -> String {
    match raw.trim() {
        "" => DEFAULT_QUESTION.to_string(),
        question => question.to_string(),
    }
}

/// Returns true when follow-up input asks to end the conversation.
pub fn is_quit_token(input: &str) -> bool {
    let token = input.trim().to_lowercase();
    QUIT_TOKENS.contains(&token.as_str())
}

/// Drives the model/tool loop for one interactive session.
pub struct AgentRuntime {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    tool_defs: Vec<ToolDefinition>,
    model: String,
    think: bool,
    max_iterations: usize,
    session_id: SessionId,
}

impl AgentRuntime {
    /// Creates a runtime with reasoning enabled.
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
        max_iterations: usize,
    ) -> Self {
        let tool_defs = tools.definitions();
        Self {
            llm,
            tools,
            tool_defs,
            model: model.into(),
            think: true,
            max_iterations,
            session_id: SessionId::new(),
        }
    }

    /// Enables or disables the model's reasoning output.
    pub fn with_think(mut self, think: bool) -> Self {
        self.think = think;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Creates an empty conversation bounded by this runtime's cutoff.
    pub fn new_conversation(&self) -> Conversation {
        Conversation::new(self.max_iterations)
    }

    /// Runs the conversation until it terminates.
    ///
    /// With `initial_question` the first prompt is skipped. API-level model
    /// failures end the conversation with [`SessionOutcome::ModelError`];
    /// connection and transport failures are returned as errors.
    pub async fn run(
        &self,
        console: &mut dyn Console,
        initial_question: Option<&str>,
    ) -> Result<SessionOutcome, proto::Error> {
        info!(
            session = %self.session_id,
            model = %self.model,
            max_iterations = self.max_iterations,
            "Conversation started"
        );

        let mut conversation = self.new_conversation();
        let mut state = match initial_question {
            Some(question) => {
                conversation.submit_question(resolve_question(question));
                LoopState::InvokingModel
            }
            None => LoopState::AwaitingUserInput,
        };

        loop {
            if let LoopState::Terminated(outcome) = state {
                info!(
                    session = %self.session_id,
                    outcome = ?outcome,
                    messages = conversation.history().len(),
                    "Conversation finished"
                );
                return Ok(outcome);
            }
            state = self.step(state, &mut conversation, console).await?;
        }
    }

    /// Performs exactly one state transition.
    pub async fn step(
        &self,
        state: LoopState,
        conversation: &mut Conversation,
        console: &mut dyn Console,
    ) -> Result<LoopState, proto::Error> {
        match state {
            LoopState::AwaitingUserInput => {
                let Some(line) = console.read_line(INITIAL_PROMPT).await? else {
                    return Ok(LoopState::Terminated(SessionOutcome::InputClosed));
                };
                conversation.submit_question(resolve_question(&line));
                Ok(LoopState::InvokingModel)
            }
            LoopState::InvokingModel => self.invoke_model(conversation, console).await,
            LoopState::DispatchingTools(calls) => {
                Ok(self.dispatch_tools(&calls, conversation, console).await)
            }
            LoopState::AwaitingContinuation => {
                let outcome = match console.read_line(FOLLOW_UP_PROMPT).await? {
                    None => SessionOutcome::InputClosed,
                    Some(line) if is_quit_token(&line) => SessionOutcome::UserQuit,
                    Some(line) => {
                        conversation.submit_question(line.trim());
                        return Ok(LoopState::InvokingModel);
                    }
                };
                console.emit(ConversationEvent::ConversationEnded);
                Ok(LoopState::Terminated(outcome))
            }
            terminated @ LoopState::Terminated(_) => Ok(terminated),
        }
    }

    async fn invoke_model(
        &self,
        conversation: &mut Conversation,
        console: &mut dyn Console,
    ) -> Result<LoopState, proto::Error> {
        let iteration = conversation.begin_iteration();
        console.emit(ConversationEvent::IterationStarted { iteration });

        let req = ChatRequest {
            model: &self.model,
            messages: conversation.history(),
            tools: &self.tool_defs,
            think: self.think,
        };
        debug!("LLM call (iteration {iteration}) for session {}", self.session_id);
        let t0 = std::time::Instant::now();
        let response = self.llm.chat(req).await;
        debug!(elapsed_ms = %t0.elapsed().as_millis(), iteration, "LLM response received");

        let response = match response {
            Ok(response) => response,
            Err(e) if e.ends_conversation_only() => {
                warn!(iteration, error = %e, "Model call rejected; ending conversation");
                let message = e.to_string();
                console.emit(ConversationEvent::ModelError {
                    message: message.clone(),
                });
                return Ok(LoopState::Terminated(SessionOutcome::ModelError(message)));
            }
            Err(e) => return Err(e.into()),
        };

        conversation.usage.add(&response.usage);
        if let Some(thinking) = response.message.thinking_text() {
            console.emit(ConversationEvent::Thinking(thinking.to_string()));
        }
        if let Some(content) = response.message.content_text() {
            console.emit(ConversationEvent::Response(content.to_string()));
        }

        let message = normalize_message(response.message);
        let calls = message.requested_tools().to_vec();
        conversation.push(message);

        if calls.is_empty() {
            info!(
                iteration,
                prompt_tokens = conversation.usage.prompt_tokens,
                completion_tokens = conversation.usage.completion_tokens,
                "Final answer received"
            );
            console.emit(ConversationEvent::FinalAnswer);
            return Ok(LoopState::AwaitingContinuation);
        }

        debug!(
            "Tool calls requested: {:?}",
            calls.iter().map(|tc| tc.name()).collect::<Vec<_>>()
        );
        console.emit(ConversationEvent::ToolCallsRequested { count: calls.len() });
        Ok(LoopState::DispatchingTools(calls))
    }

    async fn dispatch_tools(
        &self,
        calls: &[ToolCall],
        conversation: &mut Conversation,
        console: &mut dyn Console,
    ) -> LoopState {
        for (i, call) in calls.iter().enumerate() {
            console.emit(ConversationEvent::ToolCallStarted {
                index: i + 1,
                tool_name: call.name().to_string(),
                arguments: call.arguments().clone(),
            });

            let result = self.tools.execute(call).await;

            console.emit(ConversationEvent::ToolCallFinished {
                tool_name: result.tool_name.clone(),
                output: result.output.clone(),
                is_error: result.is_error,
            });
            conversation.push(result.into_message());
        }

        if conversation.limit_reached() {
            warn!(
                "Max iterations ({}) reached for session {}",
                conversation.max_iterations(),
                self.session_id
            );
            console.emit(ConversationEvent::IterationLimitReached {
                max_iterations: conversation.max_iterations(),
            });
            return LoopState::Terminated(SessionOutcome::IterationLimit);
        }
        LoopState::InvokingModel
    }
}
