use super::prompt::decision_prompt;
use crate::llm::{FreeformReply, LLMProvider, ModelClient, Prompt, ToolDefinition, ToolDirective};
use crate::tools::{ToolContext, ToolRegistry};
use crate::types::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

const EMPTY_REPLY_NUDGE: &str =
    "Your previous reply was empty. Either answer directly or call exactly one tool.";

/// Limits for a single routing decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSettings {
    /// Upper bound on decision exchanges with the model per request
    pub max_iterations: usize,
    pub temperature: f32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            temperature: 0.0,
        }
    }
}

/// Lifecycle of one `invoke` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Deciding,
    DirectAnswer,
    ToolSelected,
    ToolExecuting,
    ToolComplete,
    Done,
}

/// Tracks the state of one invocation and traces every transition
struct StateTrace {
    request: u64,
    state: AgentState,
}

impl StateTrace {
    fn new(request: u64) -> Self {
        Self {
            request,
            state: AgentState::Idle,
        }
    }

    fn advance(&mut self, next: AgentState) {
        debug!("Request {}: {:?} -> {:?}", self.request, self.state, next);
        self.state = next;
    }
}

/// Decides per request between a direct answer and exactly one tool call.
///
/// Immutable after construction and safe to share across concurrent
/// requests. No conversation state is kept between calls.
pub struct RoutingAgent {
    model: Arc<dyn LLMProvider>,
    registry: Arc<ToolRegistry>,
    tool_context: ToolContext,
    settings: AgentSettings,
    system_prompt: String,
    tool_definitions: Vec<ToolDefinition>,
}

impl RoutingAgent {
    pub fn new(
        model: Arc<dyn LLMProvider>,
        registry: Arc<ToolRegistry>,
        tool_context: ToolContext,
        settings: AgentSettings,
    ) -> Self {
        let system_prompt = decision_prompt(&registry);
        let tool_definitions = registry.definitions();
        Self {
            model,
            registry,
            tool_context,
            settings,
            system_prompt,
            tool_definitions,
        }
    }

    /// Route a user request and run at most one tool.
    pub async fn invoke(&self, input: &str) -> Result<AgentInvocationResult, AgentError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::EmptyInput);
        }

        let mut trace = StateTrace::new(next_invocation_id());
        let mut user_text = input.to_string();

        for iteration in 1..=self.settings.max_iterations {
            trace.advance(AgentState::Deciding);

            let prompt = Prompt::new(self.system_prompt.clone(), user_text.clone());
            let reply = self
                .model
                .invoke_freeform(&prompt, &self.tool_definitions, self.settings.temperature)
                .await
                .map_err(AgentError::DecisionFailed)?;

            match reply {
                FreeformReply::Text(output) => {
                    trace.advance(AgentState::DirectAnswer);
                    trace.advance(AgentState::Done);
                    info!("Answered directly");
                    return Ok(AgentInvocationResult::Direct { output });
                }
                FreeformReply::ToolDirectives(directives) => {
                    return self.run_directive(directives, &mut trace).await;
                }
                FreeformReply::Empty => {
                    warn!(
                        "Decision {} of {} produced no answer and no tool call",
                        iteration, self.settings.max_iterations
                    );
                    user_text = format!("{input}\n\n{EMPTY_REPLY_NUDGE}");
                }
            }
        }

        Err(AgentError::RoutingExhausted(self.settings.max_iterations))
    }

    async fn run_directive(
        &self,
        directives: Vec<ToolDirective>,
        trace: &mut StateTrace,
    ) -> Result<AgentInvocationResult, AgentError> {
        let mut directives = directives.into_iter();
        let Some(directive) = directives.next() else {
            return Err(AgentError::RoutingExhausted(self.settings.max_iterations));
        };
        let dropped: Vec<String> = directives.map(|d| d.name).collect();
        if !dropped.is_empty() {
            warn!(
                "Model requested {} additional tool call(s), ignoring: {}",
                dropped.len(),
                dropped.join(", ")
            );
        }

        let tool = self
            .registry
            .get(&directive.name)
            .ok_or_else(|| AgentError::UnknownTool(directive.name.clone()))?;

        let tool_args = match &directive.args {
            serde_json::Value::Object(map) => map.clone(),
            other => {
                return Err(AgentError::InvalidToolArgs {
                    tool: directive.name,
                    reason: format!("arguments must be an object, got {other}"),
                })
            }
        };

        trace.advance(AgentState::ToolSelected);
        info!("Selected tool {} ({})", directive.name, directive.id);

        trace.advance(AgentState::ToolExecuting);
        let raw_observation = tool
            .invoke(&self.tool_context, &directive.args)
            .await
            .map_err(AgentError::from)?;
        trace.advance(AgentState::ToolComplete);
        trace.advance(AgentState::Done);

        Ok(AgentInvocationResult::Tool(ToolInvocation {
            tool_name: directive.name,
            tool_args,
            raw_observation,
        }))
    }
}

fn next_invocation_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
