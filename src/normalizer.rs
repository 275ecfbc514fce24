//! Maps an agent outcome into the single response shape sent to callers.

use crate::schema::{MathSolution, QuizPrompt, QuizQuestion};
use crate::tools::{ToolRegistry, MATH_STEPS_TOOL, QUIZ_QUESTION_TOOL};
use crate::types::AgentInvocationResult;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::debug;

pub const DIRECT: &str = "direct";

/// Response for the presentation layer, one variant per tool plus direct answers
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    Direct(String),
    MathSteps(MathSolution),
    Quiz(QuizQuestion),
    /// A quiz question with its answer withheld
    QuizPrompt(QuizPrompt),
    /// Tool output that could not be parsed into its payload
    Raw { tool_name: String, text: String },
}

impl NormalizedResponse {
    /// `"direct"` or the name of the tool that produced the output
    pub fn used_tool(&self) -> &str {
        match self {
            NormalizedResponse::Direct(_) => DIRECT,
            NormalizedResponse::MathSteps(_) => MATH_STEPS_TOOL,
            NormalizedResponse::Quiz(_) | NormalizedResponse::QuizPrompt(_) => QUIZ_QUESTION_TOOL,
            NormalizedResponse::Raw { tool_name, .. } => tool_name,
        }
    }

    /// Same response with any quiz answer removed
    pub fn redact_answers(self) -> Self {
        match self {
            NormalizedResponse::Quiz(quiz) => NormalizedResponse::QuizPrompt(quiz.redacted()),
            other => other,
        }
    }
}

impl Serialize for NormalizedResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NormalizedResponse", 2)?;
        state.serialize_field("usedTool", self.used_tool())?;
        match self {
            NormalizedResponse::Direct(text) | NormalizedResponse::Raw { text, .. } => {
                state.serialize_field("output", text)?
            }
            NormalizedResponse::MathSteps(solution) => state.serialize_field("output", solution)?,
            NormalizedResponse::Quiz(quiz) => state.serialize_field("output", quiz)?,
            NormalizedResponse::QuizPrompt(prompt) => state.serialize_field("output", prompt)?,
        }
        state.end()
    }
}

/// Turn an agent outcome into a response.
///
/// Never fails: tool output that does not parse as its tool's payload is
/// passed through as raw text.
pub fn normalize(result: &AgentInvocationResult, registry: &ToolRegistry) -> NormalizedResponse {
    match result {
        AgentInvocationResult::Direct { output } => NormalizedResponse::Direct(output.clone()),
        AgentInvocationResult::Tool(invocation) => registry
            .get(&invocation.tool_name)
            .and_then(|tool| tool.parse_output(&invocation.raw_observation))
            .unwrap_or_else(|| {
                debug!(
                    "Passing through raw output of {}",
                    invocation.tool_name
                );
                NormalizedResponse::Raw {
                    tool_name: invocation.tool_name.clone(),
                    text: invocation.raw_observation.clone(),
                }
            }),
    }
}
