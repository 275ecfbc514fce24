use crate::schema::SchemaViolation;
use serde::Serialize;
use serde_json::{Map, Value};

/// Record of the single tool call made while handling a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_name: String,
    pub tool_args: Map<String, Value>,
    /// Serialized tool result, exactly as the tool returned it
    pub raw_observation: String,
}

/// Outcome of one routing decision: either a direct answer or one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum AgentInvocationResult {
    Direct { output: String },
    Tool(ToolInvocation),
}

impl AgentInvocationResult {
    pub fn direct_output(&self) -> Option<&str> {
        match self {
            AgentInvocationResult::Direct { output } => Some(output),
            AgentInvocationResult::Tool(_) => None,
        }
    }

    pub fn selected_tool(&self) -> Option<&ToolInvocation> {
        match self {
            AgentInvocationResult::Direct { .. } => None,
            AgentInvocationResult::Tool(invocation) => Some(invocation),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArgs { tool: String, reason: String },

    #[error("{tool} produced output violating its schema: {violation}")]
    Schema {
        tool: String,
        violation: SchemaViolation,
    },

    #[error("{tool} failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ToolError {
    pub fn invalid_args(tool: &str, reason: impl ToString) -> Self {
        ToolError::InvalidArgs {
            tool: tool.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn execution(tool: &str, source: impl Into<anyhow::Error>) -> Self {
        ToolError::Execution {
            tool: tool.to_string(),
            source: source.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Input must not be empty")]
    EmptyInput,

    #[error("Routing decision failed: {0}")]
    DecisionFailed(#[source] anyhow::Error),

    #[error("Model selected unregistered tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidToolArgs { tool: String, reason: String },

    #[error("Tool execution failed: {0}")]
    ToolExecution(#[source] ToolError),

    #[error("No routing decision after {0} attempts")]
    RoutingExhausted(usize),
}

impl From<ToolError> for AgentError {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::UnknownTool(name) => AgentError::UnknownTool(name),
            ToolError::InvalidArgs { tool, reason } => AgentError::InvalidToolArgs { tool, reason },
            other => AgentError::ToolExecution(other),
        }
    }
}
