use super::spec::ToolSpec;
use crate::llm::LLMProvider;
use crate::normalizer::NormalizedResponse;
use crate::types::ToolError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Sampling settings for the tool models
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    /// Math solutions must be reproducible
    pub math_temperature: f32,
    /// Some variety in question phrasing across calls
    pub quiz_temperature: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            math_temperature: 0.0,
            quiz_temperature: 0.5,
        }
    }
}

/// Context provided to tools during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Model used by tools to produce structured results
    pub model: Arc<dyn LLMProvider>,
    pub settings: ToolSettings,
}

impl ToolContext {
    pub fn new(model: Arc<dyn LLMProvider>, settings: ToolSettings) -> Self {
        Self { model, settings }
    }
}

/// Core trait for tools, defining the execution interface
#[async_trait::async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Input type for this tool, must be deserializable from JSON
    type Input: DeserializeOwned + Send;

    /// Output type for this tool, serialized to produce the tool's result string
    type Output: Serialize + DeserializeOwned + Send;

    /// Get the metadata for this tool, built once per tool type
    fn spec(&self) -> &'static ToolSpec;

    /// Execute the tool with the given context and input
    async fn execute(
        &self,
        context: &ToolContext,
        input: Self::Input,
    ) -> Result<Self::Output, ToolError>;

    /// Wrap a parsed output for presentation
    fn into_response(output: Self::Output) -> NormalizedResponse;
}
