use crate::agent::{AgentSettings, RoutingAgent};
use crate::config::{Config, ConfigError};
use crate::llm::{GeminiClient, LLMProvider};
use crate::normalizer::{normalize, NormalizedResponse};
use crate::schema::{MathSolution, QuizQuestion};
use crate::tools::impls::{MathStepsInput, QuizQuestionInput};
use crate::tools::{AskQuizQuestionTool, ShowMathsStepsTool, Tool, ToolContext, ToolRegistry, ToolSettings};
use crate::types::{AgentError, ToolError};
use std::sync::Arc;
use tracing::info;

/// Everything a request needs, built once at startup and shared read-only.
pub struct Engine {
    agent: RoutingAgent,
    registry: Arc<ToolRegistry>,
    tool_context: ToolContext,
}

impl Engine {
    pub fn new(
        decision_model: Arc<dyn LLMProvider>,
        tool_model: Arc<dyn LLMProvider>,
        agent_settings: AgentSettings,
        tool_settings: ToolSettings,
    ) -> Self {
        let registry = Arc::new(ToolRegistry::with_default_tools());
        let tool_context = ToolContext::new(tool_model, tool_settings);
        let agent = RoutingAgent::new(
            decision_model,
            registry.clone(),
            tool_context.clone(),
            agent_settings,
        );
        Self {
            agent,
            registry,
            tool_context,
        }
    }

    /// Build Gemini-backed models from the configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;

        let client = |model: &str| {
            Arc::new(
                GeminiClient::new(api_key.to_string(), model.to_string(), config.base_url.clone())
                    .with_max_retries(config.max_retries),
            ) as Arc<dyn LLMProvider>
        };

        info!(
            "Routing with {}, tools use {}",
            config.model, config.tool_model
        );
        Ok(Self::new(
            client(&config.model),
            client(&config.tool_model),
            config.agent,
            config.tools,
        ))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Route a chat request and normalize the outcome
    pub async fn route(&self, input: &str) -> Result<NormalizedResponse, AgentError> {
        let result = self.agent.invoke(input).await?;
        Ok(normalize(&result, &self.registry))
    }

    /// Run the math solver directly, bypassing the routing decision
    pub async fn solve_math(&self, question: &str) -> Result<MathSolution, ToolError> {
        ShowMathsStepsTool
            .execute(
                &self.tool_context,
                MathStepsInput {
                    question: question.to_string(),
                },
            )
            .await
    }

    /// Run the quiz generator directly, bypassing the routing decision
    pub async fn generate_quiz(&self, topic: &str) -> Result<QuizQuestion, ToolError> {
        AskQuizQuestionTool
            .execute(
                &self.tool_context,
                QuizQuestionInput {
                    topic: topic.to_string(),
                },
            )
            .await
    }
}
