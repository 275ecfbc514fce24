use crate::llm::{ContentBlock, LLMProvider, LLMRequest, Message, ToolDefinition};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// A system instruction plus the user turn
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// A model's request to run one tool with the given arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDirective {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// What a freeform invocation produced
#[derive(Debug, Clone, PartialEq)]
pub enum FreeformReply {
    /// Plain answer, no tool requested
    Text(String),
    /// One or more tool selections, in emitted order
    ToolDirectives(Vec<ToolDirective>),
    /// Neither text nor a directive (e.g. only thinking)
    Empty,
}

#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("Model returned no structured output")]
    NoStructuredOutput,

    #[error("Model output is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// Narrow model interface consumed by tools and the routing agent
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Ask for a value conforming to `schema`. The value is not validated here.
    async fn invoke_structured(
        &self,
        prompt: &Prompt,
        schema: &Value,
        temperature: f32,
    ) -> Result<Value>;

    /// Ask for either a plain answer or a tool selection among `tools`.
    async fn invoke_freeform(
        &self,
        prompt: &Prompt,
        tools: &[ToolDefinition],
        temperature: f32,
    ) -> Result<FreeformReply>;
}

#[async_trait]
impl<T: LLMProvider + ?Sized> ModelClient for T {
    async fn invoke_structured(
        &self,
        prompt: &Prompt,
        schema: &Value,
        temperature: f32,
    ) -> Result<Value> {
        let request = LLMRequest {
            messages: vec![Message::user(prompt.user.clone())],
            system_prompt: prompt.system.clone(),
            tools: None,
            temperature,
            response_schema: Some(schema.clone()),
            request_id: next_request_id(),
        };

        let response = self.send_message(request).await?;
        let text = response.text();
        let json_text = strip_code_fence(&text);
        if json_text.is_empty() {
            return Err(InvocationError::NoStructuredOutput.into());
        }

        let value = serde_json::from_str(json_text).map_err(InvocationError::from)?;
        Ok(value)
    }

    async fn invoke_freeform(
        &self,
        prompt: &Prompt,
        tools: &[ToolDefinition],
        temperature: f32,
    ) -> Result<FreeformReply> {
        let request_id = next_request_id();
        let request = LLMRequest {
            messages: vec![Message::user(prompt.user.clone())],
            system_prompt: prompt.system.clone(),
            tools: (!tools.is_empty()).then(|| tools.to_vec()),
            temperature,
            response_schema: None,
            request_id,
        };

        let response = self.send_message(request).await?;

        let directives: Vec<ToolDirective> = response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolDirective {
                    id: id.clone(),
                    name: name.clone(),
                    args: input.clone(),
                }),
                _ => None,
            })
            .collect();

        if !directives.is_empty() {
            let text = response.text();
            if !text.trim().is_empty() {
                debug!("Ignoring text emitted alongside tool directive: {}", text);
            }
            return Ok(FreeformReply::ToolDirectives(directives));
        }

        let text = response.text().trim().to_string();
        if text.is_empty() {
            warn!("Model reply for request {} had no usable content", request_id);
            Ok(FreeformReply::Empty)
        } else {
            Ok(FreeformReply::Text(text))
        }
    }
}

/// Some models wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Language tag in any case, `json` may also be glued to the payload
    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let (tag, body) = rest.split_at(tag_len);
    let rest = if tag.eq_ignore_ascii_case("json") || body.starts_with(['\n', '\r']) {
        body
    } else {
        rest
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
