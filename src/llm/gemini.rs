use crate::llm::{types::*, utils, ApiError, LLMProvider};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<GeminiMessage>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<Value>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Parts,
}

#[derive(Debug, Serialize)]
struct Parts {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiMessage {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

/// Client for the Google Generative Language API (Gemini models)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiClient {
    pub fn default_base_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn get_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn convert_message(message: &Message) -> GeminiMessage {
        GeminiMessage {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: Some(message.content.clone()),
                ..Default::default()
            }],
        }
    }

    fn convert_request(request: LLMRequest) -> GeminiRequest {
        let structured = request.response_schema.is_some();
        GeminiRequest {
            system_instruction: (!request.system_prompt.is_empty()).then(|| SystemInstruction {
                parts: Parts {
                    text: request.system_prompt,
                },
            }),
            contents: request.messages.iter().map(Self::convert_message).collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: 8192,
                response_mime_type: if structured {
                    "application/json".to_string()
                } else {
                    "text/plain".to_string()
                },
                response_schema: request.response_schema.as_ref().map(to_gemini_schema),
            },
            tool_config: request
                .tools
                .as_ref()
                .map(|_| json!({ "function_calling_config": { "mode": "AUTO" } })),
            tools: request.tools.map(|tools| {
                vec![json!({
                    "function_declarations": tools.into_iter().map(|tool| {
                        json!({
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": to_gemini_schema(&tool.parameters),
                        })
                    }).collect::<Vec<_>>()
                })]
            }),
        }
    }

    async fn send_with_retry(
        &self,
        request: &GeminiRequest,
        request_id: u64,
    ) -> Result<LLMResponse> {
        let mut attempts = 0;

        loop {
            match self.try_send_request(request, request_id).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if utils::handle_retryable_error(
                        &e,
                        attempts,
                        self.max_retries,
                        self.retry_delay,
                    )
                    .await
                    {
                        attempts += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn try_send_request(
        &self,
        request: &GeminiRequest,
        request_id: u64,
    ) -> Result<LLMResponse> {
        trace!(
            "Sending Gemini request to {}:\n{}",
            self.model,
            serde_json::to_string_pretty(request)?
        );

        let response = self
            .client
            .post(self.get_url())
            .query(&[("key", &self.api_key)])
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        let response = utils::check_response_error(response).await?;

        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        trace!("Gemini response: {}", response_text);

        let gemini_response: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| ApiError::Unknown(format!("Failed to parse response: {e}")))?;

        Ok(convert_response(gemini_response, request_id))
    }
}

fn convert_response(response: GeminiResponse, request_id: u64) -> LLMResponse {
    let mut tool_counter = 0;
    let content = response
        .candidates
        .into_iter()
        .take(1)
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| {
            if let Some(function_call) = part.function_call {
                tool_counter += 1;
                Some(ContentBlock::ToolUse {
                    id: format!("tool-{}-{}", request_id, tool_counter),
                    name: function_call.name,
                    input: function_call.args,
                })
            } else if let Some(text) = part.text {
                if part.thought == Some(true) {
                    Some(ContentBlock::Thinking { thinking: text })
                } else {
                    Some(ContentBlock::Text { text })
                }
            } else {
                None
            }
        })
        .collect::<Vec<_>>();

    debug!("Gemini returned {} content blocks", content.len());

    LLMResponse {
        content,
        usage: response
            .usage_metadata
            .map(|usage| Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            })
            .unwrap_or_default(),
    }
}

/// Gemini expects OpenAPI style upper-case type names in schemas.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = match (key.as_str(), value) {
                        ("type", Value::String(kind)) => Value::String(kind.to_uppercase()),
                        // property names are user data, only descend into their schemas
                        ("properties", Value::Object(props)) => Value::Object(
                            props
                                .iter()
                                .map(|(name, prop)| (name.clone(), to_gemini_schema(prop)))
                                .collect(),
                        ),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl LLMProvider for GeminiClient {
    async fn send_message(&self, request: LLMRequest) -> Result<LLMResponse> {
        let request_id = request.request_id;
        let gemini_request = Self::convert_request(request);
        self.send_with_retry(&gemini_request, request_id).await
    }
}
