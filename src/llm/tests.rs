use super::*;
use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

// A request as seen by the mock server
#[derive(Clone, Debug)]
struct CapturedRequest {
    path: String,
    query: HashMap<String, String>,
    body: Value,
}

#[derive(Default)]
struct MockGemini {
    requests: Mutex<Vec<CapturedRequest>>,
    responses: Mutex<VecDeque<(StatusCode, Value)>>,
}

impl MockGemini {
    fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(state): State<Arc<MockGemini>>,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().unwrap().push(CapturedRequest { path, query, body });
    state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .map(|(status, body)| (status, Json(body)))
        .unwrap_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "no more mock responses" })),
        ))
}

// Helper to create a mock server, returns its base url
async fn create_mock_server(responses: Vec<(StatusCode, Value)>) -> (String, Arc<MockGemini>) {
    let state = Arc::new(MockGemini {
        requests: Mutex::new(Vec::new()),
        responses: Mutex::new(responses.into()),
    });

    let app = Router::new()
        .route("/*path", post(handle))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn client(base_url: String) -> GeminiClient {
    GeminiClient::new("test-key".to_string(), "gemini-test".to_string(), base_url)
        .with_retry_delay(Duration::from_millis(1))
}

fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 10,
            "candidatesTokenCount": 8,
            "totalTokenCount": 18
        }
    })
}

fn weather_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_weather".to_string(),
        description: "Get current weather".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "Location" }
            },
            "required": ["location"]
        }),
    }
}

#[tokio::test]
async fn test_text_response() -> Result<()> {
    let (base_url, server) = create_mock_server(vec![(StatusCode::OK, text_reply("Paris"))]).await;
    let client = client(base_url);

    let response = client
        .send_message(LLMRequest {
            messages: vec![Message::user("What's the capital of France?")],
            system_prompt: "You are a helpful assistant.".to_string(),
            ..Default::default()
        })
        .await?;

    assert_eq!(response.content, vec![ContentBlock::new_text("Paris")]);
    assert_eq!(
        response.usage,
        Usage {
            input_tokens: 10,
            output_tokens: 8
        }
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "models/gemini-test:generateContent");
    assert_eq!(requests[0].query.get("key").map(String::as_str), Some("test-key"));
    assert_eq!(
        requests[0].body["systemInstruction"]["parts"]["text"],
        "You are a helpful assistant."
    );
    assert_eq!(requests[0].body["contents"][0]["role"], "user");
    assert_eq!(
        requests[0].body["generationConfig"]["responseMimeType"],
        "text/plain"
    );
    Ok(())
}

#[tokio::test]
async fn test_freeform_tool_directive() -> Result<()> {
    let reply = json!({
        "candidates": [{
            "content": {
                "parts": [{
                    "functionCall": { "name": "get_weather", "args": { "location": "current" } }
                }],
                "role": "model"
            }
        }]
    });
    let (base_url, server) = create_mock_server(vec![(StatusCode::OK, reply)]).await;
    let client = client(base_url);

    let reply = client
        .invoke_freeform(
            &Prompt::new("Use the weather tool.", "What's the weather?"),
            &[weather_tool()],
            0.0,
        )
        .await?;

    let directives = match reply {
        FreeformReply::ToolDirectives(directives) => directives,
        other => panic!("expected a tool directive, got {other:?}"),
    };
    assert_eq!(directives.len(), 1);
    assert_eq!(directives[0].name, "get_weather");
    assert_eq!(directives[0].args, json!({ "location": "current" }));

    let body = &server.requests()[0].body;
    let declaration = &body["tools"][0]["function_declarations"][0];
    assert_eq!(declaration["name"], "get_weather");
    assert_eq!(declaration["parameters"]["type"], "OBJECT");
    assert_eq!(
        declaration["parameters"]["properties"]["location"]["type"],
        "STRING"
    );
    assert_eq!(body["generationConfig"]["temperature"], 0.0);
    assert_eq!(body["toolConfig"]["function_calling_config"]["mode"], "AUTO");
    Ok(())
}

#[tokio::test]
async fn test_structured_invocation() -> Result<()> {
    let (base_url, server) = create_mock_server(vec![(
        StatusCode::OK,
        text_reply(r#"{"topic":"rust","choices":["a","b","c","d"]}"#),
    )])
    .await;
    let client = client(base_url);

    let schema = json!({
        "type": "object",
        "properties": { "topic": { "type": "string" } },
        "required": ["topic"]
    });
    let value = client
        .invoke_structured(&Prompt::new("Make a quiz.", "Topic: rust"), &schema, 0.5)
        .await?;

    assert_eq!(value["topic"], "rust");
    assert_eq!(value["choices"].as_array().map(Vec::len), Some(4));

    let body = &server.requests()[0].body;
    assert_eq!(
        body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    assert_eq!(body["generationConfig"]["temperature"], 0.5);
    assert!(body.get("tools").is_none());
    Ok(())
}

#[tokio::test]
async fn test_structured_invocation_accepts_uppercase_fence() -> Result<()> {
    let (base_url, _server) = create_mock_server(vec![(
        StatusCode::OK,
        text_reply("```JSON\n{\"topic\":\"rust\"}\n```"),
    )])
    .await;
    let client = client(base_url);

    let value = client
        .invoke_structured(&Prompt::new("", "Topic: rust"), &json!({ "type": "object" }), 0.5)
        .await?;

    assert_eq!(value, json!({ "topic": "rust" }));
    Ok(())
}

#[tokio::test]
async fn test_structured_invocation_rejects_non_json() {
    let (base_url, _server) =
        create_mock_server(vec![(StatusCode::OK, text_reply("not json at all"))]).await;
    let client = client(base_url);

    let error = client
        .invoke_structured(&Prompt::new("", "x"), &json!({ "type": "object" }), 0.0)
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<InvocationError>(),
        Some(InvocationError::MalformedJson(_))
    ));
}

#[tokio::test]
async fn test_retries_transient_server_errors() -> Result<()> {
    let (base_url, server) = create_mock_server(vec![
        (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": "overloaded" })),
        (StatusCode::TOO_MANY_REQUESTS, json!({ "error": "slow down" })),
        (StatusCode::OK, text_reply("Hello")),
    ])
    .await;
    let client = client(base_url);

    let response = client
        .send_message(LLMRequest {
            messages: vec![Message::user("Hi")],
            ..Default::default()
        })
        .await?;

    assert_eq!(response.text(), "Hello");
    assert_eq!(server.requests().len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let (base_url, server) = create_mock_server(vec![
        (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
    ])
    .await;
    let client = client(base_url).with_max_retries(1);

    let error = client
        .send_message(LLMRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::ServiceError(_))
    ));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (base_url, server) = create_mock_server(vec![
        (StatusCode::BAD_REQUEST, json!({ "error": "bad schema" })),
        (StatusCode::OK, text_reply("unreachable")),
    ])
    .await;
    let client = client(base_url);

    let error = client
        .send_message(LLMRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::InvalidRequest(_))
    ));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_thinking_only_reply_is_empty() -> Result<()> {
    let reply = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "hmm", "thought": true }], "role": "model" }
        }]
    });
    let (base_url, _server) = create_mock_server(vec![(StatusCode::OK, reply)]).await;
    let client = client(base_url);

    let reply = client
        .invoke_freeform(&Prompt::new("", "Hi"), &[], 0.0)
        .await?;
    assert_eq!(reply, FreeformReply::Empty);
    Ok(())
}
