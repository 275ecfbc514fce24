//! HTTP request boundary for chat routing and the two direct tool endpoints.

mod error;

pub use error::{ErrorBody, HttpError};

use crate::config::ConfigError;
use crate::engine::Engine;
use crate::normalizer::NormalizedResponse;
use crate::schema::MathSolution;
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Shared by all handlers, built once before the listener starts
#[derive(Clone)]
pub struct AppState {
    /// `None` when no credential is configured
    pub engine: Option<Arc<Engine>>,
    /// Strip `correctIndex` from quiz questions in chat responses
    pub redact_quiz_answers: bool,
}

impl AppState {
    pub fn new(engine: Option<Arc<Engine>>, redact_quiz_answers: bool) -> Self {
        Self {
            engine,
            redact_quiz_answers,
        }
    }

    fn engine(&self) -> Result<&Engine, HttpError> {
        self.engine
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential.into())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MathRequest {
    pub question: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizRequest {
    pub topic: Option<String>,
}

/// Quiz question as returned by the quiz endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub question: String,
    pub choices: Vec<String>,
    pub correct_index: u8,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/math", post(math))
        .route("/api/quiz", post(quiz))
        .with_state(state)
}

/// Serve until ctrl-c
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

// A field counts as missing when absent, null or blank
fn required(field: Option<String>, name: &str) -> Result<String, HttpError> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| HttpError::missing_field(name))
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<NormalizedResponse>, HttpError> {
    let Json(request) = body?;
    let input = required(request.input, "input")?;
    let engine = state.engine()?;

    let response = engine.route(&input).await?;
    info!("Chat answered via {}", response.used_tool());

    if state.redact_quiz_answers {
        Ok(Json(response.redact_answers()))
    } else {
        Ok(Json(response))
    }
}

async fn math(
    State(state): State<AppState>,
    body: Result<Json<MathRequest>, JsonRejection>,
) -> Result<Json<MathSolution>, HttpError> {
    let Json(request) = body?;
    let question = required(request.question, "question")?;
    let engine = state.engine()?;

    Ok(Json(engine.solve_math(&question).await?))
}

async fn quiz(
    State(state): State<AppState>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, HttpError> {
    let Json(request) = body?;
    let topic = required(request.topic, "topic")?;
    let engine = state.engine()?;

    let quiz = engine.generate_quiz(&topic).await?;
    Ok(Json(QuizResponse {
        question: quiz.question,
        choices: quiz.choices,
        correct_index: quiz.correct_index,
    }))
}
