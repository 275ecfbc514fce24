//! LLM integration module providing abstraction over model providers
//!
//! This module implements:
//! - Common interface for LLM interactions via the LLMProvider trait
//! - The narrow structured/freeform invocation interface used by tools and the agent
//! - A Gemini provider implementation

#[cfg(test)]
mod tests;

mod client;
mod utils;

pub mod gemini;
pub mod types;

pub use client::{FreeformReply, InvocationError, ModelClient, Prompt, ToolDirective};
pub use gemini::GeminiClient;
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for different LLM provider implementations
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Sends a request to the LLM service
    async fn send_message(&self, request: LLMRequest) -> Result<LLMResponse>;
}
