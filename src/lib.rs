//! Routes a free-text request to a math solver, a quiz generator or a direct
//! model answer, and normalizes the outcome into one response shape.

pub mod agent;
pub mod cli;
pub mod config;
pub mod engine;
pub mod llm;
pub mod logging;
pub mod normalizer;
pub mod schema;
pub mod server;
pub mod tools;
pub mod types;


pub use engine::Engine;
pub use normalizer::{normalize, NormalizedResponse};
pub use types::{AgentError, AgentInvocationResult, ToolError, ToolInvocation};
