use crate::config::{DEFAULT_BIND, DEFAULT_MODEL, DEFAULT_TOOL_MODEL};
use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Serve the chat, math and quiz endpoints over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
    },

    /// Route a single request and print the normalized response
    Ask { input: String },

    /// Solve a math question step by step
    Math { question: String },

    /// Generate one multiple-choice question for a topic
    Quiz { topic: String },
}

/// Define the application arguments
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub mode: Mode,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model making the routing decision
    #[arg(short = 'm', long, default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Model used by the tools to generate structured results
    #[arg(long, default_value = DEFAULT_TOOL_MODEL, global = true)]
    pub tool_model: String,

    /// API base URL of the model service
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Retries on rate limits and server errors, per model call
    #[arg(long, default_value_t = 3, global = true)]
    pub max_retries: u32,

    /// Decision attempts per request before giving up
    #[arg(long, default_value_t = 3, global = true)]
    pub max_iterations: usize,

    /// Withhold the correct answer of quiz questions in chat responses
    #[arg(long, global = true)]
    pub redact_answers: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as Parser>::parse()
    }
}
