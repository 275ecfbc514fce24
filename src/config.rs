use crate::agent::AgentSettings;
use crate::cli::Args;
use crate::llm::GeminiClient;
use crate::tools::ToolSettings;

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TOOL_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing GOOGLE_API_KEY")]
    MissingCredential,

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Settings resolved once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when no credential is configured; only model-backed operations fail then
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub tool_model: String,
    pub max_retries: u32,
    pub agent: AgentSettings,
    pub tools: ToolSettings,
    pub redact_quiz_answers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GeminiClient::default_base_url(),
            model: DEFAULT_MODEL.to_string(),
            tool_model: DEFAULT_TOOL_MODEL.to_string(),
            max_retries: 3,
            agent: AgentSettings::default(),
            tools: ToolSettings::default(),
            redact_quiz_answers: false,
        }
    }
}

impl Config {
    /// Combine command line arguments with the credential from the environment.
    /// Expects `.env` to be loaded already.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Self::from_args_with_key(args, std::env::var(API_KEY_ENV).ok())
    }

    pub fn from_args_with_key(args: &Args, api_key: Option<String>) -> Result<Self, ConfigError> {
        if args.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max-iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if args.model.trim().is_empty() || args.tool_model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "model",
                reason: "model names must not be empty".to_string(),
            });
        }

        let defaults = Self::default();
        Ok(Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: args
                .base_url
                .clone()
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: args.model.clone(),
            tool_model: args.tool_model.clone(),
            max_retries: args.max_retries,
            agent: AgentSettings {
                max_iterations: args.max_iterations,
                ..defaults.agent
            },
            tools: defaults.tools,
            redact_quiz_answers: args.redact_answers,
        })
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingCredential)
    }
}
