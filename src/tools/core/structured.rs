use super::tool::ToolContext;
use crate::llm::{ModelClient, Prompt};
use crate::schema::{validate, SchemaSpec};
use crate::types::ToolError;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Ask the tool model for a payload matching `schema` and accept it only if it validates.
///
/// Retrying is left to the model client; a failure here fails the tool.
pub async fn generate_structured<T: DeserializeOwned>(
    context: &ToolContext,
    tool: &str,
    prompt: &Prompt,
    schema: &SchemaSpec,
    temperature: f32,
) -> Result<T, ToolError> {
    debug!("{} invoking model at temperature {}", tool, temperature);

    let candidate = context
        .model
        .invoke_structured(prompt, &schema.to_json_schema(), temperature)
        .await
        .map_err(|e| ToolError::execution(tool, e))?;

    let accepted = validate(schema, &candidate).map_err(|violation| ToolError::Schema {
        tool: tool.to_string(),
        violation,
    })?;

    serde_json::from_value(accepted).map_err(|e| ToolError::execution(tool, e))
}
