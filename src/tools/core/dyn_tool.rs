use super::spec::ToolSpec;
use super::tool::{Tool, ToolContext};
use crate::normalizer::NormalizedResponse;
use crate::schema::validate;
use crate::types::ToolError;
use serde_json::Value;
use tracing::debug;

/// Type-erased tool interface for storing heterogeneous tools in collections
#[async_trait::async_trait]
pub trait DynTool: Send + Sync + 'static {
    /// Get the static metadata for this tool
    fn spec(&self) -> &'static ToolSpec;

    /// Invoke the tool with JSON parameters, returning the serialized result
    async fn invoke(&self, context: &ToolContext, params: &Value) -> Result<String, ToolError>;

    /// Parse a serialized result back into its presentation form
    fn parse_output(&self, raw: &str) -> Option<NormalizedResponse>;
}

/// Automatic implementation of DynTool for any type that implements Tool
#[async_trait::async_trait]
impl<T: Tool> DynTool for T {
    fn spec(&self) -> &'static ToolSpec {
        Tool::spec(self)
    }

    async fn invoke(&self, context: &ToolContext, params: &Value) -> Result<String, ToolError> {
        let spec = Tool::spec(self);

        // Shape check first, nothing reaches the model with bad arguments
        let accepted = validate(&spec.input_schema, params)
            .map_err(|violation| ToolError::invalid_args(spec.name, violation))?;
        let input: T::Input = serde_json::from_value(accepted)
            .map_err(|e| ToolError::invalid_args(spec.name, e))?;

        let output = self.execute(context, input).await?;

        serde_json::to_string(&output).map_err(|e| ToolError::execution(spec.name, e))
    }

    fn parse_output(&self, raw: &str) -> Option<NormalizedResponse> {
        let spec = Tool::spec(self);
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!("{} output is not JSON: {}", spec.name, e);
                return None;
            }
        };
        let accepted = match validate(&spec.output_schema, &value) {
            Ok(accepted) => accepted,
            Err(violation) => {
                debug!("{} output does not match its schema: {}", spec.name, violation);
                return None;
            }
        };
        serde_json::from_value::<T::Output>(accepted)
            .ok()
            .map(T::into_response)
    }
}
