use crate::llm::ToolDefinition;
use crate::schema::SchemaSpec;

/// Metadata and argument/result shapes of a tool
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Unique name of the tool
    pub name: &'static str,
    /// Detailed description of what the tool does
    pub description: &'static str,
    /// Shape of the arguments the tool accepts
    pub input_schema: SchemaSpec,
    /// Shape of the payload the tool returns
    pub output_schema: SchemaSpec,
    /// Kind of request this tool should be picked for, used in the routing rules
    pub routing_hint: &'static str,
    /// A sample request that should route to this tool
    pub example_request: Option<&'static str>,
}

impl ToolSpec {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: self.input_schema.to_json_schema(),
        }
    }
}
