use crate::llm::ToolDefinition;
use crate::tools::core::dyn_tool::DynTool;
use crate::tools::core::spec::ToolSpec;
use crate::types::ToolError;

/// Registry of the tools the routing agent may select.
///
/// Built once at startup and shared read-only afterwards. Registration order
/// is preserved so prompts list tools deterministically.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(&'static ToolSpec, Box<dyn DynTool>)>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry holding the math solver and the quiz generator
    pub fn with_default_tools() -> Self {
        use crate::tools::impls::{AskQuizQuestionTool, ShowMathsStepsTool};

        let mut registry = Self::new();
        for tool in [
            Box::new(ShowMathsStepsTool) as Box<dyn DynTool>,
            Box::new(AskQuizQuestionTool),
        ] {
            registry.tools.push((tool.spec(), tool));
        }
        registry
    }

    /// Register a tool, names must be unique
    pub fn register(&mut self, tool: Box<dyn DynTool>) -> Result<(), ToolError> {
        let spec = tool.spec();
        if self.get(spec.name).is_some() {
            return Err(ToolError::DuplicateTool(spec.name.to_string()));
        }
        self.tools.push((spec, tool));
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools
            .iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, tool)| tool.as_ref())
    }

    /// Cached specs in registration order
    pub fn specs(&self) -> impl Iterator<Item = &'static ToolSpec> + '_ {
        self.tools.iter().map(|(spec, _)| *spec)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions as sent to the decision model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.specs().map(ToolSpec::definition).collect()
    }
}
