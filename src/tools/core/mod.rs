// Core tools implementation
pub mod dyn_tool;
pub mod registry;
pub mod spec;
pub mod structured;
pub mod tool;

// Re-export all core components for easier imports
pub use dyn_tool::DynTool;
pub use registry::ToolRegistry;
pub use spec::ToolSpec;
pub use structured::generate_structured;
pub use tool::{Tool, ToolContext, ToolSettings};
