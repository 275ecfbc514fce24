// Trait-based tools implementation
pub mod core;
pub mod impls;


pub use self::core::{DynTool, Tool, ToolContext, ToolRegistry, ToolSettings, ToolSpec};
pub use impls::{AskQuizQuestionTool, ShowMathsStepsTool, MATH_STEPS_TOOL, QUIZ_QUESTION_TOOL};
