// Tool implementations
pub mod math_steps;
pub mod quiz_question;

// Re-export all tools for registration
pub use math_steps::{MathStepsInput, ShowMathsStepsTool, MATH_STEPS_TOOL};
pub use quiz_question::{AskQuizQuestionTool, QuizQuestionInput, QUIZ_QUESTION_TOOL};
