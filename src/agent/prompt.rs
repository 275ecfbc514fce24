use crate::tools::ToolRegistry;
use std::fmt::Write;

const PREAMBLE: &str = "You are a routing assistant. You may call AT MOST ONE tool.";

/// Build the decision prompt from the registered tools.
///
/// Each tool contributes its description to the tool list, its routing hint to
/// the rules and its sample request to the examples. The direct-answer rule and
/// example always come last.
pub(super) fn decision_prompt(registry: &ToolRegistry) -> String {
    let mut prompt = String::from(PREAMBLE);

    prompt.push_str("\n\nTOOLS:\n");
    for spec in registry.specs() {
        let _ = writeln!(prompt, "- {}: {}", spec.name, spec.description);
    }

    prompt.push_str("\nROUTING RULES:\n");
    for spec in registry.specs() {
        let _ = writeln!(
            prompt,
            "- If the user asks for {} -> call {}.",
            spec.routing_hint, spec.name
        );
    }
    prompt.push_str("- Otherwise, answer directly without any tool.\n");
    prompt.push_str("- Never call more than one tool.\n");

    prompt.push_str("\nEXAMPLES:\n");
    for spec in registry.specs() {
        if let Some(example) = spec.example_request {
            let _ = writeln!(prompt, "User: \"{}\"\nAssistant: (call {})\n", example, spec.name);
        }
    }
    prompt.push_str("User: \"What's the capital of France?\"\nAssistant: (answer directly)");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{MATH_STEPS_TOOL, QUIZ_QUESTION_TOOL};

    #[test]
    fn test_prompt_lists_every_tool() {
        let prompt = decision_prompt(&ToolRegistry::with_default_tools());

        assert!(prompt.starts_with(PREAMBLE));
        assert!(prompt.contains(&format!("- {MATH_STEPS_TOOL}: Takes a math question")));
        assert!(prompt.contains(&format!("- {QUIZ_QUESTION_TOOL}: Create one multiple-choice")));
        assert!(prompt.contains("Assistant: (call askQuizQuestionTool)"));
        assert!(prompt.ends_with("Assistant: (answer directly)"));
    }

    #[test]
    fn test_empty_registry_only_allows_direct_answers() {
        let prompt = decision_prompt(&ToolRegistry::new());
        assert!(!prompt.contains("(call "));
        assert!(prompt.contains("answer directly without any tool"));
    }
}
