use crate::llm::Prompt;
use crate::normalizer::NormalizedResponse;
use crate::schema::{Field, FieldKind, MathSolution, SchemaSpec};
use crate::tools::core::{generate_structured, Tool, ToolContext, ToolSpec};
use crate::types::ToolError;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

pub const MATH_STEPS_TOOL: &str = "showMathsStepsTool";

const SYSTEM_PROMPT: &str = concat!(
    "You solve math problems step-by-step.\n",
    "Do exact calculations, no hand-wavy arithmetic. Number the steps 1, 2, 3, ... in order.\n",
    "Return ONLY valid JSON that matches the provided schema."
);

// Input type for the showMathsStepsTool tool
#[derive(Debug, Deserialize, Serialize)]
pub struct MathStepsInput {
    pub question: String,
}

pub struct ShowMathsStepsTool;

#[async_trait::async_trait]
impl Tool for ShowMathsStepsTool {
    type Input = MathStepsInput;
    type Output = MathSolution;

    fn spec(&self) -> &'static ToolSpec {
        static SPEC: OnceLock<ToolSpec> = OnceLock::new();
        SPEC.get_or_init(|| ToolSpec {
            name: MATH_STEPS_TOOL,
            description: "Takes a math question and returns a structured, numbered solution with optional bullet substeps.",
            input_schema: SchemaSpec::new(vec![Field::required(
                "question",
                "The exact math question to solve.",
                FieldKind::non_empty_string(),
            )]),
            output_schema: MathSolution::schema(),
            routing_hint: "step-by-step math, solving equations or derivations",
            example_request: Some("Show me the steps to solve 2x + 3 = 11"),
        })
    }

    async fn execute(
        &self,
        context: &ToolContext,
        input: Self::Input,
    ) -> Result<Self::Output, ToolError> {
        let question = input.question.trim();
        if question.is_empty() {
            return Err(ToolError::invalid_args(MATH_STEPS_TOOL, "question must not be empty"));
        }

        let spec = Tool::spec(self);
        let prompt = Prompt::new(SYSTEM_PROMPT, format!("Question: {question}"));
        let solution: MathSolution = generate_structured(
            context,
            spec.name,
            &prompt,
            &spec.output_schema,
            context.settings.math_temperature,
        )
        .await?;

        for issue in solution.step_numbering_issues() {
            warn!(
                "Step {} is numbered {}, expected {}",
                issue.position + 1,
                issue.found,
                issue.expected
            );
        }

        Ok(solution)
    }

    fn into_response(output: Self::Output) -> NormalizedResponse {
        NormalizedResponse::MathSteps(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMProvider;
    use crate::schema::SchemaViolation;
    use crate::tests::mocks::{create_test_response_text, MockLLMProvider};
    use crate::tools::core::{DynTool, ToolSettings};
    use serde_json::json;
    use std::sync::Arc;

    fn solution_json(step_numbers: &[u32]) -> String {
        let steps: Vec<_> = step_numbers
            .iter()
            .map(|n| json!({ "stepNumber": n, "explanation": format!("step {n}") }))
            .collect();
        json!({ "question": "2x + 3 = 11", "steps": steps, "finalAnswer": "x = 4" }).to_string()
    }

    fn context(mock: &MockLLMProvider) -> ToolContext {
        ToolContext::new(
            Arc::new(mock.clone()) as Arc<dyn LLMProvider>,
            ToolSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_solves_with_deterministic_structured_request() {
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&solution_json(&[1, 2])))]);

        let solution = ShowMathsStepsTool
            .execute(
                &context(&mock),
                MathStepsInput {
                    question: "Solve 2x + 3 = 11".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(solution.final_answer, "x = 4");
        assert_eq!(solution.steps.len(), 2);

        let requests = mock.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.0);
        assert!(requests[0].response_schema.is_some());
        assert!(requests[0].tools.is_none());
        assert_eq!(
            requests[0].messages[0].content,
            "Question: Solve 2x + 3 = 11"
        );
    }

    #[tokio::test]
    async fn test_empty_question_fails_before_model_call() {
        let mock = MockLLMProvider::new(vec![]);

        let error = ShowMathsStepsTool
            .invoke(&context(&mock), &json!({ "question": "" }))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::InvalidArgs { .. }));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_question_fails_before_model_call() {
        let mock = MockLLMProvider::new(vec![]);

        let error = ShowMathsStepsTool
            .invoke(&context(&mock), &json!({ "topic": "algebra" }))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::InvalidArgs { .. }));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_steps_is_a_schema_failure() {
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&solution_json(&[])))]);

        let error = ShowMathsStepsTool
            .invoke(&context(&mock), &json!({ "question": "1 + 1" }))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::Schema { .. }), "{error:?}");
    }

    #[tokio::test]
    async fn test_oversized_step_number_is_a_schema_failure() {
        let reply = json!({
            "question": "1 + 1",
            "steps": [{ "stepNumber": 4_294_967_296_u64, "explanation": "1 + 1 = 2" }],
            "finalAnswer": "2"
        });
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&reply.to_string()))]);

        let error = ShowMathsStepsTool
            .invoke(&context(&mock), &json!({ "question": "1 + 1" }))
            .await
            .unwrap_err();

        assert!(
            matches!(
                error,
                ToolError::Schema {
                    violation: SchemaViolation::OutOfRange { .. },
                    ..
                }
            ),
            "{error:?}"
        );
    }

    #[tokio::test]
    async fn test_model_failure_is_not_retried() {
        let mock = MockLLMProvider::new(vec![
            Err(anyhow::anyhow!("quota exhausted")),
            Ok(create_test_response_text(&solution_json(&[1]))),
        ]);

        let error = ShowMathsStepsTool
            .invoke(&context(&mock), &json!({ "question": "1 + 1" }))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::Execution { .. }));
        assert!(error.to_string().contains("quota exhausted"));
        assert_eq!(mock.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_misnumbered_steps_are_kept_in_order() {
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&solution_json(&[1, 3, 2])))]);

        let raw = ShowMathsStepsTool
            .invoke(&context(&mock), &json!({ "question": "1 + 1" }))
            .await
            .unwrap();

        let solution: MathSolution = serde_json::from_str(&raw).unwrap();
        let numbers: Vec<u32> = solution.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 3, 2]);
    }

    #[test]
    fn test_parse_output_round_trip() {
        let raw = solution_json(&[1, 2]);
        let solution = match ShowMathsStepsTool.parse_output(&raw) {
            Some(NormalizedResponse::MathSteps(solution)) => solution,
            other => panic!("expected math steps, got {other:?}"),
        };
        assert_eq!(
            serde_json::to_value(&solution).unwrap(),
            serde_json::from_str::<serde_json::Value>(&raw).unwrap()
        );
    }
}
