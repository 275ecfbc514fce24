use crate::llm::Prompt;
use crate::normalizer::NormalizedResponse;
use crate::schema::{Field, FieldKind, QuizQuestion, SchemaSpec};
use crate::tools::core::{generate_structured, Tool, ToolContext, ToolSpec};
use crate::types::ToolError;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const QUIZ_QUESTION_TOOL: &str = "askQuizQuestionTool";

const SYSTEM_PROMPT: &str = concat!(
    "You create exactly ONE multiple-choice question (4 choices) for the given topic.\n",
    "Return ONLY JSON matching the schema.\n",
    "Do not include explanations, just the fields.\n",
    "Ensure exactly four choices and a correctIndex inside 0-3."
);

// Input type for the askQuizQuestionTool tool
#[derive(Debug, Deserialize, Serialize)]
pub struct QuizQuestionInput {
    pub topic: String,
}

/// Generates one multiple-choice question.
///
/// The result always carries `correctIndex`; hiding it from the person taking
/// the quiz happens at the presentation boundary.
pub struct AskQuizQuestionTool;

#[async_trait::async_trait]
impl Tool for AskQuizQuestionTool {
    type Input = QuizQuestionInput;
    type Output = QuizQuestion;

    fn spec(&self) -> &'static ToolSpec {
        static SPEC: OnceLock<ToolSpec> = OnceLock::new();
        SPEC.get_or_init(|| ToolSpec {
            name: QUIZ_QUESTION_TOOL,
            description: "Create one multiple-choice question (4 choices) for a given topic. Mark the correct choice in the JSON but do NOT reveal it to the user.",
            input_schema: SchemaSpec::new(vec![Field::required(
                "topic",
                "The subject or topic to generate the question about.",
                FieldKind::non_empty_string(),
            )]),
            output_schema: QuizQuestion::schema(),
            routing_hint: "a multiple-choice question, quiz or test (\"quiz me on ...\")",
            example_request: Some("Can you quiz me on the water cycle?"),
        })
    }

    async fn execute(
        &self,
        context: &ToolContext,
        input: Self::Input,
    ) -> Result<Self::Output, ToolError> {
        let topic = input.topic.trim();
        if topic.is_empty() {
            return Err(ToolError::invalid_args(QUIZ_QUESTION_TOOL, "topic must not be empty"));
        }

        let spec = Tool::spec(self);
        let prompt = Prompt::new(SYSTEM_PROMPT, format!("Topic: {topic}"));
        generate_structured(
            context,
            spec.name,
            &prompt,
            &spec.output_schema,
            context.settings.quiz_temperature,
        )
        .await
    }

    fn into_response(output: Self::Output) -> NormalizedResponse {
        NormalizedResponse::Quiz(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMProvider;
    use crate::tests::mocks::{create_test_response_text, MockLLMProvider};
    use crate::tools::core::{DynTool, ToolSettings};
    use serde_json::json;
    use std::sync::Arc;

    fn context(mock: &MockLLMProvider) -> ToolContext {
        ToolContext::new(
            Arc::new(mock.clone()) as Arc<dyn LLMProvider>,
            ToolSettings::default(),
        )
    }

    fn quiz_reply(choices: serde_json::Value, correct_index: i64) -> String {
        json!({
            "topic": "the water cycle",
            "question": "What drives evaporation?",
            "choices": choices,
            "correctIndex": correct_index
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_result_keeps_correct_index() {
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&quiz_reply(
            json!(["The sun", "The moon", "Wind", "Gravity"]),
            0,
        )))]);

        let raw = AskQuizQuestionTool
            .invoke(&context(&mock), &json!({ "topic": "the water cycle" }))
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["correctIndex"], 0);
        assert_eq!(value["choices"].as_array().map(Vec::len), Some(4));

        let requests = mock.get_requests();
        assert_eq!(requests[0].temperature, 0.5);
        assert_eq!(requests[0].system_prompt, SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_rejects_three_choices() {
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&quiz_reply(
            json!(["a", "b", "c"]),
            1,
        )))]);

        let error = AskQuizQuestionTool
            .execute(
                &context(&mock),
                QuizQuestionInput {
                    topic: "letters".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::Schema { .. }), "{error:?}");
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_index_without_clamping() {
        let mock = MockLLMProvider::new(vec![Ok(create_test_response_text(&quiz_reply(
            json!(["a", "b", "c", "d"]),
            4,
        )))]);

        let error = AskQuizQuestionTool
            .invoke(&context(&mock), &json!({ "topic": "letters" }))
            .await
            .unwrap_err();

        let violation = match error {
            ToolError::Schema { violation, .. } => violation,
            other => panic!("expected a schema violation, got {other:?}"),
        };
        assert_eq!(violation.path(), "$.correctIndex");
    }

    #[tokio::test]
    async fn test_blank_topic_fails_before_model_call() {
        let mock = MockLLMProvider::new(vec![]);

        let error = AskQuizQuestionTool
            .execute(
                &context(&mock),
                QuizQuestionInput {
                    topic: "   ".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::InvalidArgs { .. }));
        assert!(mock.get_requests().is_empty());
    }

    #[test]
    fn test_parse_output_rejects_invalid_payload() {
        let raw = quiz_reply(json!(["a", "b", "c", "d"]), 9);
        assert!(AskQuizQuestionTool.parse_output(&raw).is_none());
        assert!(AskQuizQuestionTool.parse_output("not json").is_none());
    }
}
