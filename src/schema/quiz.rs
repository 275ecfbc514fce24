use super::{Field, FieldKind, SchemaSpec};
use serde::{Deserialize, Serialize};

pub const QUIZ_CHOICE_COUNT: usize = 4;

/// One multiple-choice question, including its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub topic: String,
    pub question: String,
    pub choices: Vec<String>,
    pub correct_index: u8,
}

/// A quiz question as shown to someone who has not answered yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPrompt {
    pub topic: String,
    pub question: String,
    pub choices: Vec<String>,
}

impl QuizQuestion {
    pub fn schema() -> SchemaSpec {
        let last = QUIZ_CHOICE_COUNT as i64 - 1;
        SchemaSpec::new(vec![
            Field::required("topic", "The original topic provided.", FieldKind::string()),
            Field::required(
                "question",
                "The multiple-choice question text.",
                FieldKind::string(),
            ),
            Field::required(
                "choices",
                "Exactly four answer choices.",
                FieldKind::array_of(FieldKind::string())
                    .with_len(Some(QUIZ_CHOICE_COUNT), Some(QUIZ_CHOICE_COUNT)),
            ),
            Field::required(
                "correctIndex",
                "0-based index of the correct choice.",
                FieldKind::integer(Some(0), Some(last)),
            ),
        ])
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index as usize
    }

    pub fn correct_choice(&self) -> Option<&str> {
        self.choices.get(self.correct_index as usize).map(String::as_str)
    }

    /// The question without its answer
    pub fn redacted(&self) -> QuizPrompt {
        QuizPrompt {
            topic: self.topic.clone(),
            question: self.question.clone(),
            choices: self.choices.clone(),
        }
    }
}
