use super::{Field, FieldKind, SchemaSpec};
use serde::{Deserialize, Serialize};

/// A worked, step-by-step solution to a math question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathSolution {
    pub question: String,
    pub steps: Vec<MathStep>,
    pub final_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathStep {
    pub step_number: u32,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substeps: Option<Vec<String>>,
}

/// A deviation from the expected 1, 2, 3, ... step numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNumberingIssue {
    pub position: usize,
    pub expected: u32,
    pub found: u32,
}

impl MathSolution {
    pub fn schema() -> SchemaSpec {
        let step = SchemaSpec::new(vec![
            Field::required(
                "stepNumber",
                "1-based step index.",
                FieldKind::integer(Some(1), Some(i64::from(u32::MAX))),
            ),
            Field::required(
                "explanation",
                "Plain-English explanation of what happens in this step.",
                FieldKind::string(),
            ),
            Field::optional(
                "substeps",
                "Optional bullet substeps.",
                FieldKind::array_of(FieldKind::string()),
            ),
        ]);

        SchemaSpec::new(vec![
            Field::required("question", "The original math question.", FieldKind::string()),
            Field::required(
                "steps",
                "Ordered solution steps.",
                FieldKind::array_of(FieldKind::Object(step)).with_len(Some(1), None),
            ),
            Field::required(
                "finalAnswer",
                "The final numeric or algebraic answer.",
                FieldKind::string(),
            ),
        ])
    }

    /// Steps whose number breaks the 1-based consecutive sequence.
    ///
    /// Numbering problems do not invalidate a solution, callers only log them.
    pub fn step_numbering_issues(&self) -> Vec<StepNumberingIssue> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(position, step)| {
                let expected = position as u32 + 1;
                (step.step_number != expected).then_some(StepNumberingIssue {
                    position,
                    expected,
                    found: step.step_number,
                })
            })
            .collect()
    }
}
