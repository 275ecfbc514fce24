//! Declarative output contracts and the validator that enforces them.
//!
//! A [`SchemaSpec`] describes the fields a model must produce. It is rendered
//! as a JSON schema for the model and used by [`validate`] as the final gate
//! before a value is accepted as a result payload.


mod math;
mod quiz;

pub use math::{MathSolution, MathStep, StepNumberingIssue};
pub use quiz::{QuizPrompt, QuizQuestion, QUIZ_CHOICE_COUNT};

use serde_json::{json, Map, Value};

/// The kind and constraints of a single value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String {
        /// Reject empty or whitespace-only strings
        non_empty: bool,
    },
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    Number,
    Array {
        items: Box<FieldKind>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object(SchemaSpec),
}

impl FieldKind {
    pub fn string() -> Self {
        FieldKind::String { non_empty: false }
    }

    pub fn non_empty_string() -> Self {
        FieldKind::String { non_empty: true }
    }

    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        FieldKind::Integer { min, max }
    }

    pub fn array_of(items: FieldKind) -> Self {
        FieldKind::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Sets the cardinality bounds of an array kind, no-op for other kinds
    pub fn with_len(self, min: Option<usize>, max: Option<usize>) -> Self {
        match self {
            FieldKind::Array { items, .. } => FieldKind::Array {
                items,
                min_items: min,
                max_items: max,
            },
            other => other,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldKind::String { .. } => "string",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Number => "number",
            FieldKind::Array { .. } => "array",
            FieldKind::Object(_) => "object",
        }
    }

    fn to_json_schema(&self, description: Option<&str>) -> Value {
        let mut schema = match self {
            FieldKind::String { .. } => json!({ "type": "string" }),
            FieldKind::Integer { min, max } => {
                let mut schema = json!({ "type": "integer" });
                if let Some(min) = min {
                    schema["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    schema["maximum"] = json!(max);
                }
                schema
            }
            FieldKind::Number => json!({ "type": "number" }),
            FieldKind::Array {
                items,
                min_items,
                max_items,
            } => {
                let mut schema = json!({
                    "type": "array",
                    "items": items.to_json_schema(None),
                });
                if let Some(min) = min_items {
                    schema["minItems"] = json!(min);
                }
                if let Some(max) = max_items {
                    schema["maxItems"] = json!(max);
                }
                schema
            }
            FieldKind::Object(spec) => spec.to_json_schema(),
        };
        if let Some(description) = description {
            schema["description"] = json!(description);
        }
        schema
    }
}

/// A named member of an object schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub fn required(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
        }
    }

    pub fn optional(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
        }
    }
}

/// Declarative description of an expected object shape
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSpec {
    pub fields: Vec<Field>,
}

impl SchemaSpec {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Render as a JSON schema understood by model providers
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    field.kind.to_json_schema(Some(field.description)),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("{path}: missing required field")]
    Missing { path: String },

    #[error("{path}: expected {expected}, found {found}")]
    WrongKind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path}: must not be empty")]
    EmptyString { path: String },

    #[error("{path}: has {len} items, expected {expected}")]
    Cardinality {
        path: String,
        len: usize,
        expected: String,
    },

    #[error("{path}: {value} is out of range {expected}")]
    OutOfRange {
        path: String,
        value: i64,
        expected: String,
    },
}

impl SchemaViolation {
    pub fn path(&self) -> &str {
        match self {
            SchemaViolation::Missing { path }
            | SchemaViolation::WrongKind { path, .. }
            | SchemaViolation::EmptyString { path }
            | SchemaViolation::Cardinality { path, .. }
            | SchemaViolation::OutOfRange { path, .. } => path,
        }
    }
}

/// Validate `candidate` against `schema`.
///
/// Returns the accepted value with unknown members removed. Values are never
/// coerced across kinds and never clamped into range.
pub fn validate(schema: &SchemaSpec, candidate: &Value) -> Result<Value, SchemaViolation> {
    validate_object("$", schema, candidate)
}

fn validate_object(path: &str, schema: &SchemaSpec, value: &Value) -> Result<Value, SchemaViolation> {
    let Value::Object(members) = value else {
        return Err(wrong_kind(path, "object", value));
    };

    let mut accepted = Map::new();
    for field in &schema.fields {
        let field_path = format!("{path}.{}", field.name);
        match members.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    return Err(SchemaViolation::Missing { path: field_path });
                }
            }
            Some(member) => {
                let member = validate_kind(&field_path, &field.kind, member)?;
                accepted.insert(field.name.to_string(), member);
            }
        }
    }
    Ok(Value::Object(accepted))
}

fn validate_kind(path: &str, kind: &FieldKind, value: &Value) -> Result<Value, SchemaViolation> {
    match kind {
        FieldKind::String { non_empty } => {
            let Value::String(text) = value else {
                return Err(wrong_kind(path, kind.name(), value));
            };
            if *non_empty && text.trim().is_empty() {
                return Err(SchemaViolation::EmptyString {
                    path: path.to_string(),
                });
            }
            Ok(value.clone())
        }
        FieldKind::Integer { min, max } => {
            let number = as_integer(value).ok_or_else(|| wrong_kind(path, kind.name(), value))?;
            let below = min.is_some_and(|min| number < min);
            let above = max.is_some_and(|max| number > max);
            if below || above {
                return Err(SchemaViolation::OutOfRange {
                    path: path.to_string(),
                    value: number,
                    expected: describe_bounds(*min, *max),
                });
            }
            Ok(json!(number))
        }
        FieldKind::Number => {
            if value.is_number() {
                Ok(value.clone())
            } else {
                Err(wrong_kind(path, kind.name(), value))
            }
        }
        FieldKind::Array {
            items,
            min_items,
            max_items,
        } => {
            let Value::Array(elements) = value else {
                return Err(wrong_kind(path, kind.name(), value));
            };
            let len = elements.len();
            let too_few = min_items.is_some_and(|min| len < min);
            let too_many = max_items.is_some_and(|max| len > max);
            if too_few || too_many {
                return Err(SchemaViolation::Cardinality {
                    path: path.to_string(),
                    len,
                    expected: describe_len(*min_items, *max_items),
                });
            }
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| validate_kind(&format!("{path}[{i}]"), items, element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::Object(spec) => validate_object(path, spec, value),
    }
}

/// Integral JSON numbers, including floats with no fractional part
fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    number
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}

fn wrong_kind(path: &str, expected: &'static str, found: &Value) -> SchemaViolation {
    SchemaViolation::WrongKind {
        path: path.to_string(),
        expected,
        found: match found {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        },
    }
}

fn describe_bounds(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "unbounded".to_string(),
    }
}

fn describe_len(min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(min), Some(max)) if min == max => format!("exactly {min}"),
        (Some(min), Some(max)) => format!("between {min} and {max}"),
        (Some(min), None) => format!("at least {min}"),
        (None, Some(max)) => format!("at most {max}"),
        (None, None) => "any number".to_string(),
    }
}
