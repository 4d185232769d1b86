use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::extraction::RawModelResponse;

/// Which half of the pipeline rejected a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parse,
    Schema,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => f.write_str("parse"),
            Stage::Schema => f.write_str("schema"),
        }
    }
}

/// The last rung of the parsing ladder that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStep {
    /// No fence in the text; the verbatim parse was the only attempt.
    Direct,
    /// A fenced block was found but its content is not valid JSON.
    Fenced,
    /// An opening fence with no closing fence, usually a truncated answer.
    UnterminatedFence,
}

impl fmt::Display for ParseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseStep::Direct => f.write_str("direct parse"),
            ParseStep::Fenced => f.write_str("fence-stripped parse"),
            ParseStep::UnterminatedFence => f.write_str("unterminated code fence"),
        }
    }
}

/// A single way a parsed value breaks its schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("expected a JSON object at the top level, found {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required field '{key}'")]
    Missing { key: &'static str },

    #[error("field '{key}' must be {expected}, found {found}")]
    WrongKind {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{key}' item {index} must be {expected}, found {found}")]
    BadItem {
        key: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{key}' is {value}, outside [{min}, {max}]")]
    OutOfRange {
        key: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("field '{key}' is '{value}', expected one of {}", .allowed.join(", "))]
    NotAllowed {
        key: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The text is not JSON, even after fence stripping.
    #[error("model output is not valid JSON (failed at {step}){}", syntax_detail(.source))]
    Syntax {
        step: ParseStep,
        #[source]
        source: Option<serde_json::Error>,
        raw: RawModelResponse,
    },

    /// The text is JSON but does not fit the schema.
    #[error("model output does not match the {schema} schema: {}", join_violations(.violations))]
    Schema {
        schema: &'static str,
        violations: Vec<Violation>,
        raw: RawModelResponse,
    },

    /// The schema descriptor itself is unusable. A programming error, never a model failure.
    #[error("schema descriptor '{schema}' is malformed: {reason}")]
    Descriptor { schema: &'static str, reason: String },
}

impl ExtractionError {
    /// `None` for descriptor errors, which are not caused by the model's output.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ExtractionError::Syntax { .. } => Some(Stage::Parse),
            ExtractionError::Schema { .. } => Some(Stage::Schema),
            ExtractionError::Descriptor { .. } => None,
        }
    }

    pub fn raw(&self) -> Option<&RawModelResponse> {
        match self {
            ExtractionError::Syntax { raw, .. } | ExtractionError::Schema { raw, .. } => Some(raw),
            ExtractionError::Descriptor { .. } => None,
        }
    }

    /// The `{stage, message, raw_excerpt}` view handed to callers. `None` for descriptor errors.
    pub fn report(&self) -> Option<FailureReport> {
        Some(FailureReport {
            stage: self.stage()?,
            message: self.to_string(),
            raw_excerpt: self.raw()?.excerpt(),
        })
    }
}

/// Serializable summary of a model-caused extraction failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub stage: Stage,
    pub message: String,
    pub raw_excerpt: String,
}

fn syntax_detail(source: &Option<serde_json::Error>) -> String {
    source
        .as_ref()
        .map(|e| format!(": {e}"))
        .unwrap_or_default()
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
