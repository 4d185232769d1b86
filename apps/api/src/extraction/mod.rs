//! Structured extraction — turns an untrusted model response into a validated, typed record.
//!
//! Every response goes through the same two steps:
//! 1. `ladder::parse_structured` — direct JSON parse, then a single fence-stripped retry.
//! 2. `SchemaDescriptor::validate` — key presence, value kinds, ranges and enumerations.
//!
//! Only a value that passes both is deserialized into the caller's record type. Anything
//! else comes back as an `ExtractionError` that says which of the two steps rejected it.
//! This module is pure: no I/O, no logging, no retries.

use std::fmt;

use serde::de::DeserializeOwned;

pub mod error;
pub mod ladder;
pub mod schema;

pub use error::{ExtractionError, ParseStep, Stage, Violation};
pub use schema::{FieldKind, FieldSpec, SchemaDescriptor};

/// Maximum number of characters of raw model output carried into error reports.
pub const RAW_EXCERPT_CHARS: usize = 200;

/// Unstructured text returned by a completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse(String);

impl RawModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading slice of the response, at most `RAW_EXCERPT_CHARS` characters, for diagnostics.
    pub fn excerpt(&self) -> String {
        let text = self.0.trim();
        match text.char_indices().nth(RAW_EXCERPT_CHARS) {
            Some((cut, _)) => format!("{}…", &text[..cut]),
            None => text.to_string(),
        }
    }
}

impl From<String> for RawModelResponse {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RawModelResponse {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for RawModelResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record type with a fixed schema descriptor.
pub trait Extract: DeserializeOwned {
    const SCHEMA: &'static SchemaDescriptor;
}

/// Extracts a `T` from a model response using `T::SCHEMA`.
pub fn extract<T: Extract>(raw: RawModelResponse) -> Result<T, ExtractionError> {
    extract_with(raw, T::SCHEMA)
}

/// Runs the parsing ladder and schema validation against an explicit descriptor.
///
/// The response is consumed: on success it is dropped, on failure it moves into the error.
pub fn extract_with<T: DeserializeOwned>(
    raw: RawModelResponse,
    schema: &SchemaDescriptor,
) -> Result<T, ExtractionError> {
    schema
        .check()
        .map_err(|reason| ExtractionError::Descriptor {
            schema: schema.name,
            reason,
        })?;

    let value = match ladder::parse_structured(raw.as_str()) {
        Ok(value) => value,
        Err(failure) => {
            return Err(ExtractionError::Syntax {
                step: failure.step,
                source: failure.source,
                raw,
            })
        }
    };

    let normalized = match schema.validate(&value) {
        Ok(normalized) => normalized,
        Err(violations) => {
            return Err(ExtractionError::Schema {
                schema: schema.name,
                violations,
                raw,
            })
        }
    };

    // A validated value the record type still rejects means the descriptor and the type disagree.
    serde_json::from_value(normalized).map_err(|e| ExtractionError::Descriptor {
        schema: schema.name,
        reason: format!("record type rejected a validated value: {e}"),
    })
}
