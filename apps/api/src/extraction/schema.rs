//! Schema descriptors and validation of parsed model output.

use serde_json::{Map, Value};

use crate::extraction::error::Violation;

/// Expected kind of a field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// A JSON string.
    Text,
    /// An array of strings.
    TextList,
    /// An array of entries, each a string or a flat object of scalar values.
    /// Object values are rendered as text; arrays of scalars are joined with ", ".
    Entries,
    /// A finite JSON number within `[min, max]`.
    Score { min: f64, max: f64 },
    /// A string drawn from a closed, case-sensitive set.
    OneOf(&'static [&'static str]),
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::TextList => "a list of strings",
            FieldKind::Entries => "a list of entries",
            FieldKind::Score { .. } => "a number",
            FieldKind::OneOf(_) => "a string",
        }
    }

    /// The value used when a `DefaultEmpty` field is absent.
    fn empty(&self) -> Option<Value> {
        match self {
            FieldKind::Text => Some(Value::String(String::new())),
            FieldKind::TextList | FieldKind::Entries => Some(Value::Array(Vec::new())),
            FieldKind::Score { .. } | FieldKind::OneOf(_) => None,
        }
    }
}

/// What happens when a field is absent or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absence is a schema violation.
    Required,
    /// Absence yields the kind's empty value. The only default the pipeline ever applies.
    DefaultEmpty,
    /// Absence leaves the field out of the record.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn default_empty(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            presence: Presence::DefaultEmpty,
        }
    }

    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            presence: Presence::Optional,
        }
    }
}

/// A fixed set of expected keys and their value kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchemaDescriptor {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl SchemaDescriptor {
    /// Checks that the descriptor itself is usable.
    pub fn check(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("descriptor has no fields".to_string());
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.key.is_empty() {
                return Err(format!("field {i} has an empty key"));
            }
            if self.fields[..i]
                .iter()
                .any(|earlier| earlier.key.eq_ignore_ascii_case(field.key))
            {
                return Err(format!("duplicate key '{}'", field.key));
            }
            match field.kind {
                FieldKind::OneOf(allowed) if allowed.is_empty() => {
                    return Err(format!("field '{}' has an empty enumeration", field.key));
                }
                FieldKind::Score { min, max }
                    if !(min.is_finite() && max.is_finite() && min <= max) =>
                {
                    return Err(format!("field '{}' has an invalid range", field.key));
                }
                _ => {}
            }
            if field.presence == Presence::DefaultEmpty && field.kind.empty().is_none() {
                return Err(format!("field '{}' has no empty value to default to", field.key));
            }
        }

        Ok(())
    }

    /// Validates a parsed value and returns a normalized object keyed by the descriptor's keys.
    ///
    /// Unknown keys are dropped. Every violation is collected, not just the first.
    pub fn validate(&self, value: &Value) -> Result<Value, Vec<Violation>> {
        let object = value.as_object().ok_or_else(|| {
            vec![Violation::NotAnObject {
                found: kind_name(value),
            }]
        })?;

        let mut normalized = Map::new();
        let mut violations = Vec::new();

        for field in self.fields {
            match lookup(object, field.key).filter(|v| !v.is_null()) {
                Some(found) => match check_value(field.key, &field.kind, found) {
                    Ok(checked) => {
                        normalized.insert(field.key.to_string(), checked);
                    }
                    Err(violation) => violations.push(violation),
                },
                None => match field.presence {
                    Presence::Required => violations.push(Violation::Missing { key: field.key }),
                    Presence::DefaultEmpty => {
                        if let Some(empty) = field.kind.empty() {
                            normalized.insert(field.key.to_string(), empty);
                        }
                    }
                    Presence::Optional => {}
                },
            }
        }

        if violations.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(violations)
        }
    }
}

/// Exact key first, then an ASCII case-insensitive match (models echo `Name`, `Skills`, ...).
fn lookup<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn check_value(key: &'static str, kind: &FieldKind, value: &Value) -> Result<Value, Violation> {
    let wrong_kind = || Violation::WrongKind {
        key,
        expected: kind.describe(),
        found: kind_name(value),
    };

    match kind {
        FieldKind::Text => value
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(wrong_kind),

        FieldKind::TextList => {
            let items = value.as_array().ok_or_else(wrong_kind)?;
            items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) => Ok(Value::String(s.clone())),
                    other => Err(Violation::BadItem {
                        key,
                        index,
                        expected: "a string",
                        found: kind_name(other),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }

        FieldKind::Entries => {
            let items = value.as_array().ok_or_else(wrong_kind)?;
            items
                .iter()
                .enumerate()
                .map(|(index, item)| check_entry(key, index, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }

        FieldKind::Score { min, max } => {
            let score = value.as_f64().ok_or_else(wrong_kind)?;
            if !score.is_finite() || score < *min || score > *max {
                return Err(Violation::OutOfRange {
                    key,
                    value: score,
                    min: *min,
                    max: *max,
                });
            }
            Ok(value.clone())
        }

        FieldKind::OneOf(allowed) => {
            let choice = value.as_str().ok_or_else(wrong_kind)?;
            if allowed.contains(&choice) {
                Ok(Value::String(choice.to_string()))
            } else {
                Err(Violation::NotAllowed {
                    key,
                    value: choice.to_string(),
                    allowed: *allowed,
                })
            }
        }
    }
}

fn check_entry(key: &'static str, index: usize, item: &Value) -> Result<Value, Violation> {
    let bad_item = |found: &Value| Violation::BadItem {
        key,
        index,
        expected: "a string or a flat object",
        found: kind_name(found),
    };

    match item {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Object(details) => {
            let mut flat = Map::new();
            for (name, detail) in details {
                let text = match detail {
                    Value::Null => continue,
                    Value::Array(parts) => parts
                        .iter()
                        .map(|part| scalar_text(part).ok_or_else(|| bad_item(part)))
                        .collect::<Result<Vec<_>, _>>()?
                        .join(", "),
                    other => scalar_text(other).ok_or_else(|| bad_item(other))?,
                };
                flat.insert(name.clone(), Value::String(text));
            }
            Ok(Value::Object(flat))
        }
        other => Err(bad_item(other)),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LEVELS: &[&str] = &["Good", "Average", "Poor"];

    const SAMPLE: SchemaDescriptor = SchemaDescriptor {
        name: "sample",
        fields: &[
            FieldSpec::required("score", FieldKind::Score { min: 0.0, max: 100.0 }),
            FieldSpec::required("level", FieldKind::OneOf(LEVELS)),
            FieldSpec::default_empty("name", FieldKind::Text),
            FieldSpec::optional("notes", FieldKind::TextList),
            FieldSpec::default_empty("history", FieldKind::Entries),
        ],
    };

    #[test]
    fn test_sample_descriptor_is_well_formed() {
        assert!(SAMPLE.check().is_ok());
    }

    #[test]
    fn test_check_rejects_empty_enumeration() {
        const BAD: SchemaDescriptor = SchemaDescriptor {
            name: "bad",
            fields: &[FieldSpec::required("level", FieldKind::OneOf(&[]))],
        };
        assert!(BAD.check().unwrap_err().contains("empty enumeration"));
    }

    #[test]
    fn test_check_rejects_inverted_range() {
        const BAD: SchemaDescriptor = SchemaDescriptor {
            name: "bad",
            fields: &[FieldSpec::required("score", FieldKind::Score { min: 100.0, max: 0.0 })],
        };
        assert!(BAD.check().is_err());
    }

    #[test]
    fn test_check_rejects_default_without_empty_value() {
        const BAD: SchemaDescriptor = SchemaDescriptor {
            name: "bad",
            fields: &[FieldSpec::default_empty("score", FieldKind::Score { min: 0.0, max: 1.0 })],
        };
        assert!(BAD.check().is_err());
    }

    #[test]
    fn test_check_rejects_no_fields() {
        const BAD: SchemaDescriptor = SchemaDescriptor {
            name: "bad",
            fields: &[],
        };
        assert!(BAD.check().is_err());
    }

    #[test]
    fn test_validate_normalizes_and_defaults() {
        let value = json!({"score": 82, "level": "Good", "extra": true});
        let normalized = SAMPLE.validate(&value).unwrap();
        assert_eq!(
            normalized,
            json!({"score": 82, "level": "Good", "name": "", "history": []})
        );
    }

    #[test]
    fn test_validate_null_optional_is_absent() {
        let value = json!({"score": 1, "level": "Poor", "notes": null});
        let normalized = SAMPLE.validate(&value).unwrap();
        assert!(normalized.get("notes").is_none());
    }

    #[test]
    fn test_validate_null_required_is_missing() {
        let violations = SAMPLE
            .validate(&json!({"score": null, "level": "Poor"}))
            .unwrap_err();
        assert_eq!(violations, vec![Violation::Missing { key: "score" }]);
    }

    #[test]
    fn test_validate_case_insensitive_keys() {
        let value = json!({"Score": 50, "LEVEL": "Average", "Name": "Jane"});
        let normalized = SAMPLE.validate(&value).unwrap();
        assert_eq!(normalized["name"], "Jane");
        assert_eq!(normalized["level"], "Average");
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let violations = SAMPLE.validate(&json!({"name": 5})).unwrap_err();
        assert_eq!(violations.len(), 3);
        assert!(violations.contains(&Violation::Missing { key: "score" }));
        assert!(violations.contains(&Violation::Missing { key: "level" }));
        assert!(violations.contains(&Violation::WrongKind {
            key: "name",
            expected: "a string",
            found: "a number",
        }));
    }

    #[test]
    fn test_score_as_string_is_wrong_kind() {
        let violations = SAMPLE
            .validate(&json!({"score": "high", "level": "Good"}))
            .unwrap_err();
        assert!(matches!(violations[0], Violation::WrongKind { key: "score", .. }));
    }

    #[test]
    fn test_numeric_string_score_is_wrong_kind() {
        let violations = SAMPLE
            .validate(&json!({"score": "82", "level": "Good"}))
            .unwrap_err();
        assert!(matches!(violations[0], Violation::WrongKind { key: "score", .. }));
    }

    #[test]
    fn test_score_out_of_range() {
        let violations = SAMPLE
            .validate(&json!({"score": 150, "level": "Good"}))
            .unwrap_err();
        assert!(matches!(violations[0], Violation::OutOfRange { key: "score", .. }));

        let violations = SAMPLE
            .validate(&json!({"score": -1, "level": "Good"}))
            .unwrap_err();
        assert!(matches!(violations[0], Violation::OutOfRange { .. }));
    }

    #[test]
    fn test_score_bounds_inclusive() {
        assert!(SAMPLE.validate(&json!({"score": 0, "level": "Poor"})).is_ok());
        assert!(SAMPLE.validate(&json!({"score": 100.0, "level": "Good"})).is_ok());
    }

    #[test]
    fn test_enumeration_is_case_sensitive() {
        let violations = SAMPLE
            .validate(&json!({"score": 90, "level": "good"}))
            .unwrap_err();
        assert!(matches!(violations[0], Violation::NotAllowed { .. }));
    }

    #[test]
    fn test_text_list_rejects_non_string_item() {
        let violations = SAMPLE
            .validate(&json!({"score": 90, "level": "Good", "notes": ["ok", 3]}))
            .unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::BadItem {
                key: "notes",
                index: 1,
                expected: "a string",
                found: "a number",
            }]
        );
    }

    #[test]
    fn test_entries_flatten_objects() {
        let value = json!({
            "score": 90,
            "level": "Good",
            "history": [
                "Plain entry",
                {"degree": "BSc", "year": 2020, "honours": null, "courses": ["OS", "DB"]}
            ]
        });
        let normalized = SAMPLE.validate(&value).unwrap();
        assert_eq!(
            normalized["history"],
            json!([
                "Plain entry",
                {"degree": "BSc", "year": "2020", "courses": "OS, DB"}
            ])
        );
    }

    #[test]
    fn test_entries_reject_nested_objects() {
        let value = json!({
            "score": 90,
            "level": "Good",
            "history": [{"company": {"name": "Acme"}}]
        });
        let violations = SAMPLE.validate(&value).unwrap_err();
        assert!(matches!(
            violations[0],
            Violation::BadItem { key: "history", index: 0, .. }
        ));
    }

    #[test]
    fn test_top_level_array_is_not_an_object() {
        let violations = SAMPLE.validate(&json!([1, 2])).unwrap_err();
        assert_eq!(violations, vec![Violation::NotAnObject { found: "a list" }]);
    }
}
