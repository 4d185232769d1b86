//! Parsing ladder: direct parse, then fence-stripped parse, then failure.
//!
//! No repair beyond fence stripping. Unbalanced braces, truncated output and trailing
//! commas all fail here and are left to the caller to re-prompt.

use serde_json::Value;

use crate::extraction::error::ParseStep;

const FENCE: &str = "```";

/// Why the ladder gave up, and the last JSON error it saw.
#[derive(Debug)]
pub struct SyntaxFailure {
    pub step: ParseStep,
    pub source: Option<serde_json::Error>,
}

/// Result of scanning text for a fenced code block.
#[derive(Debug, PartialEq, Eq)]
pub enum Fenced<'a> {
    /// Trimmed content between the first opening fence and the next closing fence.
    Block(&'a str),
    /// An opening fence with no closing fence after it.
    Unterminated,
}

/// Parses model text as JSON, retrying once on the content of a fenced block.
pub fn parse_structured(text: &str) -> Result<Value, SyntaxFailure> {
    let direct_error = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match fenced_block(text) {
        None => Err(SyntaxFailure {
            step: ParseStep::Direct,
            source: Some(direct_error),
        }),
        Some(Fenced::Unterminated) => Err(SyntaxFailure {
            step: ParseStep::UnterminatedFence,
            source: Some(direct_error),
        }),
        Some(Fenced::Block(inner)) => serde_json::from_str(inner).map_err(|e| SyntaxFailure {
            step: ParseStep::Fenced,
            source: Some(e),
        }),
    }
}

/// Finds the first fenced block in `text`.
///
/// An info string on the opening line (```` ```json ````) is skipped. When the opening
/// line carries anything else, the block content starts right after the backticks, which
/// covers single-line blocks such as ```` ```{"a": 1}``` ````.
pub fn fenced_block(text: &str) -> Option<Fenced<'_>> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];

    let body_start = match after_open.find('\n') {
        Some(newline) if is_info_string(&after_open[..newline]) => newline + 1,
        None if is_info_string(after_open) => after_open.len(),
        _ => 0,
    };
    let body = &after_open[body_start..];

    match body.find(FENCE) {
        Some(close) => Some(Fenced::Block(body[..close].trim())),
        None => Some(Fenced::Unterminated),
    }
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse_wins() {
        let value = parse_structured(r#"  {"score": 82}  "#).unwrap();
        assert_eq!(value, json!({"score": 82}));
    }

    #[test]
    fn test_direct_parse_ignores_fences_inside_valid_json() {
        let value = parse_structured(r#"{"remarks": "use ``` for code"}"#).unwrap();
        assert_eq!(value["remarks"], "use ``` for code");
    }

    #[test]
    fn test_fenced_with_json_tag() {
        let text = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(fenced_block(text), Some(Fenced::Block("{\"key\": \"value\"}")));
        assert_eq!(parse_structured(text).unwrap(), json!({"key": "value"}));
    }

    #[test]
    fn test_fenced_without_tag() {
        let text = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(parse_structured(text).unwrap(), json!({"key": "value"}));
    }

    #[test]
    fn test_fenced_with_surrounding_prose() {
        let text = "Sure! Here is the evaluation:\n\n```json\n{\"score\": 40}\n```\n\nLet me know if you need more.";
        assert_eq!(parse_structured(text).unwrap(), json!({"score": 40}));
    }

    #[test]
    fn test_single_line_fence() {
        let text = "Result: ```{\"score\": 1}``` done";
        assert_eq!(fenced_block(text), Some(Fenced::Block("{\"score\": 1}")));
    }

    #[test]
    fn test_only_first_block_is_used() {
        let text = "```json\n{\"a\": 1}\n```\nand also\n```json\n{\"b\": 2}\n```";
        assert_eq!(parse_structured(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_unterminated_fence_fails() {
        let failure = parse_structured("```json\n{\"score\": 80, \"level\": \"Good\"}").unwrap_err();
        assert_eq!(failure.step, ParseStep::UnterminatedFence);
        assert!(failure.source.is_some());
    }

    #[test]
    fn test_bare_opening_fence_is_unterminated() {
        assert_eq!(fenced_block("```json"), Some(Fenced::Unterminated));
    }

    #[test]
    fn test_invalid_fenced_content_fails_at_fenced_step() {
        let failure = parse_structured("```json\n{\"score\": 80,\n```").unwrap_err();
        assert_eq!(failure.step, ParseStep::Fenced);
    }

    #[test]
    fn test_truncated_json_is_not_repaired() {
        let failure = parse_structured(r#"{"score": 80, "level": "Go"#).unwrap_err();
        assert_eq!(failure.step, ParseStep::Direct);
    }

    #[test]
    fn test_prose_without_json_fails_direct() {
        let failure = parse_structured("Sure! Here's the resume info: Name: Jane Doe").unwrap_err();
        assert_eq!(failure.step, ParseStep::Direct);
        assert!(fenced_block("Sure! Here's the resume info: Name: Jane Doe").is_none());
    }

    #[test]
    fn test_empty_text_fails_without_panicking() {
        assert_eq!(parse_structured("").unwrap_err().step, ParseStep::Direct);
        assert_eq!(parse_structured("   \n").unwrap_err().step, ParseStep::Direct);
    }
}
