//! Shared parsing for backend responses.
//!
//! Models wrap JSON in code fences, prefix it with chatter, or trail it with
//! explanations. Every extraction call goes through the same steps: strip
//! fences, locate the first balanced `{...}` block, deserialize that block.

use serde::de::DeserializeOwned;

use crate::errors::ExtractionError;

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// A dangling closing fence without an opening one is removed as well.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let text = if let Some(stripped) = text.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
    } else {
        text
    };
    let text = text.trim();
    text.strip_suffix("```").map(str::trim).unwrap_or(text)
}

/// Returns the first balanced `open ... close` block, e.g. `{...}` or `[...]`.
///
/// Delimiters inside JSON string literals are ignored so a `}` in a skill name
/// does not end the block early. `None` when no opener exists or it never closes.
pub fn extract_balanced(text: &str, open: u8, close: u8) -> Option<&str> {
    let start = text.bytes().position(|b| b == open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match *byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match *byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Locates the first JSON object in a raw model response.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    extract_balanced(strip_json_fences(raw), b'{', b'}')
}

/// Strips fences, isolates the first object and deserializes it.
/// Any failure along the way is a `MalformedResponse`, never a panic.
pub fn parse_json_object<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractionError> {
    let object = extract_json_object(raw).ok_or_else(|| {
        ExtractionError::MalformedResponse("no JSON object found in response".to_string())
    })?;
    serde_json::from_str(object).map_err(|e| ExtractionError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct ExperienceField {
        experience: Option<String>,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_trailing_fence_only() {
        assert_eq!(strip_json_fences("{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_object_ignores_surrounding_chatter() {
        let raw = "Sure! Here is the result: {\"experience\": \"5 years\"} Hope it helps {x}";
        assert_eq!(
            extract_json_object(raw),
            Some("{\"experience\": \"5 years\"}")
        );
    }

    #[test]
    fn test_extract_object_handles_nesting() {
        let raw = "{\"a\": {\"b\": [1, 2]}, \"c\": 3} trailing";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": [1, 2]}, \"c\": 3}"));
    }

    #[test]
    fn test_extract_object_ignores_braces_in_strings() {
        let raw = r#"{"skills": ["C{}", "Rust"]}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn test_unbalanced_object_is_none() {
        assert_eq!(extract_json_object("{\"experience\": \"5 years\""), None);
    }

    #[test]
    fn test_extract_balanced_array() {
        let raw = "skills: [\"Python\", [\"nested\"]] done";
        assert_eq!(
            extract_balanced(raw, b'[', b']'),
            Some("[\"Python\", [\"nested\"]]")
        );
    }

    #[test]
    fn test_parse_json_object_from_fenced_response() {
        let raw = "```json\n{\"experience\": \"10+ years\"}\n```";
        let parsed: ExperienceField = parse_json_object(raw).unwrap();
        assert_eq!(parsed.experience.as_deref(), Some("10+ years"));
    }

    #[test]
    fn test_parse_malformed_json_is_error_not_panic() {
        let result: Result<ExperienceField, _> = parse_json_object("{\"experience\": five years}");
        assert!(matches!(result, Err(ExtractionError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_without_object_is_error() {
        let result: Result<ExperienceField, _> = parse_json_object("I could not find anything");
        assert!(matches!(result, Err(ExtractionError::MalformedResponse(_))));
    }
}
