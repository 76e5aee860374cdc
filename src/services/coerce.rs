//! Tolerant coercion of model free-text into JSON. Gemini wraps its answers
//! in markdown fences or surrounding prose often enough that responses are
//! cleaned up before parsing instead of being parsed directly.

use crate::error::{AppError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap())
}

/// Strip a markdown code fence, keeping its body. Either way the result is
/// trimmed.
fn strip_code_fences(text: &str) -> &str {
    match fence_re().captures(text) {
        Some(caps) => caps.get(1).map_or(text, |m| m.as_str()).trim(),
        None => text.trim(),
    }
}

/// Locate the outermost brace-delimited substring, respecting braces inside
/// JSON string literals.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Best-effort parse of model output as a `T`. On failure the raw text is
/// part of the error so it ends up in the server log.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_code_fences(text);
    let object = extract_object(cleaned)
        .ok_or_else(|| AppError::Ai(format!("No JSON object in AI response: {}", text)))?;

    serde_json::from_str(object).map_err(|e| {
        AppError::Ai(format!(
            "Failed to parse AI response as JSON: {} | Response was: {}",
            e, text
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        playlist: String,
    }

    #[test]
    fn test_plain_json() {
        let pick: Pick = extract_json(r#"{"playlist": "Chill"}"#).unwrap();
        assert_eq!(pick.playlist, "Chill");
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"playlist\": \"Chill\"}\n```";
        let pick: Pick = extract_json(text).unwrap();
        assert_eq!(pick.playlist, "Chill");
    }

    #[test]
    fn test_bare_fence() {
        let text = "```\n{\"playlist\": \"Rock\"}\n```";
        let pick: Pick = extract_json(text).unwrap();
        assert_eq!(pick.playlist, "Rock");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed_with_and_without_fence() {
        let fenced = "  ```json\n  {\"playlist\": \"Chill\"}  \n```  ";
        let pick: Pick = extract_json(fenced).unwrap();
        assert_eq!(pick.playlist, "Chill");

        let bare = "  \n  {\"playlist\": \"Chill\"}  \n  ";
        let pick: Pick = extract_json(bare).unwrap();
        assert_eq!(pick.playlist, "Chill");
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let text = "Sure! Here is my pick:\n{\"playlist\": \"Jazz\"}\nEnjoy!";
        let pick: Pick = extract_json(text).unwrap();
        assert_eq!(pick.playlist, "Jazz");
    }

    #[test]
    fn test_nested_braces() {
        #[derive(Deserialize)]
        struct Outer {
            inner: serde_json::Value,
        }
        let text = r#"{"inner": {"a": {"b": 1}}}"#;
        let outer: Outer = extract_json(text).unwrap();
        assert_eq!(outer.inner["a"]["b"], 1);
    }

    #[test]
    fn test_braces_inside_strings() {
        #[derive(Deserialize)]
        struct S {
            text: String,
        }
        let text = r#"{"text": "smile :-} and a \" quote"}"#;
        let s: S = extract_json(text).unwrap();
        assert!(s.text.contains(":-}"));
    }

    #[test]
    fn test_no_json_at_all() {
        let err = extract_json::<Pick>("I would suggest something calm.").unwrap_err();
        assert!(err.to_string().contains("AI error"));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        assert!(extract_json::<Pick>(r#"{"track": "t1"}"#).is_err());
    }
}
