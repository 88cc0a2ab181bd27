//! Provider-independent description of schema-constrained responses.
//!
//! A type implementing [`StructuredOutput`] tells a client which JSON schema to
//! request and how to validate the payload that comes back.

use crate::models::TextResult;
use crate::{Error, Result};
use serde_json::{json, Map, Value};

pub trait StructuredOutput: Sized {
    /// JSON schema (OpenAPI subset) the provider must constrain its output to.
    fn response_schema() -> Value;

    /// Validate a raw payload and build the record from it.
    fn from_payload(payload: &str) -> Result<Self>;
}

/// Parse a payload that must be a single JSON object.
///
/// Tolerates a surrounding Markdown code fence, which some models emit even
/// when a JSON mime type was requested.
pub fn parse_object(payload: &str) -> Result<Map<String, Value>> {
    let trimmed = strip_code_fence(payload.trim());
    if trimmed.is_empty() {
        return Err(Error::InvalidResponse("empty payload".to_string()));
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::InvalidResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => {
            tracing::error!("Failed to parse structured payload: {}\nPayload: {}", e, payload);
            Err(Error::InvalidResponse(e.to_string()))
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn required_string(object: &mut Map<String, Value>, key: &str) -> Result<String> {
    match object.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::InvalidResponse(format!(
            "field '{}' must be a string, got {}",
            key,
            json_kind(&other)
        ))),
        None => Err(Error::InvalidResponse(format!(
            "missing required field '{}'",
            key
        ))),
    }
}

impl StructuredOutput for TextResult {
    fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "planningIntention": {
                    "type": "STRING",
                    "description": "Planning intention (Korean)"
                },
                "englishPrompt": {
                    "type": "STRING",
                    "description": "Image generation prompt (English)"
                },
                "keywords": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Recommended keywords (English)"
                }
            },
            "required": ["planningIntention", "englishPrompt", "keywords"]
        })
    }

    fn from_payload(payload: &str) -> Result<Self> {
        let mut object = parse_object(payload)?;

        let planning_intention = required_string(&mut object, "planningIntention")?;
        let english_prompt = required_string(&mut object, "englishPrompt")?;

        // A malformed keyword list is not worth failing the whole generation.
        let keywords = match object.remove("keywords") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Some(other) => {
                tracing::warn!(
                    "keywords was {} instead of an array, using an empty list",
                    json_kind(&other)
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        Ok(TextResult {
            planning_intention,
            english_prompt,
            keywords,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_requires_all_three_fields() {
        let schema = TextResult::response_schema();
        assert_eq!(
            schema["required"],
            json!(["planningIntention", "englishPrompt", "keywords"])
        );
        assert_eq!(schema["properties"]["keywords"]["items"]["type"], "STRING");
    }

    #[test]
    fn test_parses_well_formed_payload() {
        let result = TextResult::from_payload(
            r#"  {"planningIntention":"따뜻한 분위기","englishPrompt":"a cat","keywords":["cat","cozy"]}  "#,
        )
        .unwrap();

        assert_eq!(
            result,
            TextResult {
                planning_intention: "따뜻한 분위기".to_string(),
                english_prompt: "a cat".to_string(),
                keywords: vec!["cat".to_string(), "cozy".to_string()],
            }
        );
    }

    #[test]
    fn test_non_array_keywords_become_empty() {
        let result = TextResult::from_payload(
            r#"{"planningIntention":"p","englishPrompt":"e","keywords":"cat, dog"}"#,
        )
        .unwrap();
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_missing_keywords_become_empty() {
        let result =
            TextResult::from_payload(r#"{"planningIntention":"p","englishPrompt":"e"}"#).unwrap();
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_non_string_keywords_are_dropped() {
        let result = TextResult::from_payload(
            r#"{"planningIntention":"p","englishPrompt":"e","keywords":["a",1,null,"b"]}"#,
        )
        .unwrap();
        assert_eq!(result.keywords, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_prompt_is_invalid() {
        let err = TextResult::from_payload(r#"{"planningIntention":"p","keywords":[]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(err.to_string().contains("englishPrompt"));
    }

    #[test]
    fn test_not_json_is_invalid() {
        let err = TextResult::from_payload("Sure! Here is your prompt").unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_array_payload_is_invalid() {
        let err = TextResult::from_payload("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_code_fenced_payload_is_accepted() {
        let result = TextResult::from_payload(
            "```json\n{\"planningIntention\":\"p\",\"englishPrompt\":\"e\",\"keywords\":[]}\n```",
        )
        .unwrap();
        assert_eq!(result.english_prompt, "e");
    }
}
