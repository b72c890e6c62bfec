//! Schema-constrained parsing of LLM output
//!
//! The prompt carries format instructions derived from a JSON schema; the
//! reply is expected to contain one JSON object matching it.

use std::marker::PhantomData;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;

static JSON_OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Types that can describe their expected JSON shape to an LLM
pub trait OutputSchema: DeserializeOwned {
    /// JSON schema of the expected object
    fn schema() -> serde_json::Value;
}

/// LLM output did not match the schema
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to parse LLM output: {reason}")]
pub struct ParseError {
    /// Why parsing failed
    pub reason: String,
    /// The raw text that was parsed
    pub raw: String,
}

/// Parser for one output schema
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputParser<T> {
    _marker: PhantomData<T>,
}

impl<T: OutputSchema> OutputParser<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Instructions appended to the prompt
    #[must_use]
    pub fn format_instructions(&self) -> String {
        format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
             As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
             the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
             The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
             Here is the output schema:\n```\n{}\n```",
            T::schema()
        )
    }

    /// Parse the JSON object embedded in `text`
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if no object is found or it does not match `T`
    pub fn parse(&self, text: &str) -> Result<T, ParseError> {
        let Some(object) = JSON_OBJECT_REGEX.find(text) else {
            return Err(ParseError {
                reason: "no JSON object found".to_string(),
                raw: text.to_string(),
            });
        };

        serde_json::from_str(object.as_str()).map_err(|e| ParseError {
            reason: e.to_string(),
            raw: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        response: String,
    }

    impl OutputSchema for Answer {
        fn schema() -> serde_json::Value {
            serde_json::json!({
                "properties": {"response": {"title": "Response", "type": "string"}},
                "required": ["response"]
            })
        }
    }

    #[test]
    fn test_parse_plain_object() {
        let parser = OutputParser::<Answer>::new();
        let parsed = parser.parse(r#"{"response": "Привет!"}"#).unwrap();
        assert_eq!(parsed.response, "Привет!");
    }

    #[test]
    fn test_parse_fenced_object() {
        let parser = OutputParser::<Answer>::new();
        let parsed = parser
            .parse("Sure!\n```json\n{\"response\": \"Bonjour\"}\n```")
            .unwrap();
        assert_eq!(parsed.response, "Bonjour");
    }

    #[test]
    fn test_parse_failures() {
        let parser = OutputParser::<Answer>::new();

        let err = parser.parse("just some prose").unwrap_err();
        assert_eq!(err.reason, "no JSON object found");
        assert_eq!(err.raw, "just some prose");

        assert!(parser.parse(r#"{"reply": "wrong field"}"#).is_err());
        assert!(parser.parse(r#"{"response": 42}"#).is_err());
    }

    #[test]
    fn test_format_instructions_embed_schema() {
        let instructions = OutputParser::<Answer>::new().format_instructions();
        assert!(instructions.contains(r#""required":["response"]"#));
        assert!(instructions.starts_with("The output should be formatted as a JSON instance"));
    }
}
