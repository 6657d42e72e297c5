//! Reply parser — turns untrusted model text into a JSON document.
//!
//! Models frequently wrap JSON in markdown fences and sprinkle `//` or `/* */`
//! comments through it. Both are removed before parsing. A reply that still
//! fails to parse is not an error: it becomes a `ParsedReply::Fallback` that
//! carries the cleaned text so callers can inspect what the model said.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

// The patterns are literals and always compile. They are held as `Result` so
// that a regex failure is reported through the "unexpected error" fallback
// rather than a panic inside a request.

/// `//` through the end of the line (or end of input). The terminator is kept.
static LINE_COMMENT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"//[^\r\n]*"));

/// `/*` through the next `*/`, spanning lines.
static BLOCK_COMMENT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/"));

/// Result of parsing a model reply that was successfully received.
///
/// Serializes untagged: a structured reply is emitted as the model's own JSON,
/// a fallback as `{"error": ..., "raw_response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParsedReply {
    Structured(Value),
    Fallback { error: String, raw_response: String },
}

impl ParsedReply {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedReply::Fallback { .. })
    }

    #[cfg(test)]
    pub fn structured(&self) -> Option<&Value> {
        match self {
            ParsedReply::Structured(value) => Some(value),
            ParsedReply::Fallback { .. } => None,
        }
    }
}

/// Top-level shape a use case expects back from the model.
#[derive(Debug, Clone, Copy)]
pub struct ReplyShape {
    pub required_keys: &'static [&'static str],
}

impl ReplyShape {
    /// Any JSON object.
    pub const OBJECT: ReplyShape = ReplyShape { required_keys: &[] };

    pub const fn requiring(required_keys: &'static [&'static str]) -> Self {
        ReplyShape { required_keys }
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        let Some(object) = value.as_object() else {
            return Err("expected a JSON object".to_string());
        };

        let missing: Vec<&str> = self
            .required_keys
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required fields: {}", missing.join(", ")))
        }
    }
}

/// Removes markdown fences and comments from a model reply.
///
/// Fences are only removed when the reply opens with one.
pub fn sanitize_reply(raw: &str) -> Result<String, regex::Error> {
    let line_comment = LINE_COMMENT.as_ref().map_err(Clone::clone)?;
    let block_comment = BLOCK_COMMENT.as_ref().map_err(Clone::clone)?;

    let text = strip_fences(raw);
    let text = line_comment.replace_all(&text, "");
    let text = block_comment.replace_all(&text, "");

    Ok(text.into_owned())
}

fn strip_fences(raw: &str) -> String {
    if raw.starts_with("```json") {
        raw.replace("```json", "").replace("```", "").trim().to_string()
    } else if raw.starts_with("```") {
        raw.replace("```", "").trim().to_string()
    } else {
        raw.to_string()
    }
}

/// Parses a model reply into whatever JSON value it contains, with no shape check.
#[cfg(test)]
pub fn parse_model_reply(raw: &str) -> ParsedReply {
    match parse_cleaned(raw) {
        Ok((value, _)) => ParsedReply::Structured(value),
        Err(fallback) => fallback,
    }
}

/// Parses a model reply and downgrades it to a fallback when it does not have
/// the requested top-level shape.
pub fn parse_model_reply_as(raw: &str, shape: &ReplyShape) -> ParsedReply {
    let (value, cleaned) = match parse_cleaned(raw) {
        Ok(parsed) => parsed,
        Err(fallback) => return fallback,
    };

    match shape.check(&value) {
        Ok(()) => ParsedReply::Structured(value),
        Err(reason) => ParsedReply::Fallback {
            error: format!("Response did not match the requested format: {reason}"),
            raw_response: cleaned,
        },
    }
}

/// Sanitizes and parses, returning the value with the cleaned text it came from.
fn parse_cleaned(raw: &str) -> Result<(Value, String), ParsedReply> {
    let cleaned = match sanitize_reply(raw) {
        Ok(cleaned) => cleaned,
        Err(pattern_error) => {
            return Err(ParsedReply::Fallback {
                error: format!("Unexpected error while parsing response: {pattern_error}"),
                raw_response: raw.to_string(),
            })
        }
    };

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => Ok((value, cleaned)),
        Err(e) => Err(ParsedReply::Fallback {
            error: format!("Failed to parse JSON response: {e}"),
            raw_response: cleaned,
        }),
    }
}
