//! Structured payload extraction from free-text service responses.
//!
//! The reasoning service answers in prose that is expected to contain one
//! JSON object, optionally wrapped in a markdown code fence.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{GuardianError, Result};

const FENCE: &str = "```";

/// Extract the JSON payload from a response.
///
/// With a fence, the payload is the text between the first fence pair (an
/// info string such as `json` on the opening line is skipped). Without one,
/// the whole trimmed text is used, narrowed to the outermost `{...}` when the
/// text does not itself start with a JSON delimiter.
pub fn extract_json_payload(response: &str) -> &str {
    let response = response.trim();

    if let Some(open) = response.find(FENCE) {
        let after = &response[open + FENCE.len()..];
        let line_end = after.find('\n').unwrap_or(after.len());
        let info = after[..line_end].trim();
        let body = if info.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            &after[line_end..]
        } else {
            strip_info_prefix(after)
        };
        let close = body.find(FENCE).unwrap_or(body.len());
        return body[..close].trim();
    }

    if response.starts_with('{') || response.starts_with('[') {
        return response;
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return &response[start..=end];
        }
    }

    response
}

/// Drop an info word glued to the payload, as in `json{...}`.
fn strip_info_prefix(text: &str) -> &str {
    let word_end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(text.len());
    match text[word_end..].chars().next() {
        Some('{') | Some('[') => &text[word_end..],
        _ => text,
    }
}

/// A typed response shape with range checks beyond what serde enforces.
pub trait ResponseSchema: DeserializeOwned {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Parse a response into `T`, returning the raw object alongside so it can be
/// attached to the execution log unchanged.
pub fn parse_response<T: ResponseSchema>(response: &str) -> Result<(T, Value)> {
    let payload = extract_json_payload(response);
    let raw: Value =
        serde_json::from_str(payload).map_err(|e| GuardianError::Parse(e.to_string()))?;

    if !raw.is_object() {
        return Err(GuardianError::Schema("expected a JSON object".to_string()));
    }

    let parsed: T =
        serde_json::from_value(raw.clone()).map_err(|e| GuardianError::Schema(e.to_string()))?;
    parsed.validate().map_err(GuardianError::Schema)?;

    Ok((parsed, raw))
}

/// Deserialize an explicit `null` as the type's default, for list fields
/// models tend to send as `null` instead of `[]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Range check shared by response schemas.
pub fn check_unit_interval(field: &str, value: Option<f64>) -> std::result::Result<(), String> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => {
            Err(format!("{} must be within [0, 1], got {}", field, v))
        }
        _ => Ok(()),
    }
}

/// Range check shared by response schemas.
pub fn check_non_negative(field: &str, value: Option<f64>) -> std::result::Result<(), String> {
    match value {
        Some(v) if v < 0.0 || !v.is_finite() => {
            Err(format!("{} must be a non-negative number, got {}", field, v))
        }
        _ => Ok(()),
    }
}
