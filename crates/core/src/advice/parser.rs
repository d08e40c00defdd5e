use serde_json::{Map, Value};

/// Result of reading generator text as a JSON object.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedAdvice {
    /// The whole text (minus code fences) was a JSON object.
    Strict(Map<String, Value>),
    /// An object was recovered from between the first `{` and the last `}`.
    Extracted(Map<String, Value>),
    Unparseable,
}

pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_advice_text(text: &str) -> ParsedAdvice {
    let cleaned = strip_code_fences(text);

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&cleaned) {
        return ParsedAdvice::Strict(object);
    }

    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return ParsedAdvice::Unparseable;
    };
    if end <= start {
        return ParsedAdvice::Unparseable;
    }

    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(Value::Object(object)) => ParsedAdvice::Extracted(object),
        _ => ParsedAdvice::Unparseable,
    }
}
