use serde::Serializer;
use serde_json::Value;

/// Extract a person's display name from an identity field.
///
/// Recent API versions return an identity object (`displayName`, `uniqueName`, ...),
/// older ones a plain `"Name <email>"` string.
pub fn extract_display_name(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("displayName")
            .or_else(|| obj.get("uniqueName"))
            .and_then(|v| v.as_str())
            .map(String::from),
        _ => None,
    }
}

/// Render a scalar field as text. Objects and arrays have no flat form.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Drop tabs and line breaks so a title stays on one CSV line.
pub fn strip_control_whitespace(title: &str) -> String {
    title
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Whole hours render as `8`, fractional ones as `2.5`.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 && hours.abs() < 1e15 {
        format!("{}", hours as i64)
    } else {
        format!("{hours}")
    }
}

pub fn serialize_hours<S: Serializer>(hours: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match hours {
        Some(h) => serializer.serialize_str(&format_hours(*h)),
        None => serializer.serialize_str(""),
    }
}
