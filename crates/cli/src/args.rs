//! Parsing of `name=value` command line arguments.

use serde_json::Value;

/// Parse a scalar: JSON when it parses, a plain string otherwise.
pub fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Parse `name=value` into a parameter.
pub fn parse_param(text: &str) -> Result<(String, Value), String> {
    let (name, value) = split_assignment(text)?;
    Ok((name, parse_value(value)))
}

/// Parse `name=[v1,v2]` (a JSON array) or `name=v1,v2` into a
/// hyperparameter list.
pub fn parse_hyper(text: &str) -> Result<(String, Vec<Value>), String> {
    let (name, value) = split_assignment(text)?;
    let values = match serde_json::from_str::<Value>(value) {
        Ok(Value::Array(values)) => values,
        _ => value.split(',').map(|v| parse_value(v.trim())).collect(),
    };
    if values.is_empty() {
        return Err(format!("hyperparameter '{name}' has no values"));
    }
    Ok((name, values))
}

fn split_assignment(text: &str) -> Result<(String, &str), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value)),
        _ => Err(format!("expected NAME=VALUE, got '{text}'")),
    }
}
