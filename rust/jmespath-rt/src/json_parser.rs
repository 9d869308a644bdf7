//! JSON ingress with fast paths for common cases.
//!
//! Strategies:
//! 1. Fast path for bare literals (zero-alloc)
//! 2. Hand-rolled integer parser (avoids str::parse overhead)
//! 3. Fast path for escape-free strings
//! 4. serde_json for everything else, converted with key order preserved

use crate::values::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid JSON: {message}")]
pub struct JsonParseError {
    pub message: String,
}

/// Parse JSON text into the default runtime's value representation.
pub fn parse_json(input: &str) -> Result<Value, JsonParseError> {
    let bytes = input.as_bytes();
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(JsonParseError {
            message: "empty input".to_string(),
        });
    }

    // Fast path: bare literals
    match trimmed {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    // Fast path: integer (no decimal point, no exponent)
    if matches!(bytes[0], b'-' | b'0'..=b'9' | b' ' | b'\t' | b'\n' | b'\r') {
        if let Some(val) = try_parse_integer_fast(bytes) {
            return Ok(val);
        }
    }

    // Fast path: simple string (quoted, no escapes)
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        let inner = &trimmed[1..trimmed.len() - 1];
        if !inner.bytes().any(|b| b == b'\\' || b == b'"') {
            return Ok(Value::String(inner.to_string()));
        }
    }

    parse_with_serde(input)
}

/// Hand-rolled integer parser for the common case. Returns None if the
/// input contains anything but whitespace, an optional sign, and digits.
#[inline]
fn try_parse_integer_fast(bytes: &[u8]) -> Option<Value> {
    let mut i = 0;
    let len = bytes.len();

    while i < len && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= len {
        return None;
    }

    let negative = bytes[i] == b'-';
    if negative {
        i += 1;
        if i >= len {
            return None;
        }
    }

    if !bytes[i].is_ascii_digit() {
        return None;
    }

    let mut val: u64 = 0;
    let digit_start = i;
    while i < len && bytes[i].is_ascii_digit() {
        let d = (bytes[i] - b'0') as u64;
        val = val.checked_mul(10)?.checked_add(d)?;
        i += 1;
    }

    while i < len && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    // Must have consumed everything; a decimal point or exponent falls
    // through to the full parser.
    if i != len {
        return None;
    }

    // Reject leading zeros (except bare "0")
    if bytes[digit_start] == b'0' && (i - digit_start) > 1 {
        return None;
    }

    if negative {
        // i64::MIN magnitude is one more than i64::MAX
        if val > (i64::MAX as u64) + 1 {
            return None;
        }
        if val == (i64::MAX as u64) + 1 {
            return Some(Value::Int(i64::MIN));
        }
        Some(Value::Int(-(val as i64)))
    } else {
        if val > i64::MAX as u64 {
            return None;
        }
        Some(Value::Int(val as i64))
    }
}

fn parse_with_serde(input: &str) -> Result<Value, JsonParseError> {
    let json: serde_json::Value =
        serde_json::from_str(input).map_err(|err| JsonParseError {
            message: err.to_string(),
        })?;
    Ok(Value::from_json(&json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_literals() {
        assert_eq!(parse_json("null").unwrap(), Value::Null);
        assert_eq!(parse_json(" true ").unwrap(), Value::Bool(true));
        assert_eq!(parse_json("false").unwrap(), Value::Bool(false));
    }

    #[test]
    fn parses_integers_on_the_fast_path() {
        assert_eq!(parse_json("0").unwrap(), Value::Int(0));
        assert_eq!(parse_json("  42  ").unwrap(), Value::Int(42));
        assert_eq!(parse_json("-17").unwrap(), Value::Int(-17));
        assert_eq!(
            parse_json("-9223372036854775808").unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn leading_zeros_are_rejected() {
        assert!(parse_json("01").is_err());
    }

    #[test]
    fn parses_floats_via_fallback() {
        assert_eq!(parse_json("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(parse_json("1e3").unwrap(), Value::Float(1000.0));
    }

    #[test]
    fn parses_simple_strings_on_the_fast_path() {
        assert_eq!(parse_json("\"hello\"").unwrap(), Value::String("hello".into()));
        assert_eq!(parse_json("\"\"").unwrap(), Value::String("".into()));
    }

    #[test]
    fn parses_escaped_strings_via_fallback() {
        assert_eq!(
            parse_json(r#""a\nb""#).unwrap(),
            Value::String("a\nb".into())
        );
    }

    #[test]
    fn parses_containers_preserving_key_order() {
        let v = parse_json(r#"{"z": 1, "a": [true, null]}"#).unwrap();
        assert_eq!(v.to_json_string(), r#"{"z":1,"a":[true,null]}"#);
    }

    #[test]
    fn rejects_invalid_input() {
        assert!(parse_json("").is_err());
        assert!(parse_json("{").is_err());
        assert!(parse_json("nul").is_err());
    }
}
