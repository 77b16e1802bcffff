//! Dynamically typed option values.
//!
//! Callers hand options over as loosely typed values (numbers as strings,
//! dates as objects, arbitrary JSON payloads). [`OptionValue`] keeps that
//! shape and implements the coercion rules the native layer has always
//! relied on: `Number()`-style numeric parsing, truthiness and string
//! conversion.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;

/// Largest integer that survives a round trip through an IEEE double
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A single option value as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionValue {
    /// Key present without a value
    #[default]
    Undefined,
    /// Explicit null
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Point in time, e.g. the trigger date
    Date(DateTime<Utc>),
    /// Structured payload (objects and arrays)
    Data(Value),
}

impl OptionValue {
    /// Converts a JSON value, keeping primitives as primitives
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => OptionValue::Null,
            Value::Bool(b) => OptionValue::Bool(b),
            Value::Number(n) => OptionValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => OptionValue::String(s),
            other => OptionValue::Data(other),
        }
    }

    /// `true` for undefined and null
    pub fn is_nullish(&self) -> bool {
        matches!(self, OptionValue::Undefined | OptionValue::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Undefined | OptionValue::Null => false,
            OptionValue::Bool(b) => *b,
            OptionValue::Number(n) => *n != 0.0 && !n.is_nan(),
            OptionValue::String(s) => !s.is_empty(),
            OptionValue::Date(_) | OptionValue::Data(_) => true,
        }
    }

    /// Objects, arrays and dates; everything that is not a primitive
    pub fn is_structured(&self) -> bool {
        match self {
            OptionValue::Date(_) => true,
            OptionValue::Data(v) => v.is_object() || v.is_array(),
            _ => false,
        }
    }

    /// Numeric coercion with `Number()` semantics.
    ///
    /// Booleans map to 0/1, null to 0, undefined to NaN and dates to their
    /// epoch milliseconds. Strings are trimmed and parsed; anything that is
    /// not a complete number yields NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            OptionValue::Undefined => f64::NAN,
            OptionValue::Null => 0.0,
            OptionValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            OptionValue::Number(n) => *n,
            OptionValue::String(s) => parse_number(s),
            OptionValue::Date(d) => d.timestamp_millis() as f64,
            OptionValue::Data(Value::Array(items)) => match items.as_slice() {
                [] | [Value::Null] => 0.0,
                [single] => parse_number(&OptionValue::from_json(single.clone()).to_js_string()),
                _ => f64::NAN,
            },
            OptionValue::Data(Value::Object(_)) => f64::NAN,
            OptionValue::Data(other) => OptionValue::from_json(other.clone()).to_number(),
        }
    }

    /// `true` when numeric coercion yields NaN
    pub fn is_nan(&self) -> bool {
        self.to_number().is_nan()
    }

    /// String coercion with `String()` semantics
    pub fn to_js_string(&self) -> String {
        match self {
            OptionValue::Undefined => "undefined".to_string(),
            OptionValue::Null => "null".to_string(),
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Number(n) => format_number(*n),
            OptionValue::String(s) => s.clone(),
            OptionValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
            OptionValue::Data(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => OptionValue::from_json(other.clone()).to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            OptionValue::Data(Value::Object(_)) => "[object Object]".to_string(),
            OptionValue::Data(other) => OptionValue::from_json(other.clone()).to_js_string(),
        }
    }

    /// JSON representation for the bridge. `None` for undefined, which is
    /// omitted from serialized objects.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            OptionValue::Undefined => None,
            OptionValue::Null => Some(Value::Null),
            OptionValue::Bool(b) => Some(Value::Bool(*b)),
            OptionValue::Number(n) => Some(number_to_json(*n)),
            OptionValue::String(s) => Some(Value::String(s.clone())),
            OptionValue::Date(d) => Some(Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))),
            OptionValue::Data(v) => Some(v.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Encodes a number as JSON. Integral values become JSON integers, and
/// non-finite values become `null` the same way `JSON.stringify` does it.
pub(crate) fn number_to_json(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() {
                return f64::NAN;
            }
            // accumulate in f64 so that long literals lose precision instead of failing
            return digits
                .chars()
                .try_fold(0.0_f64, |acc, c| {
                    c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
                })
                .unwrap_or(f64::NAN);
        }
    }

    // f64::from_str also accepts "inf" and "nan", which are not numbers here
    let decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for OptionValue {
    fn from(value: DateTime<Utc>) -> Self {
        OptionValue::Date(value)
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        OptionValue::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(OptionValue::from("42").to_number(), 42.0);
        assert_eq!(OptionValue::from("  7.5 ").to_number(), 7.5);
        assert_eq!(OptionValue::from("").to_number(), 0.0);
        assert_eq!(OptionValue::from("0x1F").to_number(), 31.0);
        assert_eq!(OptionValue::from("0b101").to_number(), 5.0);
        assert_eq!(
            OptionValue::from("0x1FFFFFFFFFFFFFFFF").to_number(),
            36_893_488_147_419_103_232.0
        );
        assert_eq!(OptionValue::from("1e3").to_number(), 1000.0);
        assert_eq!(OptionValue::Bool(true).to_number(), 1.0);
        assert_eq!(OptionValue::Null.to_number(), 0.0);
        assert_eq!(OptionValue::Data(json!([])).to_number(), 0.0);
        assert_eq!(OptionValue::Data(json!(["12"])).to_number(), 12.0);

        assert!(OptionValue::from("abc").is_nan());
        assert!(OptionValue::from("inf").is_nan());
        assert!(OptionValue::from("12px").is_nan());
        assert!(OptionValue::from("0x").is_nan());
        assert!(OptionValue::from("0o89").is_nan());
        assert!(OptionValue::Undefined.is_nan());
        assert!(OptionValue::Data(json!({"a": 1})).is_nan());
        assert!(OptionValue::Data(json!([1, 2])).is_nan());
    }

    #[test]
    fn test_truthiness() {
        assert!(!OptionValue::Undefined.is_truthy());
        assert!(!OptionValue::Null.is_truthy());
        assert!(!OptionValue::Number(0.0).is_truthy());
        assert!(!OptionValue::Number(f64::NAN).is_truthy());
        assert!(!OptionValue::from("").is_truthy());
        assert!(!OptionValue::Bool(false).is_truthy());

        assert!(OptionValue::from("0").is_truthy());
        assert!(OptionValue::Number(-1.0).is_truthy());
        assert!(OptionValue::Data(json!({})).is_truthy());
    }

    #[test]
    fn test_string_coercion() {
        assert_eq!(OptionValue::Number(42.0).to_js_string(), "42");
        assert_eq!(OptionValue::Number(1.5).to_js_string(), "1.5");
        assert_eq!(OptionValue::Number(-0.0).to_js_string(), "0");
        assert_eq!(OptionValue::Number(f64::NAN).to_js_string(), "NaN");
        assert_eq!(OptionValue::Bool(true).to_js_string(), "true");
        assert_eq!(OptionValue::Data(json!([1, null, "a"])).to_js_string(), "1,,a");
        assert_eq!(OptionValue::Data(json!({"k": 1})).to_js_string(), "[object Object]");

        let date = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(OptionValue::Date(date).to_js_string(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_json_encoding() {
        assert_eq!(OptionValue::Number(5.0).to_json(), Some(json!(5)));
        assert_eq!(OptionValue::Number(0.25).to_json(), Some(json!(0.25)));
        assert_eq!(OptionValue::Number(f64::NAN).to_json(), Some(Value::Null));
        assert_eq!(OptionValue::Undefined.to_json(), None);
        assert_eq!(OptionValue::Null.to_json(), Some(Value::Null));
    }

    #[test]
    fn test_from_json_keeps_primitives() {
        assert_eq!(OptionValue::from(json!(3)), OptionValue::Number(3.0));
        assert_eq!(OptionValue::from(json!("x")), OptionValue::from("x"));
        assert_eq!(OptionValue::from(json!(null)), OptionValue::Null);
        assert!(matches!(OptionValue::from(json!({"a": 1})), OptionValue::Data(_)));
    }
}
