use serde::Serialize;
use serde::Serializer;
use std::collections::BTreeMap;
use std::fmt;

/// A settlement payload.
///
/// Promises in this crate settle with dynamically-typed values, the same shapes a JavaScript
/// promise can carry. Objects use a [`BTreeMap`] so rendering is deterministic.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
  /// The JavaScript `undefined` value. Also the payload of `resolve()` / `reject()` with no
  /// argument.
  #[default]
  Undefined,
  Null,
  Bool(bool),
  /// A JavaScript number (IEEE-754 double). Equality is strict: `NaN` never equals `NaN`.
  Number(f64),
  String(String),
  Array(Vec<Value>),
  Object(BTreeMap<String, Value>),
  /// An `Error` instance, identified for matching purposes by its rendered text.
  Error(ErrorValue),
}

/// The coarse runtime type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
  Undefined,
  Null,
  Bool,
  Number,
  String,
  Array,
  Object,
  Error,
}

impl fmt::Display for ValueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ValueKind::Undefined => "undefined",
      ValueKind::Null => "null",
      ValueKind::Bool => "boolean",
      ValueKind::Number => "number",
      ValueKind::String => "string",
      ValueKind::Array => "array",
      ValueKind::Object => "object",
      ValueKind::Error => "error",
    })
  }
}

/// A minimal `Error` object: a `name` and a `message`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorValue {
  pub name: String,
  pub message: String,
}

impl ErrorValue {
  /// Creates a plain `Error` with `message`.
  pub fn new(message: impl Into<String>) -> Self {
    Self::named("Error", message)
  }

  pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      message: message.into(),
    }
  }
}

/// Renders like `Error.prototype.toString`.
impl fmt::Display for ErrorValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.name.is_empty(), self.message.is_empty()) {
      (_, true) => f.write_str(&self.name),
      (true, false) => f.write_str(&self.message),
      (false, false) => write!(f, "{}: {}", self.name, self.message),
    }
  }
}

impl Value {
  /// Builds an object value from `(key, value)` pairs.
  pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
  where
    K: Into<String>,
    V: Into<Value>,
  {
    Value::Object(
      entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    )
  }

  pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
    Value::Array(items.into_iter().map(Into::into).collect())
  }

  /// Shorthand for `Value::Error(ErrorValue::new(message))`.
  pub fn error(message: impl Into<String>) -> Self {
    Value::Error(ErrorValue::new(message))
  }

  pub fn kind(&self) -> ValueKind {
    match self {
      Value::Undefined => ValueKind::Undefined,
      Value::Null => ValueKind::Null,
      Value::Bool(_) => ValueKind::Bool,
      Value::Number(_) => ValueKind::Number,
      Value::String(_) => ValueKind::String,
      Value::Array(_) => ValueKind::Array,
      Value::Object(_) => ValueKind::Object,
      Value::Error(_) => ValueKind::Error,
    }
  }

  pub fn as_error(&self) -> Option<&ErrorValue> {
    match self {
      Value::Error(err) => Some(err),
      _ => None,
    }
  }

  /// Converts to JSON. `undefined` and non-finite numbers become `null`; errors become
  /// `{"name", "message"}` objects.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Value::Undefined | Value::Null => serde_json::Value::Null,
      Value::Bool(b) => serde_json::Value::Bool(*b),
      Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
        serde_json::Value::from(*n as i64)
      }
      Value::Number(n) => serde_json::Number::from_f64(*n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null),
      Value::String(s) => serde_json::Value::String(s.clone()),
      Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
      Value::Object(fields) => serde_json::Value::Object(
        fields
          .iter()
          .map(|(k, v)| (k.clone(), v.to_json()))
          .collect(),
      ),
      Value::Error(err) => serde_json::json!({ "name": err.name, "message": err.message }),
    }
  }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
  if n.is_nan() {
    return f.write_str("NaN");
  }
  if n.is_infinite() {
    return f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
  }
  if n == 0.0 {
    // `String(-0)` is "0".
    return f.write_str("0");
  }
  let magnitude = n.abs();
  if magnitude >= 1e21 || magnitude < 1e-6 {
    // `{:e}` gives the shortest round-trip digits; JS also signs a positive exponent.
    let exp = format!("{n:e}");
    return match exp.split_once('e') {
      Some((mantissa, exponent)) if !exponent.starts_with('-') => {
        write!(f, "{mantissa}e+{exponent}")
      }
      _ => f.write_str(&exp),
    };
  }
  write!(f, "{n}")
}

/// Renders like `String(value)` for primitives and errors, and as compact JSON for arrays and
/// objects.
impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Undefined => f.write_str("undefined"),
      Value::Null => f.write_str("null"),
      Value::Bool(b) => write!(f, "{b}"),
      Value::Number(n) => fmt_number(*n, f),
      Value::String(s) => f.write_str(s),
      Value::Error(err) => write!(f, "{err}"),
      Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
    }
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.to_json().serialize(serializer)
  }
}

impl From<()> for Value {
  fn from(_: ()) -> Self {
    Value::Undefined
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(value)
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Value::Number(value.into())
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value)
  }
}

impl From<ErrorValue> for Value {
  fn from(value: ErrorValue) -> Self {
    Value::Error(value)
  }
}

impl From<serde_json::Value> for Value {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(b),
      serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
      serde_json::Value::String(s) => Value::String(s),
      serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
      serde_json::Value::Object(fields) => Value::Object(
        fields
          .into_iter()
          .map(|(k, v)| (k, Value::from(v)))
          .collect(),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_like_js_string_conversion() {
    assert_eq!(Value::Undefined.to_string(), "undefined");
    assert_eq!(Value::from(3).to_string(), "3");
    assert_eq!(Value::from(-0.0).to_string(), "0");
    assert_eq!(Value::from(1.5).to_string(), "1.5");
    assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
    assert_eq!(Value::from(1e21).to_string(), "1e+21");
    assert_eq!(Value::from(-2.5e30).to_string(), "-2.5e+30");
    assert_eq!(Value::from(1e20).to_string(), "100000000000000000000");
    assert_eq!(Value::from(1e-7).to_string(), "1e-7");
    assert_eq!(Value::from(0.000001).to_string(), "0.000001");
    assert_eq!(Value::from("foobar").to_string(), "foobar");
    assert_eq!(Value::error("Error message").to_string(), "Error: Error message");
    assert_eq!(
      Value::Error(ErrorValue::named("TypeError", "")).to_string(),
      "TypeError"
    );
  }

  #[test]
  fn objects_render_as_sorted_json() {
    let value = Value::object([("b", Value::from(1)), ("a", Value::from("x"))]);
    assert_eq!(value.to_string(), r#"{"a":"x","b":1}"#);
  }

  #[test]
  fn equality_is_deep_and_strict() {
    let a = Value::object([("k", Value::array([1, 2]))]);
    let b = Value::object([("k", Value::array([1, 2]))]);
    assert_eq!(a, b);
    assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
    assert_ne!(Value::Undefined, Value::Null);
  }

  #[test]
  fn converts_from_json() {
    let value = Value::from(serde_json::json!({ "someProperty": "someValue", "n": [true, null] }));
    assert_eq!(
      value,
      Value::object([
        ("someProperty", Value::from("someValue")),
        ("n", Value::Array(vec![Value::Bool(true), Value::Null])),
      ])
    );
  }
}
