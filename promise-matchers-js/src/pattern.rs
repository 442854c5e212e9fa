//! Pattern (asymmetric) matchers: expected payloads that decide a match with a predicate
//! instead of equality.

use crate::value::Value;
use crate::value::ValueKind;
use std::collections::BTreeMap;
use std::fmt;

/// An expected-value stand-in that decides the match itself.
///
/// The [`Display`](fmt::Display) output is used in mismatch messages.
pub trait Pattern: fmt::Display {
  fn matches(&self, actual: &Value) -> bool;
}

/// Matches objects that have at least the given fields with equal values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectContaining {
  fields: BTreeMap<String, Value>,
}

impl Pattern for ObjectContaining {
  fn matches(&self, actual: &Value) -> bool {
    let Value::Object(actual) = actual else {
      return false;
    };
    self
      .fields
      .iter()
      .all(|(key, expected)| actual.get(key) == Some(expected))
  }
}

impl fmt::Display for ObjectContaining {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "objectContaining({})", Value::Object(self.fields.clone()))
  }
}

/// Matches arrays that contain every given item, in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayContaining {
  items: Vec<Value>,
}

impl Pattern for ArrayContaining {
  fn matches(&self, actual: &Value) -> bool {
    let Value::Array(actual) = actual else {
      return false;
    };
    self.items.iter().all(|item| actual.contains(item))
  }
}

impl fmt::Display for ArrayContaining {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "arrayContaining({})", Value::Array(self.items.clone()))
  }
}

/// Matches strings containing a substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringContaining {
  needle: String,
}

impl Pattern for StringContaining {
  fn matches(&self, actual: &Value) -> bool {
    matches!(actual, Value::String(s) if s.contains(&self.needle))
  }
}

impl fmt::Display for StringContaining {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "stringContaining({:?})", self.needle)
  }
}

/// Matches any value of the given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Any {
  kind: ValueKind,
}

impl Pattern for Any {
  fn matches(&self, actual: &Value) -> bool {
    actual.kind() == self.kind
  }
}

impl fmt::Display for Any {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "any({})", self.kind)
  }
}

/// Matches anything except `undefined` and `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anything;

impl Pattern for Anything {
  fn matches(&self, actual: &Value) -> bool {
    !matches!(actual, Value::Undefined | Value::Null)
  }
}

impl fmt::Display for Anything {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("anything()")
  }
}

/// A pattern backed by an arbitrary closure.
pub struct Predicate {
  description: String,
  predicate: Box<dyn Fn(&Value) -> bool>,
}

impl Pattern for Predicate {
  fn matches(&self, actual: &Value) -> bool {
    (self.predicate)(actual)
  }
}

impl fmt::Display for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.description)
  }
}

impl fmt::Debug for Predicate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Predicate")
      .field("description", &self.description)
      .finish_non_exhaustive()
  }
}

pub fn object_containing<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> ObjectContaining
where
  K: Into<String>,
  V: Into<Value>,
{
  ObjectContaining {
    fields: fields
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .collect(),
  }
}

pub fn array_containing<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> ArrayContaining {
  ArrayContaining {
    items: items.into_iter().map(Into::into).collect(),
  }
}

pub fn string_containing(needle: impl Into<String>) -> StringContaining {
  StringContaining {
    needle: needle.into(),
  }
}

pub fn any(kind: ValueKind) -> Any {
  Any { kind }
}

pub fn anything() -> Anything {
  Anything
}

pub fn predicate(
  description: impl Into<String>,
  predicate: impl Fn(&Value) -> bool + 'static,
) -> Predicate {
  Predicate {
    description: description.into(),
    predicate: Box::new(predicate),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn object_containing_ignores_extra_fields() {
    let pattern = object_containing([("someProperty", "someValue")]);
    let data = Value::object([
      ("someProperty", "someValue"),
      ("somethingElse", "dontCare"),
    ]);
    assert!(pattern.matches(&data));
    assert!(!pattern.matches(&Value::object([("someProperty", "other")])));
    assert!(!pattern.matches(&Value::from("someValue")));
  }

  #[test]
  fn array_and_string_patterns() {
    let data = Value::array([1, 2, 3]);
    assert!(array_containing([3, 1]).matches(&data));
    assert!(!array_containing([4]).matches(&data));

    assert!(string_containing("bar").matches(&Value::from("foobar")));
    assert!(!string_containing("baz").matches(&Value::from("foobar")));
  }

  #[test]
  fn kind_patterns() {
    assert!(any(ValueKind::Error).matches(&Value::error("x")));
    assert!(!any(ValueKind::String).matches(&Value::from(1)));
    assert!(anything().matches(&Value::from(false)));
    assert!(!anything().matches(&Value::Undefined));
  }

  #[test]
  fn descriptions() {
    assert_eq!(
      object_containing([("a", 1)]).to_string(),
      r#"objectContaining({"a":1})"#
    );
    assert_eq!(any(ValueKind::Number).to_string(), "any(number)");
    assert_eq!(
      predicate("an even number", |_| true).to_string(),
      "an even number"
    );
  }
}
