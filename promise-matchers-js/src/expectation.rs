use crate::pattern::Any;
use crate::pattern::Anything;
use crate::pattern::ArrayContaining;
use crate::pattern::ObjectContaining;
use crate::pattern::Pattern;
use crate::pattern::Predicate;
use crate::pattern::StringContaining;
use crate::value::ErrorValue;
use crate::value::Value;
use crate::verdict::Verdict;
use std::fmt;
use std::rc::Rc;

/// A terminal promise state, as named in assertion messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettledState {
  Fulfilled,
  Rejected,
}

impl fmt::Display for SettledState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      SettledState::Fulfilled => "resolved",
      SettledState::Rejected => "rejected",
    })
  }
}

/// How an expected payload is compared with the observed one.
///
/// The variant is picked once, when the expected payload is converted, and never re-inspected
/// while matching.
#[derive(Clone)]
pub enum PayloadMatcher {
  /// Deep, strict equality.
  Exact(Value),
  /// Matches an observed error whose rendered text (`"Name: message"`) is the same. Any other
  /// observed value is compared by equality, which fails.
  Error(ErrorValue),
  /// Delegates to the pattern's predicate.
  Pattern(Rc<dyn Pattern>),
}

impl PayloadMatcher {
  pub fn pattern(pattern: impl Pattern + 'static) -> Self {
    PayloadMatcher::Pattern(Rc::new(pattern))
  }

  /// Returns the mismatch message, or `None` when `actual` matches.
  pub fn mismatch(&self, actual: &Value) -> Option<String> {
    match self {
      PayloadMatcher::Error(expected) => match actual {
        Value::Error(actual) if actual.to_string() == expected.to_string() => None,
        _ => Some(format!("Expected \"{actual}\" to be \"{expected}\"")),
      },
      PayloadMatcher::Pattern(pattern) => {
        if pattern.matches(actual) {
          None
        } else {
          Some(format!("Expected \"{actual}\" to match {pattern}"))
        }
      }
      PayloadMatcher::Exact(expected) => {
        if actual == expected {
          None
        } else {
          Some(format!("Expected \"{actual}\" to be \"{expected}\""))
        }
      }
    }
  }
}

impl fmt::Display for PayloadMatcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PayloadMatcher::Exact(value) => write!(f, "\"{value}\""),
      PayloadMatcher::Error(err) => write!(f, "\"{err}\""),
      PayloadMatcher::Pattern(pattern) => write!(f, "{pattern}"),
    }
  }
}

impl fmt::Debug for PayloadMatcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PayloadMatcher::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
      PayloadMatcher::Error(err) => f.debug_tuple("Error").field(err).finish(),
      PayloadMatcher::Pattern(pattern) => f
        .debug_tuple("Pattern")
        .field(&pattern.to_string())
        .finish(),
    }
  }
}

impl From<Value> for PayloadMatcher {
  fn from(value: Value) -> Self {
    match value {
      Value::Error(err) => PayloadMatcher::Error(err),
      value => PayloadMatcher::Exact(value),
    }
  }
}

macro_rules! payload_from_value {
  ($($ty:ty),*) => {
    $(
      impl From<$ty> for PayloadMatcher {
        fn from(value: $ty) -> Self {
          PayloadMatcher::from(Value::from(value))
        }
      }
    )*
  };
}

payload_from_value!((), bool, f64, i32, &str, String, ErrorValue, serde_json::Value);

macro_rules! payload_from_pattern {
  ($($ty:ty),*) => {
    $(
      impl From<$ty> for PayloadMatcher {
        fn from(pattern: $ty) -> Self {
          PayloadMatcher::pattern(pattern)
        }
      }
    )*
  };
}

payload_from_pattern!(
  ObjectContaining,
  ArrayContaining,
  StringContaining,
  Any,
  Anything,
  Predicate
);

/// What an assertion expects a promise to settle as.
#[derive(Debug, Clone)]
pub struct ExpectationDescriptor {
  pub state: SettledState,
  /// `None` means the payload is not checked.
  pub payload: Option<PayloadMatcher>,
}

impl ExpectationDescriptor {
  pub fn new(state: SettledState, payload: Option<PayloadMatcher>) -> Self {
    Self { state, payload }
  }

  pub fn resolved() -> Self {
    Self::new(SettledState::Fulfilled, None)
  }

  pub fn resolved_with(payload: impl Into<PayloadMatcher>) -> Self {
    Self::new(SettledState::Fulfilled, Some(payload.into()))
  }

  pub fn rejected() -> Self {
    Self::new(SettledState::Rejected, None)
  }

  pub fn rejected_with(payload: impl Into<PayloadMatcher>) -> Self {
    Self::new(SettledState::Rejected, Some(payload.into()))
  }

  /// Compares an observed settlement against this expectation. The payload is only checked
  /// when the state matches.
  pub fn evaluate(&self, observed: SettledState, value: &Value) -> Verdict {
    if observed != self.state {
      return Verdict::fail(format!(
        "Expected promise to be {} but it was {observed} instead",
        self.state
      ));
    }
    match self
      .payload
      .as_ref()
      .and_then(|payload| payload.mismatch(value))
    {
      Some(message) => Verdict::fail(message),
      None => Verdict::pass(),
    }
  }

  /// The failure message of the negated form when the expectation held.
  pub fn negated_message(&self) -> String {
    match &self.payload {
      Some(payload) => format!("Expected promise not to be {} with {payload}", self.state),
      None => format!("Expected promise not to be {}", self.state),
    }
  }
}
