//! Named matcher registration.
//!
//! Test frameworks look matchers up by name (`toBeResolved`, ...). [`register_matchers`] adds the
//! four promise matchers to any registry implementing [`MatcherRegistry`].

use crate::error::MatcherError;
use crate::expectation::ExpectationDescriptor;
use crate::expectation::PayloadMatcher;
use crate::expectation::SettledState;
use ahash::AHashMap;

/// The four promise assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseMatcher {
  ToBeResolved,
  ToBeResolvedWith,
  ToBeRejected,
  ToBeRejectedWith,
}

impl PromiseMatcher {
  pub const ALL: [PromiseMatcher; 4] = [
    PromiseMatcher::ToBeResolved,
    PromiseMatcher::ToBeResolvedWith,
    PromiseMatcher::ToBeRejected,
    PromiseMatcher::ToBeRejectedWith,
  ];

  pub fn name(self) -> &'static str {
    match self {
      PromiseMatcher::ToBeResolved => "toBeResolved",
      PromiseMatcher::ToBeResolvedWith => "toBeResolvedWith",
      PromiseMatcher::ToBeRejected => "toBeRejected",
      PromiseMatcher::ToBeRejectedWith => "toBeRejectedWith",
    }
  }

  pub fn expected_state(self) -> SettledState {
    match self {
      PromiseMatcher::ToBeResolved | PromiseMatcher::ToBeResolvedWith => SettledState::Fulfilled,
      PromiseMatcher::ToBeRejected | PromiseMatcher::ToBeRejectedWith => SettledState::Rejected,
    }
  }

  pub fn takes_payload(self) -> bool {
    matches!(
      self,
      PromiseMatcher::ToBeResolvedWith | PromiseMatcher::ToBeRejectedWith
    )
  }

  /// Builds the expectation for this matcher, checking that a payload is given exactly when the
  /// matcher takes one.
  pub fn descriptor(
    self,
    payload: Option<PayloadMatcher>,
  ) -> Result<ExpectationDescriptor, MatcherError> {
    match (self.takes_payload(), payload.is_some()) {
      (true, false) => Err(MatcherError::MissingExpectedPayload(self.name())),
      (false, true) => Err(MatcherError::UnexpectedPayload(self.name())),
      _ => Ok(ExpectationDescriptor::new(self.expected_state(), payload)),
    }
  }
}

/// The registration API a test framework exposes.
pub trait MatcherRegistry {
  fn add_matcher(&mut self, name: &'static str, matcher: PromiseMatcher);
}

/// Registers the four promise matchers under their conventional names.
pub fn register_matchers(registry: &mut dyn MatcherRegistry) {
  for matcher in PromiseMatcher::ALL {
    registry.add_matcher(matcher.name(), matcher);
  }
  tracing::debug!(count = PromiseMatcher::ALL.len(), "registered promise matchers");
}

/// A simple name-keyed matcher registry.
#[derive(Debug, Clone, Default)]
pub struct Matchers {
  by_name: AHashMap<&'static str, PromiseMatcher>,
}

impl Matchers {
  pub fn new() -> Self {
    Self::default()
  }

  /// A registry with the promise matchers already registered.
  pub fn with_promise_matchers() -> Self {
    let mut matchers = Self::new();
    register_matchers(&mut matchers);
    matchers
  }

  pub fn get(&self, name: &str) -> Option<PromiseMatcher> {
    self.by_name.get(name).copied()
  }

  pub fn len(&self) -> usize {
    self.by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_name.is_empty()
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&'static str> {
    let mut names: Vec<_> = self.by_name.keys().copied().collect();
    names.sort_unstable();
    names
  }
}

impl MatcherRegistry for Matchers {
  fn add_matcher(&mut self, name: &'static str, matcher: PromiseMatcher) {
    self.by_name.insert(name, matcher);
  }
}
