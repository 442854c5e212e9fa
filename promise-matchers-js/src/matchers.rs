//! The assertion surface: `installation.expect(&promise).not().to_be_rejected_with(..)`.

use crate::error::MatcherError;
use crate::expectation::ExpectationDescriptor;
use crate::expectation::PayloadMatcher;
use crate::lifecycle::Installation;
use crate::promise::Promise;
use crate::reconcile::Assertion;
use crate::registry::Matchers;
use crate::registry::PromiseMatcher;
use crate::verdict::DeferredReport;
use crate::verdict::DeferredVerdict;
use crate::verdict::Done;
use crate::verdict::SynchronousReport;
use crate::verdict::SynchronousVerdict;
use crate::verdict::Verdict;
use crate::verdict::VerdictStyle;
use std::cell::RefCell;
use std::rc::Rc;

/// A pending assertion about one promise.
#[must_use = "an expectation does nothing until one of its matchers is called"]
pub struct Expectation<'a, S: VerdictStyle> {
  installation: &'a Installation<S>,
  promise: &'a Promise,
  negated: bool,
}

impl<'a, S: VerdictStyle> Expectation<'a, S> {
  pub(crate) fn new(installation: &'a Installation<S>, promise: &'a Promise) -> Self {
    Self {
      installation,
      promise,
      negated: false,
    }
  }

  /// Negates the assertion.
  pub fn not(mut self) -> Self {
    self.negated = !self.negated;
    self
  }

  fn assertion(&self, matcher: PromiseMatcher, payload: Option<PayloadMatcher>) -> Assertion {
    Assertion {
      matcher,
      descriptor: ExpectationDescriptor::new(matcher.expected_state(), payload),
      negated: self.negated,
    }
  }
}

impl Expectation<'_, DeferredVerdict> {
  fn deferred(self, matcher: PromiseMatcher, payload: Option<PayloadMatcher>, done: Done) -> Verdict {
    let assertion = self.assertion(matcher, payload);
    self.installation.run(
      self.promise,
      assertion,
      Box::new(DeferredReport::new(done)),
    );
    Verdict::placeholder()
  }

  pub fn to_be_resolved(self, done: Done) -> Verdict {
    self.deferred(PromiseMatcher::ToBeResolved, None, done)
  }

  pub fn to_be_resolved_with(self, expected: impl Into<PayloadMatcher>, done: Done) -> Verdict {
    self.deferred(PromiseMatcher::ToBeResolvedWith, Some(expected.into()), done)
  }

  pub fn to_be_rejected(self, done: Done) -> Verdict {
    self.deferred(PromiseMatcher::ToBeRejected, None, done)
  }

  pub fn to_be_rejected_with(self, expected: impl Into<PayloadMatcher>, done: Done) -> Verdict {
    self.deferred(PromiseMatcher::ToBeRejectedWith, Some(expected.into()), done)
  }
}

impl Expectation<'_, SynchronousVerdict> {
  fn synchronous(self, matcher: PromiseMatcher, payload: Option<PayloadMatcher>) -> Verdict {
    let assertion = self.assertion(matcher, payload);
    let slot = Rc::new(RefCell::new(None));
    self.installation.run(
      self.promise,
      assertion,
      Box::new(SynchronousReport::new(slot.clone())),
    );
    let verdict = slot.borrow_mut().take();
    verdict.unwrap_or_else(Verdict::placeholder)
  }

  pub fn to_be_resolved(self) -> Verdict {
    self.synchronous(PromiseMatcher::ToBeResolved, None)
  }

  pub fn to_be_resolved_with(self, expected: impl Into<PayloadMatcher>) -> Verdict {
    self.synchronous(PromiseMatcher::ToBeResolvedWith, Some(expected.into()))
  }

  pub fn to_be_rejected(self) -> Verdict {
    self.synchronous(PromiseMatcher::ToBeRejected, None)
  }

  pub fn to_be_rejected_with(self, expected: impl Into<PayloadMatcher>) -> Verdict {
    self.synchronous(PromiseMatcher::ToBeRejectedWith, Some(expected.into()))
  }
}

impl Installation<DeferredVerdict> {
  /// Runs the matcher registered as `name`, the way a framework dispatches `expect(x)[name]`.
  pub fn compare(
    &self,
    matchers: &Matchers,
    name: &str,
    promise: &Promise,
    expected: Option<PayloadMatcher>,
    negated: bool,
    done: Done,
  ) -> Result<Verdict, MatcherError> {
    let matcher = matchers
      .get(name)
      .ok_or_else(|| MatcherError::UnknownMatcher(name.to_string()))?;
    let descriptor = matcher.descriptor(expected)?;
    self.run(
      promise,
      Assertion {
        matcher,
        descriptor,
        negated,
      },
      Box::new(DeferredReport::new(done)),
    );
    Ok(Verdict::placeholder())
  }
}
