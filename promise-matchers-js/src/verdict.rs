//! Verdicts and the two ways of handing them to a test.
//!
//! - [`DeferredVerdict`]: the assertion returns [`Verdict::placeholder`] at once, and the real
//!   verdict is signalled later through the test's [`Done`] callback.
//! - [`SynchronousVerdict`]: the observer panics on failure, which fails the running Rust test.
//!   This only yields a verdict within the assertion call when the virtual clock forces
//!   settlement during it.

use crate::error::AssertionFailure;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
  pub pass: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl Verdict {
  pub fn pass() -> Self {
    Self {
      pass: true,
      message: None,
    }
  }

  pub fn fail(message: impl Into<String>) -> Self {
    Self {
      pass: false,
      message: Some(message.into()),
    }
  }

  /// The always-passing result returned before the promise has been observed.
  pub fn placeholder() -> Self {
    Self::pass()
  }
}

type DoneCallback = Box<dyn FnOnce(Result<(), AssertionFailure>)>;

/// The completion callback of an asynchronous test.
///
/// `Done` is consumed when signalled, so a test can only be completed once.
pub struct Done {
  callback: DoneCallback,
}

impl Done {
  pub fn new(callback: impl FnOnce(Result<(), AssertionFailure>) + 'static) -> Self {
    Self {
      callback: Box::new(callback),
    }
  }

  /// A `Done` whose outcome can be polled through the returned handle.
  pub fn recording() -> (Self, DoneHandle) {
    let handle = DoneHandle::default();
    let slot = handle.outcome.clone();
    let done = Self::new(move |outcome| *slot.borrow_mut() = Some(outcome));
    (done, handle)
  }

  /// `done()`.
  pub fn complete(self) {
    (self.callback)(Ok(()))
  }

  /// `done.fail(message)`.
  pub fn fail(self, message: impl Into<String>) {
    (self.callback)(Err(AssertionFailure::new(message)))
  }
}

impl fmt::Debug for Done {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Done").finish_non_exhaustive()
  }
}

/// Observes the outcome of a [`Done::recording`] callback.
#[derive(Clone, Debug, Default)]
pub struct DoneHandle {
  outcome: Rc<RefCell<Option<Result<(), AssertionFailure>>>>,
}

impl DoneHandle {
  pub fn is_called(&self) -> bool {
    self.outcome.borrow().is_some()
  }

  pub fn outcome(&self) -> Option<Result<(), AssertionFailure>> {
    self.outcome.borrow().clone()
  }

  pub fn passed(&self) -> bool {
    matches!(*self.outcome.borrow(), Some(Ok(())))
  }

  /// The failure message, if the test failed.
  pub fn failure(&self) -> Option<String> {
    match &*self.outcome.borrow() {
      Some(Err(failure)) => Some(failure.message.clone()),
      _ => None,
    }
  }
}

/// Receives the verdict of an assertion once its promise has been observed.
pub(crate) trait Report {
  fn report(self: Box<Self>, verdict: Verdict);
}

pub(crate) struct DeferredReport {
  done: Done,
}

impl DeferredReport {
  pub(crate) fn new(done: Done) -> Self {
    Self { done }
  }
}

impl Report for DeferredReport {
  fn report(self: Box<Self>, verdict: Verdict) {
    if verdict.pass {
      self.done.complete();
    } else {
      self
        .done
        .fail(verdict.message.unwrap_or_else(|| "promise matcher failed".to_string()));
    }
  }
}

pub(crate) struct SynchronousReport {
  slot: Rc<RefCell<Option<Verdict>>>,
}

impl SynchronousReport {
  pub(crate) fn new(slot: Rc<RefCell<Option<Verdict>>>) -> Self {
    Self { slot }
  }
}

impl Report for SynchronousReport {
  fn report(self: Box<Self>, verdict: Verdict) {
    let failure = (!verdict.pass).then(|| verdict.message.clone());
    *self.slot.borrow_mut() = Some(verdict);
    if let Some(message) = failure {
      panic!(
        "{}",
        message.unwrap_or_else(|| "promise matcher failed".to_string())
      );
    }
  }
}

/// Selects how an [`Installation`](crate::Installation) hands verdicts to the test.
pub trait VerdictStyle: 'static {
  const NAME: &'static str;
}

/// Verdicts are signalled through a [`Done`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredVerdict;

impl VerdictStyle for DeferredVerdict {
  const NAME: &'static str = "deferred";
}

/// Failed verdicts panic from inside the promise observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynchronousVerdict;

impl VerdictStyle for SynchronousVerdict {
  const NAME: &'static str = "synchronous";
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deferred_report_signals_done() {
    let (done, handle) = Done::recording();
    Box::new(DeferredReport::new(done)).report(Verdict::fail("nope"));
    assert!(handle.is_called());
    assert_eq!(handle.failure().as_deref(), Some("nope"));

    let (done, handle) = Done::recording();
    Box::new(DeferredReport::new(done)).report(Verdict::pass());
    assert!(handle.passed());
  }

  #[test]
  #[should_panic(expected = "nope")]
  fn synchronous_report_panics_on_failure() {
    let slot = Rc::new(RefCell::new(None));
    Box::new(SynchronousReport::new(slot)).report(Verdict::fail("nope"));
  }

  #[test]
  fn verdict_serializes_without_empty_message() {
    assert_eq!(
      serde_json::to_string(&Verdict::pass()).unwrap(),
      r#"{"pass":true}"#
    );
    assert_eq!(
      serde_json::to_string(&Verdict::fail("x")).unwrap(),
      r#"{"pass":false,"message":"x"}"#
    );
  }
}
