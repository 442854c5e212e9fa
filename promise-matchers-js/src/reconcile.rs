//! The reconciliation engine: attaches observers to a promise and turns its settlement into a
//! single verdict.

use crate::expectation::ExpectationDescriptor;
use crate::expectation::SettledState;
use crate::host::Host;
use crate::promise::Promise;
use crate::registry::PromiseMatcher;
use crate::value::Value;
use crate::verdict::Report;
use crate::verdict::Verdict;
use std::cell::RefCell;
use std::rc::Rc;

/// One assertion request: which matcher, what it expects, and whether it was negated.
#[derive(Debug, Clone)]
pub(crate) struct Assertion {
  pub matcher: PromiseMatcher,
  pub descriptor: ExpectationDescriptor,
  pub negated: bool,
}

impl Assertion {
  /// Negation flips only the final polarity; a passing negated verdict keeps the underlying
  /// mismatch message.
  fn verdict(&self, observed: SettledState, value: &Value) -> Verdict {
    let verdict = self.descriptor.evaluate(observed, value);
    if !self.negated {
      return verdict;
    }
    if verdict.pass {
      Verdict::fail(self.descriptor.negated_message())
    } else {
      Verdict {
        pass: true,
        message: verdict.message,
      }
    }
  }
}

/// Forced clock advance after the observers are attached.
pub(crate) struct Advance<'a> {
  pub host: &'a Host,
  pub tick_ms: u64,
}

type Pending = Rc<RefCell<Option<(Assertion, Box<dyn Report>)>>>;

/// Attaches the observers, forces a tick when asked to, and reports exactly once.
///
/// A promise that never settles never reports.
pub(crate) fn reconcile(
  promise: &Promise,
  assertion: Assertion,
  reporter: Box<dyn Report>,
  advance: Option<Advance<'_>>,
) {
  let pending: Pending = Rc::new(RefCell::new(Some((assertion, reporter))));
  let on_rejected = pending.clone();
  promise.then(
    move |value| observe(&pending, SettledState::Fulfilled, value),
    move |reason| observe(&on_rejected, SettledState::Rejected, reason),
  );

  if let Some(Advance { host, tick_ms }) = advance {
    if let Err(err) = host.tick(tick_ms) {
      tracing::warn!(%err, "could not advance the virtual clock after attaching promise observers");
    }
  }
}

fn observe(pending: &Pending, observed: SettledState, value: Value) {
  let taken = pending.borrow_mut().take();
  let Some((assertion, reporter)) = taken else {
    return;
  };
  tracing::trace!(%observed, %value, "promise observer fired");

  let verdict = assertion.verdict(observed, &value);
  tracing::debug!(
    matcher = assertion.matcher.name(),
    pass = verdict.pass,
    negated = assertion.negated,
    "promise matcher verdict"
  );
  reporter.report(verdict);
}
