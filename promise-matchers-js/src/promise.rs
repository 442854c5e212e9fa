//! A settle-once promise record and the constructor that creates it.
//!
//! Promises here follow the ECMA-262 job model closely enough for assertions to observe them the
//! way a test would observe a real JavaScript promise:
//!
//! - A promise is `Pending` until it settles, then `Fulfilled` or `Rejected` forever.
//! - Reactions are never run synchronously. Settling (or attaching to an already-settled promise)
//!   enqueues a job onto the constructor's [`JobQueue`], and the job runs at the next microtask
//!   checkpoint.
//! - [`Resolvers`] carry the "already resolved" flag of `CreateResolvingFunctions`, so only the
//!   first `resolve`/`reject` call has any effect.

use crate::job_queue::Job;
use crate::job_queue::JobQueue;
use crate::value::ErrorValue;
use crate::value::Value;
use std::cell::Cell;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// The value of a promise's `[[PromiseState]]` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
  Pending,
  Fulfilled,
  Rejected,
}

/// Which reaction list a settlement triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseReactionType {
  Fulfill,
  Reject,
}

#[derive(Clone, Debug)]
enum PromiseRecordState {
  Pending,
  Fulfilled(Value),
  Rejected(Value),
}

type Reaction = Box<dyn FnOnce(Value)>;

struct PromiseInner {
  state: PromiseRecordState,
  fulfill_reactions: Vec<Reaction>,
  reject_reactions: Vec<Reaction>,
}

/// A deferred value.
///
/// Cloning yields another handle to the same promise.
#[derive(Clone)]
pub struct Promise {
  inner: Rc<RefCell<PromiseInner>>,
  queue: JobQueue,
}

impl Promise {
  fn pending(queue: JobQueue) -> Self {
    Self {
      inner: Rc::new(RefCell::new(PromiseInner {
        state: PromiseRecordState::Pending,
        fulfill_reactions: Vec::new(),
        reject_reactions: Vec::new(),
      })),
      queue,
    }
  }

  pub fn state(&self) -> PromiseState {
    match self.inner.borrow().state {
      PromiseRecordState::Pending => PromiseState::Pending,
      PromiseRecordState::Fulfilled(_) => PromiseState::Fulfilled,
      PromiseRecordState::Rejected(_) => PromiseState::Rejected,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.state() == PromiseState::Pending
  }

  /// The fulfillment value or rejection reason, once settled.
  pub fn settled_value(&self) -> Option<Value> {
    match &self.inner.borrow().state {
      PromiseRecordState::Pending => None,
      PromiseRecordState::Fulfilled(v) | PromiseRecordState::Rejected(v) => Some(v.clone()),
    }
  }

  /// Attaches a fulfillment observer and a rejection observer (`PerformPromiseThen` without a
  /// derived promise).
  ///
  /// Exactly one of the two observers ever runs, and it always runs from a job, never from inside
  /// this call.
  pub fn then(
    &self,
    on_fulfilled: impl FnOnce(Value) + 'static,
    on_rejected: impl FnOnce(Value) + 'static,
  ) {
    let mut inner = self.inner.borrow_mut();
    let inner = &mut *inner;
    match &inner.state {
      PromiseRecordState::Pending => {
        inner.fulfill_reactions.push(Box::new(on_fulfilled));
        inner.reject_reactions.push(Box::new(on_rejected));
      }
      PromiseRecordState::Fulfilled(value) => {
        let value = value.clone();
        self.queue.enqueue(Job::new(move || on_fulfilled(value)));
      }
      PromiseRecordState::Rejected(reason) => {
        let reason = reason.clone();
        self.queue.enqueue(Job::new(move || on_rejected(reason)));
      }
    }
  }

  /// Transitions out of `Pending` and schedules the matching reactions. A no-op on a settled
  /// promise.
  fn settle(&self, type_: PromiseReactionType, value: Value) {
    let reactions = {
      let mut inner = self.inner.borrow_mut();
      if !matches!(inner.state, PromiseRecordState::Pending) {
        return;
      }
      let fulfill = mem::take(&mut inner.fulfill_reactions);
      let reject = mem::take(&mut inner.reject_reactions);
      match type_ {
        PromiseReactionType::Fulfill => {
          inner.state = PromiseRecordState::Fulfilled(value.clone());
          fulfill
        }
        PromiseReactionType::Reject => {
          inner.state = PromiseRecordState::Rejected(value.clone());
          reject
        }
      }
    };

    tracing::trace!(?type_, reactions = reactions.len(), "promise settled");
    for reaction in reactions {
      let value = value.clone();
      self.queue.enqueue(Job::new(move || reaction(value)));
    }
  }

  /// Whether both handles refer to the same promise.
  pub fn ptr_eq(&self, other: &Promise) -> bool {
    Rc::ptr_eq(&self.inner, &other.inner)
  }
}

impl fmt::Debug for Promise {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Promise")
      .field("state", &self.inner.borrow().state)
      .finish()
  }
}

/// The resolving functions of a promise (a PromiseCapability record without the promise).
#[derive(Clone)]
pub struct Resolvers {
  promise: Promise,
  already_resolved: Rc<Cell<bool>>,
}

impl Resolvers {
  /// Fulfills the promise with `value`. Ignored once the promise is resolved.
  pub fn resolve(&self, value: impl Into<Value>) {
    if self.already_resolved.replace(true) {
      return;
    }
    self.promise.settle(PromiseReactionType::Fulfill, value.into());
  }

  /// Rejects the promise with `reason`. Ignored once the promise is resolved.
  pub fn reject(&self, reason: impl Into<Value>) {
    if self.already_resolved.replace(true) {
      return;
    }
    self.promise.settle(PromiseReactionType::Reject, reason.into());
  }

  /// Resolves the promise with another promise, adopting its eventual state.
  ///
  /// The promise counts as resolved immediately but stays pending until the adoption job runs
  /// and `other` settles. Resolving a promise with itself rejects it with a `TypeError`.
  pub fn resolve_with_promise(&self, other: &Promise) {
    if self.already_resolved.replace(true) {
      return;
    }
    if self.promise.ptr_eq(other) {
      self.promise.settle(
        PromiseReactionType::Reject,
        Value::Error(ErrorValue::named(
          "TypeError",
          "Chaining cycle detected for promise",
        )),
      );
      return;
    }

    let target = self.promise.clone();
    let thenable = other.clone();
    self.promise.queue.enqueue(Job::new(move || {
      let on_rejected = target.clone();
      thenable.then(
        move |value| target.settle(PromiseReactionType::Fulfill, value),
        move |reason| on_rejected.settle(PromiseReactionType::Reject, reason),
      );
    }));
  }

  pub fn promise(&self) -> &Promise {
    &self.promise
  }
}

impl fmt::Debug for Resolvers {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resolvers")
      .field("already_resolved", &self.already_resolved.get())
      .finish()
  }
}

/// Where a [`PromiseConstructor`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructorKind {
  /// Supplied by the host environment.
  Native,
  /// Installed by [`install`](crate::install) because the host had none.
  Polyfill,
}

/// The promise constructor reference a [`Host`](crate::Host) exposes.
///
/// Every promise created through one constructor schedules its reactions on that constructor's
/// [`JobQueue`].
#[derive(Clone, Debug)]
pub struct PromiseConstructor {
  kind: ConstructorKind,
  queue: JobQueue,
}

impl PromiseConstructor {
  pub fn new(kind: ConstructorKind) -> Self {
    Self {
      kind,
      queue: JobQueue::new(),
    }
  }

  pub fn native() -> Self {
    Self::new(ConstructorKind::Native)
  }

  pub fn polyfill() -> Self {
    Self::new(ConstructorKind::Polyfill)
  }

  pub fn kind(&self) -> ConstructorKind {
    self.kind
  }

  pub fn queue(&self) -> &JobQueue {
    &self.queue
  }

  /// `new Promise((resolve, reject) => ...)`: a pending promise plus its resolving functions.
  pub fn new_promise(&self) -> (Promise, Resolvers) {
    let promise = Promise::pending(self.queue.clone());
    let resolvers = Resolvers {
      promise: promise.clone(),
      already_resolved: Rc::new(Cell::new(false)),
    };
    (promise, resolvers)
  }

  /// `Promise.resolve(value)` for a non-promise value.
  pub fn resolved(&self, value: impl Into<Value>) -> Promise {
    let (promise, resolvers) = self.new_promise();
    resolvers.resolve(value);
    promise
  }

  /// `Promise.reject(reason)`.
  pub fn rejected(&self, reason: impl Into<Value>) -> Promise {
    let (promise, resolvers) = self.new_promise();
    resolvers.reject(reason);
    promise
  }

  /// Reference identity: whether both handles are the same constructor.
  pub fn ptr_eq(&self, other: &PromiseConstructor) -> bool {
    self.queue.ptr_eq(&other.queue)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnOnce(Value)>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let make = move |tag: &'static str| -> Box<dyn FnOnce(Value)> {
      let sink = sink.clone();
      Box::new(move |value: Value| sink.borrow_mut().push(format!("{tag}:{value}")))
    };
    (log, make)
  }

  #[test]
  fn reactions_run_from_jobs_not_synchronously() {
    let ctor = PromiseConstructor::native();
    let (log, make) = recorder();
    let promise = ctor.resolved("foobar");
    promise.then(make("fulfilled"), make("rejected"));

    assert!(log.borrow().is_empty());
    assert_eq!(ctor.queue().perform_microtask_checkpoint(), 1);
    assert_eq!(&*log.borrow(), &["fulfilled:foobar".to_string()]);
  }

  #[test]
  fn settles_once() {
    let ctor = PromiseConstructor::native();
    let (log, make) = recorder();
    let (promise, resolvers) = ctor.new_promise();
    promise.then(make("fulfilled"), make("rejected"));

    resolvers.reject("first");
    resolvers.resolve("second");
    resolvers.reject("third");
    ctor.queue().perform_microtask_checkpoint();

    assert_eq!(promise.state(), PromiseState::Rejected);
    assert_eq!(promise.settled_value(), Some(Value::from("first")));
    assert_eq!(&*log.borrow(), &["rejected:first".to_string()]);
  }

  #[test]
  fn adopts_the_state_of_a_resolving_promise() {
    let ctor = PromiseConstructor::native();
    let (inner, inner_resolvers) = ctor.new_promise();
    let (outer, outer_resolvers) = ctor.new_promise();

    outer_resolvers.resolve_with_promise(&inner);
    // Already resolved: later calls are ignored even though `outer` is still pending.
    outer_resolvers.resolve("ignored");
    ctor.queue().perform_microtask_checkpoint();
    assert!(outer.is_pending());

    inner_resolvers.reject(Value::error("boom"));
    ctor.queue().perform_microtask_checkpoint();
    assert_eq!(outer.state(), PromiseState::Rejected);
    assert_eq!(outer.settled_value(), Some(Value::error("boom")));
  }

  #[test]
  fn resolving_with_itself_is_a_type_error() {
    let ctor = PromiseConstructor::native();
    let (promise, resolvers) = ctor.new_promise();
    resolvers.resolve_with_promise(&promise);

    assert_eq!(promise.state(), PromiseState::Rejected);
    let reason = promise.settled_value().unwrap();
    assert_eq!(reason.as_error().unwrap().name, "TypeError");
  }
}
