//! The environment a test runs in.
//!
//! A [`Host`] plays the role of the global object for one test: it holds the current promise
//! constructor (possibly none, like an engine without native promises) and the ambient clock.
//! Tests own their host and pass it explicitly, so no state is shared between tests.

use crate::clock::Clock;
use crate::error::MatcherError;
use crate::promise::Promise;
use crate::promise::PromiseConstructor;
use crate::promise::Resolvers;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct HostState {
  promise: Option<PromiseConstructor>,
  clock: Clock,
  // Live installations.
  installs: usize,
}

/// A cloneable handle to a test's environment.
#[derive(Clone, Default)]
pub struct Host {
  state: Rc<RefCell<HostState>>,
}

impl Host {
  /// A host without a promise constructor and with a real-time clock.
  pub fn new() -> Self {
    Self::default()
  }

  /// A host that already provides a native promise constructor.
  pub fn with_native_promise() -> Self {
    let host = Self::new();
    host.set_promise_constructor(Some(PromiseConstructor::native()));
    host
  }

  pub fn promise_constructor(&self) -> Option<PromiseConstructor> {
    self.state.borrow().promise.clone()
  }

  pub fn set_promise_constructor(&self, ctor: Option<PromiseConstructor>) {
    self.state.borrow_mut().promise = ctor;
  }

  pub fn clock(&self) -> Clock {
    self.state.borrow().clock.clone()
  }

  /// Creates a pending promise with the current constructor.
  pub fn new_promise(&self) -> Result<(Promise, Resolvers), MatcherError> {
    let ctor = self
      .promise_constructor()
      .ok_or(MatcherError::NoPromiseConstructor)?;
    Ok(ctor.new_promise())
  }

  /// Performs a microtask checkpoint on the current constructor's queue. Returns the number of
  /// jobs run.
  pub fn run_microtasks(&self) -> usize {
    match self.promise_constructor() {
      Some(ctor) => ctor.queue().perform_microtask_checkpoint(),
      None => 0,
    }
  }

  /// Advances the virtual clock by `ms`.
  ///
  /// Every timer that comes due runs in due-time order, each followed by a microtask checkpoint.
  /// A final checkpoint runs once the clock reaches its target, so `tick(0)` or `tick(1)` flushes
  /// already-scheduled promise reactions.
  pub fn tick(&self, ms: u64) -> Result<(), MatcherError> {
    let clock = self.clock();
    let target = clock.deadline(ms)?;
    while let Some(timer) = clock.take_due_timer(target) {
      tracing::trace!(now_ms = clock.now(), "virtual timer fired");
      timer();
      self.run_microtasks();
    }
    clock.advance_to(target);
    self.run_microtasks();
    Ok(())
  }

  pub(crate) fn enter_installation(&self) {
    self.state.borrow_mut().installs += 1;
  }

  pub(crate) fn leave_installation(&self) {
    let mut state = self.state.borrow_mut();
    state.installs = state.installs.saturating_sub(1);
  }

  /// Whether any installation on this host is still live.
  pub fn is_installed(&self) -> bool {
    self.state.borrow().installs > 0
  }
}

impl fmt::Debug for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.borrow();
    f.debug_struct("Host")
      .field("promise", &state.promise.as_ref().map(|ctor| ctor.kind()))
      .field("clock", &state.clock)
      .field("installs", &state.installs)
      .finish()
  }
}
