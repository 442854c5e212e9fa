//! The ambient clock: real time, or a manually-advanced virtual clock.
//!
//! Only the virtual mode keeps timers. Advancing is driven by [`Host::tick`](crate::Host::tick),
//! which interleaves timer callbacks with microtask checkpoints.

use crate::error::MatcherError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Identifies a timer registered with [`Clock::set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockMode {
  Real,
  Virtual,
}

type TimerCallback = Box<dyn FnOnce()>;

struct ClockState {
  mode: ClockMode,
  now_ms: u64,
  next_id: u64,
  // Keyed by (due time, id): timers with the same due time fire in scheduling order.
  timers: BTreeMap<(u64, TimerId), TimerCallback>,
}

/// A cloneable handle to the host's clock.
#[derive(Clone)]
pub struct Clock {
  state: Rc<RefCell<ClockState>>,
}

impl Default for Clock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock {
  /// A clock in real-time mode.
  pub fn new() -> Self {
    Self {
      state: Rc::new(RefCell::new(ClockState {
        mode: ClockMode::Real,
        now_ms: 0,
        next_id: 1,
        timers: BTreeMap::new(),
      })),
    }
  }

  pub fn mode(&self) -> ClockMode {
    self.state.borrow().mode
  }

  pub fn is_virtual(&self) -> bool {
    self.mode() == ClockMode::Virtual
  }

  /// Switches to virtual mode with the virtual time reset to zero. A clock that is already
  /// virtual keeps its time and timers.
  ///
  /// Returns whether the mode changed.
  pub fn install(&self) -> bool {
    let mut state = self.state.borrow_mut();
    if state.mode == ClockMode::Virtual {
      return false;
    }
    state.mode = ClockMode::Virtual;
    state.now_ms = 0;
    true
  }

  /// Restores real-time mode. Pending virtual timers are discarded without running.
  pub fn uninstall(&self) {
    let discarded = {
      let mut state = self.state.borrow_mut();
      state.mode = ClockMode::Real;
      std::mem::take(&mut state.timers)
    };
    if !discarded.is_empty() {
      tracing::trace!(timers = discarded.len(), "discarded pending virtual timers");
    }
  }

  /// Current virtual time in milliseconds since [`Clock::install`].
  pub fn now(&self) -> u64 {
    self.state.borrow().now_ms
  }

  /// Schedules `callback` to run once the virtual time has advanced by `delay_ms`.
  pub fn set_timeout(
    &self,
    delay_ms: u64,
    callback: impl FnOnce() + 'static,
  ) -> Result<TimerId, MatcherError> {
    let mut state = self.state.borrow_mut();
    if state.mode != ClockMode::Virtual {
      return Err(MatcherError::RealTimeClock);
    }
    let id = TimerId(state.next_id);
    state.next_id += 1;
    let due = state.now_ms.saturating_add(delay_ms);
    state.timers.insert((due, id), Box::new(callback));
    Ok(id)
  }

  /// Cancels a pending timer. Returns whether it was still pending.
  pub fn clear_timeout(&self, id: TimerId) -> bool {
    let mut state = self.state.borrow_mut();
    let key = state.timers.keys().find(|(_, timer)| *timer == id).copied();
    key.and_then(|key| state.timers.remove(&key)).is_some()
  }

  pub fn pending_timers(&self) -> usize {
    self.state.borrow().timers.len()
  }

  /// Pops the earliest timer due at or before `until_ms`, moving the virtual time to its due time.
  pub(crate) fn take_due_timer(&self, until_ms: u64) -> Option<TimerCallback> {
    let mut state = self.state.borrow_mut();
    let (&(due, id), _) = state.timers.iter().next()?;
    if due > until_ms {
      return None;
    }
    state.now_ms = due;
    state.timers.remove(&(due, id))
  }

  /// The virtual time `delta_ms` from now, or an error in real-time mode.
  pub(crate) fn deadline(&self, delta_ms: u64) -> Result<u64, MatcherError> {
    let state = self.state.borrow();
    if state.mode != ClockMode::Virtual {
      return Err(MatcherError::RealTimeClock);
    }
    Ok(state.now_ms.saturating_add(delta_ms))
  }

  pub(crate) fn advance_to(&self, time_ms: u64) {
    let mut state = self.state.borrow_mut();
    state.now_ms = state.now_ms.max(time_ms);
  }
}

impl fmt::Debug for Clock {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.borrow();
    f.debug_struct("Clock")
      .field("mode", &state.mode)
      .field("now_ms", &state.now_ms)
      .field("pending_timers", &state.timers.len())
      .finish()
  }
}
