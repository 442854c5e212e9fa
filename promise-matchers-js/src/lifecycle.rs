//! Per-test installation of the promise matchers.
//!
//! [`install`] prepares a [`Host`] for one test and returns an [`Installation`] recording what it
//! changed; [`Installation::uninstall`] (or dropping the installation) puts the host back.

use crate::error::MatcherError;
use crate::host::Host;
use crate::matchers::Expectation;
use crate::promise::ConstructorKind;
use crate::promise::Promise;
use crate::promise::PromiseConstructor;
use crate::reconcile::reconcile;
use crate::reconcile::Advance;
use crate::reconcile::Assertion;
use crate::verdict::DeferredVerdict;
use crate::verdict::Report;
use crate::verdict::VerdictStyle;
use serde::Deserialize;
use serde::Serialize;
use std::marker::PhantomData;

/// Options for [`install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallOptions {
  /// Switch the host clock to virtual time for the test, and advance it after every assertion
  /// so already-settled promises are observed within the assertion call.
  pub use_virtual_clock: bool,
  /// How far each assertion advances the virtual clock.
  pub tick_ms: u64,
}

impl Default for InstallOptions {
  fn default() -> Self {
    Self {
      use_virtual_clock: true,
      tick_ms: 1,
    }
  }
}

impl InstallOptions {
  /// Options that leave the clock in real time.
  pub fn real_time() -> Self {
    Self {
      use_virtual_clock: false,
      ..Self::default()
    }
  }
}

/// Installs the matchers with the deferred-verdict style.
///
/// See [`install_with_style`].
pub fn install(host: &Host, options: InstallOptions) -> Installation<DeferredVerdict> {
  install_with_style(host, options)
}

/// Installs the matchers on `host`:
///
/// - records the host's promise constructor, and installs a polyfill only when it has none;
/// - switches the clock to virtual time when `options.use_virtual_clock` is set.
///
/// Installing twice without uninstalling is a caller error; it is logged and then proceeds. Use
/// [`try_install`] to get an error instead.
pub fn install_with_style<S: VerdictStyle>(host: &Host, options: InstallOptions) -> Installation<S> {
  if host.is_installed() {
    tracing::warn!("promise matchers installed twice without an uninstall in between");
  }
  Installation::new(host, options)
}

/// Like [`install_with_style`], but fails with [`MatcherError::AlreadyInstalled`] when a previous
/// installation on `host` is still live.
pub fn try_install<S: VerdictStyle>(
  host: &Host,
  options: InstallOptions,
) -> Result<Installation<S>, MatcherError> {
  if host.is_installed() {
    return Err(MatcherError::AlreadyInstalled);
  }
  Ok(Installation::new(host, options))
}

/// The per-test lifecycle state: what [`install`] replaced, and whether the virtual clock is in
/// use.
///
/// Restores the host on [`Installation::uninstall`] or on drop, whichever comes first.
pub struct Installation<S: VerdictStyle = DeferredVerdict> {
  host: Host,
  original: Option<PromiseConstructor>,
  options: InstallOptions,
  switched_clock: bool,
  restored: bool,
  _style: PhantomData<S>,
}

impl<S: VerdictStyle> Installation<S> {
  fn new(host: &Host, options: InstallOptions) -> Self {
    let original = host.promise_constructor();
    if original.is_none() {
      host.set_promise_constructor(Some(PromiseConstructor::polyfill()));
    }
    // An outer installation may already run the clock in virtual time; only the one that
    // switched it switches it back.
    let switched_clock = options.use_virtual_clock && host.clock().install();
    host.enter_installation();
    tracing::debug!(
      style = S::NAME,
      polyfilled = original.is_none(),
      virtual_clock = options.use_virtual_clock,
      switched_clock,
      "promise matchers installed"
    );

    Self {
      host: host.clone(),
      original,
      options,
      switched_clock,
      restored: false,
      _style: PhantomData,
    }
  }

  pub fn host(&self) -> &Host {
    &self.host
  }

  pub fn options(&self) -> InstallOptions {
    self.options
  }

  pub fn uses_virtual_clock(&self) -> bool {
    self.options.use_virtual_clock
  }

  /// The constructor the host had before installation, if any.
  pub fn original_constructor(&self) -> Option<&PromiseConstructor> {
    self.original.as_ref()
  }

  /// Whether installation had to add a polyfill.
  pub fn polyfilled(&self) -> bool {
    self.original.is_none()
      && self
        .host
        .promise_constructor()
        .is_some_and(|ctor| ctor.kind() == ConstructorKind::Polyfill)
  }

  /// Starts an assertion about `promise`.
  pub fn expect<'a>(&'a self, promise: &'a Promise) -> Expectation<'a, S> {
    Expectation::new(self, promise)
  }

  /// Restores the host: the recorded promise constructor (possibly none), and the real-time
  /// clock if this installation switched it to virtual time.
  pub fn uninstall(mut self) {
    self.restore();
  }

  pub(crate) fn run(&self, promise: &Promise, assertion: Assertion, reporter: Box<dyn Report>) {
    let advance = self.options.use_virtual_clock.then_some(Advance {
      host: &self.host,
      tick_ms: self.options.tick_ms,
    });
    reconcile(promise, assertion, reporter, advance);
  }

  fn restore(&mut self) {
    if std::mem::replace(&mut self.restored, true) {
      return;
    }
    self.host.set_promise_constructor(self.original.take());
    if self.switched_clock {
      self.host.clock().uninstall();
    }
    self.host.leave_installation();
    tracing::debug!(style = S::NAME, "promise matchers uninstalled");
  }
}

impl<S: VerdictStyle> Drop for Installation<S> {
  fn drop(&mut self) {
    self.restore();
  }
}

impl<S: VerdictStyle> std::fmt::Debug for Installation<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Installation")
      .field("style", &S::NAME)
      .field("options", &self.options)
      .field("switched_clock", &self.switched_clock)
      .field("original", &self.original.as_ref().map(|ctor| ctor.kind()))
      .field("restored", &self.restored)
      .finish()
  }
}
