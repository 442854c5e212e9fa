/// Errors produced by the matcher runtime and lifecycle.
///
/// Assertion mismatches are never reported through this type: they become a failing
/// [`Verdict`](crate::Verdict) instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
  /// The host has no promise constructor installed.
  #[error("no promise constructor is installed on the host")]
  NoPromiseConstructor,

  /// A timer or tick was requested while the clock runs in real time.
  #[error("the clock is running in real time; install the virtual clock first")]
  RealTimeClock,

  /// `install` was called again before the previous installation was uninstalled.
  #[error("promise matchers are already installed on this host")]
  AlreadyInstalled,

  /// No matcher is registered under the requested name.
  #[error("unknown matcher `{0}`")]
  UnknownMatcher(String),

  /// A `*With` matcher was invoked without an expected payload.
  #[error("matcher `{0}` requires an expected payload")]
  MissingExpectedPayload(&'static str),

  /// A payload-less matcher was invoked with an expected payload.
  #[error("matcher `{0}` does not take an expected payload")]
  UnexpectedPayload(&'static str),
}

/// The failure carried by [`Done::fail`](crate::Done::fail).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AssertionFailure {
  pub message: String,
}

impl AssertionFailure {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}
