//! Promise matchers for JavaScript-style test suites.
//!
//! Assertions about a promise's eventual state, without the test chaining `then` callbacks by
//! hand:
//!
//! ```
//! use promise_matchers_js::{install, Done, Host, InstallOptions, Value};
//!
//! let host = Host::with_native_promise();
//! let matchers = install(&host, InstallOptions::default());
//!
//! let (promise, resolvers) = host.new_promise().unwrap();
//! resolvers.reject(Value::error("Some error"));
//!
//! let (done, outcome) = Done::recording();
//! matchers
//!   .expect(&promise)
//!   .not()
//!   .to_be_rejected_with(Value::error("Error message"), done);
//! // The virtual clock was advanced by the assertion, so the verdict is already in.
//! assert!(outcome.passed());
//!
//! matchers.uninstall();
//! ```
//!
//! # Pieces
//!
//! - A small promise runtime: [`Promise`], [`Resolvers`], [`PromiseConstructor`], a FIFO
//!   [`JobQueue`] of reaction jobs, and a [`Clock`] that can run in virtual time. A [`Host`] ties
//!   them together for one test.
//! - The lifecycle: [`install`] / [`Installation::uninstall`] install a polyfill constructor when
//!   the host has none and optionally switch the clock to virtual time.
//! - The reconciliation engine behind [`Expectation`]: observers are attached to the promise, the
//!   virtual clock is advanced by one tick, and the observed settlement is compared with an
//!   [`ExpectationDescriptor`] to produce exactly one [`Verdict`].
//!
//! # Verdict styles
//!
//! With [`DeferredVerdict`] (the default) every matcher takes a [`Done`] and returns
//! [`Verdict::placeholder`]; the real outcome arrives through `Done` once the promise has been
//! observed. With [`SynchronousVerdict`] a failing observer panics, so the verdict is only known
//! within the assertion call when the virtual clock forces settlement.
//!
//! A promise that never settles never produces a verdict; the surrounding test's own timeout is
//! what ends such a test.

mod clock;
mod error;
mod expectation;
mod host;
mod job_queue;
mod lifecycle;
mod matchers;
mod pattern;
mod promise;
mod reconcile;
mod registry;
mod value;
mod verdict;

pub use crate::clock::Clock;
pub use crate::clock::ClockMode;
pub use crate::clock::TimerId;
pub use crate::error::AssertionFailure;
pub use crate::error::MatcherError;
pub use crate::expectation::ExpectationDescriptor;
pub use crate::expectation::PayloadMatcher;
pub use crate::expectation::SettledState;
pub use crate::host::Host;
pub use crate::job_queue::Job;
pub use crate::job_queue::JobQueue;
pub use crate::lifecycle::install;
pub use crate::lifecycle::install_with_style;
pub use crate::lifecycle::try_install;
pub use crate::lifecycle::InstallOptions;
pub use crate::lifecycle::Installation;
pub use crate::matchers::Expectation;
pub use crate::pattern::any;
pub use crate::pattern::anything;
pub use crate::pattern::array_containing;
pub use crate::pattern::object_containing;
pub use crate::pattern::predicate;
pub use crate::pattern::string_containing;
pub use crate::pattern::Any;
pub use crate::pattern::Anything;
pub use crate::pattern::ArrayContaining;
pub use crate::pattern::ObjectContaining;
pub use crate::pattern::Pattern;
pub use crate::pattern::Predicate;
pub use crate::pattern::StringContaining;
pub use crate::promise::ConstructorKind;
pub use crate::promise::Promise;
pub use crate::promise::PromiseConstructor;
pub use crate::promise::PromiseReactionType;
pub use crate::promise::PromiseState;
pub use crate::promise::Resolvers;
pub use crate::registry::register_matchers;
pub use crate::registry::MatcherRegistry;
pub use crate::registry::Matchers;
pub use crate::registry::PromiseMatcher;
pub use crate::value::ErrorValue;
pub use crate::value::Value;
pub use crate::value::ValueKind;
pub use crate::verdict::DeferredVerdict;
pub use crate::verdict::Done;
pub use crate::verdict::DoneHandle;
pub use crate::verdict::SynchronousVerdict;
pub use crate::verdict::Verdict;
pub use crate::verdict::VerdictStyle;
