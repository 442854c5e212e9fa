use promise_matchers_js::install;
use promise_matchers_js::try_install;
use promise_matchers_js::ClockMode;
use promise_matchers_js::ConstructorKind;
use promise_matchers_js::DeferredVerdict;
use promise_matchers_js::Done;
use promise_matchers_js::Host;
use promise_matchers_js::InstallOptions;
use promise_matchers_js::MatcherError;
use promise_matchers_js::PromiseConstructor;

#[test]
fn installs_a_polyfill_only_when_the_host_has_none() {
  let host = Host::new();
  let matchers = install(&host, InstallOptions::default());
  assert!(matchers.polyfilled());
  assert!(matchers.original_constructor().is_none());
  assert_eq!(
    host.promise_constructor().map(|ctor| ctor.kind()),
    Some(ConstructorKind::Polyfill)
  );

  matchers.uninstall();
  assert!(host.promise_constructor().is_none());
}

#[test]
fn never_overrides_a_native_constructor() {
  let host = Host::with_native_promise();
  let native = host.promise_constructor().unwrap();

  let matchers = install(&host, InstallOptions::default());
  assert!(!matchers.polyfilled());
  assert!(host.promise_constructor().unwrap().ptr_eq(&native));
  assert!(matchers.original_constructor().unwrap().ptr_eq(&native));

  matchers.uninstall();
  assert!(host.promise_constructor().unwrap().ptr_eq(&native));
}

#[test]
fn restores_the_recorded_constructor_even_if_replaced_during_the_test() {
  let host = Host::with_native_promise();
  let native = host.promise_constructor().unwrap();
  let matchers = install(&host, InstallOptions::default());

  host.set_promise_constructor(Some(PromiseConstructor::polyfill()));
  matchers.uninstall();
  assert!(host.promise_constructor().unwrap().ptr_eq(&native));
}

#[test]
fn virtual_clock_is_installed_and_restored() {
  let host = Host::with_native_promise();
  assert_eq!(host.clock().mode(), ClockMode::Real);

  let matchers = install(&host, InstallOptions::default());
  assert!(matchers.uses_virtual_clock());
  assert_eq!(host.clock().mode(), ClockMode::Virtual);
  host.clock().set_timeout(50, || {}).unwrap();

  matchers.uninstall();
  assert_eq!(host.clock().mode(), ClockMode::Real);
  assert_eq!(host.clock().pending_timers(), 0);
}

#[test]
fn real_time_installation_leaves_the_clock_alone() {
  let host = Host::with_native_promise();
  let matchers = install(&host, InstallOptions::real_time());
  assert!(!matchers.uses_virtual_clock());
  assert_eq!(host.clock().mode(), ClockMode::Real);
  assert_eq!(host.tick(1).unwrap_err(), MatcherError::RealTimeClock);
  matchers.uninstall();
}

#[test]
fn uninstall_without_assertions_is_safe() {
  let host = Host::new();
  install(&host, InstallOptions::default()).uninstall();
  assert!(!host.is_installed());
  assert!(host.promise_constructor().is_none());
}

#[test]
fn dropping_the_installation_restores_the_host() {
  let host = Host::new();
  {
    let _matchers = install(&host, InstallOptions::default());
    assert!(host.is_installed());
    assert!(host.clock().is_virtual());
  }
  assert!(!host.is_installed());
  assert!(!host.clock().is_virtual());
  assert!(host.promise_constructor().is_none());
}

#[test]
fn each_test_starts_from_a_clean_slate() {
  let host = Host::new();
  for _ in 0..3 {
    assert!(host.promise_constructor().is_none());
    assert!(!host.clock().is_virtual());

    let matchers = install(&host, InstallOptions::default());
    let (promise, resolvers) = host.new_promise().unwrap();
    resolvers.resolve(());
    let (done, outcome) = Done::recording();
    matchers.expect(&promise).to_be_resolved(done);
    assert!(outcome.passed());
    matchers.uninstall();
  }
}

#[test]
fn try_install_rejects_a_second_live_installation() {
  let host = Host::new();
  let first = try_install::<DeferredVerdict>(&host, InstallOptions::default()).unwrap();
  assert_eq!(
    try_install::<DeferredVerdict>(&host, InstallOptions::default()).unwrap_err(),
    MatcherError::AlreadyInstalled
  );

  first.uninstall();
  assert!(try_install::<DeferredVerdict>(&host, InstallOptions::default()).is_ok());
}

#[test]
fn nested_uninstall_leaves_the_outer_installation_working() {
  let host = Host::new();
  let outer = install(&host, InstallOptions::default());
  let (promise, resolvers) = host.new_promise().unwrap();
  host
    .clock()
    .set_timeout(5, move || resolvers.resolve("late"))
    .unwrap();
  host.tick(2).unwrap();

  let inner = install(&host, InstallOptions::default());
  assert_eq!(host.clock().now(), 2);
  inner.uninstall();

  assert!(host.is_installed());
  assert!(host.clock().is_virtual());
  assert_eq!(
    try_install::<DeferredVerdict>(&host, InstallOptions::default()).unwrap_err(),
    MatcherError::AlreadyInstalled
  );

  let settled = host.promise_constructor().unwrap().resolved(());
  let (done, outcome) = Done::recording();
  outer.expect(&settled).to_be_resolved(done);
  assert!(outcome.passed());

  // The outer timer still fires at its original due time.
  let (done, outcome) = Done::recording();
  outer.expect(&promise).to_be_resolved_with("late", done);
  assert!(!outcome.is_called());
  host.tick(2).unwrap();
  assert!(outcome.passed());

  outer.uninstall();
  assert!(!host.is_installed());
  assert!(!host.clock().is_virtual());
  assert!(host.promise_constructor().is_none());
}
