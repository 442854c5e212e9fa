use promise_matchers_js::install_with_style;
use promise_matchers_js::object_containing;
use promise_matchers_js::Host;
use promise_matchers_js::InstallOptions;
use promise_matchers_js::SynchronousVerdict;
use promise_matchers_js::Value;

#[test]
fn settled_promise_yields_its_verdict_within_the_call() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::default());
  let promise = host
    .promise_constructor()
    .unwrap()
    .resolved(Value::object([("id", 7)]));

  let verdict = matchers
    .expect(&promise)
    .to_be_resolved_with(object_containing([("id", 7)]));
  assert!(verdict.pass);
  assert_eq!(verdict.message, None);
}

#[test]
fn negated_pass_keeps_the_mismatch_message() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::default());
  let promise = host.promise_constructor().unwrap().rejected("foobar");

  let verdict = matchers.expect(&promise).not().to_be_resolved();
  assert!(verdict.pass);
  assert_eq!(
    verdict.message.as_deref(),
    Some("Expected promise to be resolved but it was rejected instead")
  );
}

#[test]
fn later_settlement_after_one_manual_tick() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::default());
  let (promise, resolvers) = host.new_promise().unwrap();

  // Nothing to observe yet: the placeholder comes back.
  let verdict = matchers.expect(&promise).to_be_resolved();
  assert!(verdict.pass);

  resolvers.resolve(());
  host.tick(1).unwrap();
  assert!(!promise.is_pending());
}

#[test]
#[should_panic(expected = "Expected promise to be resolved but it was rejected instead")]
fn state_mismatch_fails_the_test() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::default());
  let promise = host.promise_constructor().unwrap().rejected(());

  matchers.expect(&promise).to_be_resolved();
}

#[test]
#[should_panic(expected = r#"Expected "foobar" to be "other""#)]
fn payload_mismatch_fails_the_test_on_the_next_tick() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::default());
  let (promise, resolvers) = host.new_promise().unwrap();

  matchers.expect(&promise).to_be_rejected_with("other");
  resolvers.reject("foobar");
  let _ = host.tick(1);
}

#[test]
#[should_panic(expected = r#"Expected promise not to be rejected with "Error: Error message""#)]
fn negated_failure_fails_the_test() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::default());
  let promise = host
    .promise_constructor()
    .unwrap()
    .rejected(Value::error("Error message"));

  matchers
    .expect(&promise)
    .not()
    .to_be_rejected_with(Value::error("Error message"));
}

#[test]
fn real_time_settlement_is_best_effort() {
  let host = Host::with_native_promise();
  let matchers = install_with_style::<SynchronousVerdict>(&host, InstallOptions::real_time());
  let promise = host.promise_constructor().unwrap().resolved(());

  // Without the virtual clock nothing is observed during the call.
  let verdict = matchers.expect(&promise).to_be_rejected();
  assert!(verdict.pass);
  assert_eq!(verdict.message, None);
}
