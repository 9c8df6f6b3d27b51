use std::panic::{self, AssertUnwindSafe};
use std::sync::Barrier;
use std::thread;

use lazyprop_demos::calc::Calc;
use lazyprop_demos::flaky::Flaky;
use lazyprop_demos::person::Person;
use lazyprop_demos::report::Report;
use lazyprop_demos::wrapper::Wrapper;

/// Test that a property is computed once and then frozen.
#[test]
fn test_sequential_caching() {
    let mut person = Person::new("Ada", "Lovelace");
    assert_eq!(person.calls(), 0);
    assert_eq!(person.FullName(), "Ada Lovelace");
    assert_eq!(person.FullName(), "Ada Lovelace");
    assert_eq!(person.calls(), 1);

    // Inputs may change, the cached value does not.
    person.first_name = "Augusta".into();
    assert_eq!(person.FullName(), "Ada Lovelace");
    assert_eq!(person.calls(), 1);
}

/// Test that the value is cached per instance.
#[test]
fn test_instances_are_independent() {
    let first = Person::new("Ada", "Lovelace");
    let second = Person::new("Charles", "Babbage");
    assert_eq!(second.FullName(), "Charles Babbage");
    assert_eq!(first.calls(), 0);
    assert_eq!(first.FullName(), "Ada Lovelace");
}

/// Test that concurrent first accesses compute exactly once.
#[test]
fn test_thread_safe_exactly_once() {
    let calc = Calc::new(3, 4);
    let barrier = Barrier::new(16);
    thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                barrier.wait();
                assert_eq!(*calc.Sum(), 7);
            });
        }
    });
    assert_eq!(calc.calls(), 1);
    assert_eq!(*calc.Sum(), 7);
    assert_eq!(calc.calls(), 1);
}

/// Test that two properties of one method each call it once.
#[test]
fn test_sibling_properties() {
    let report = Report::new(vec![1, 2, 3, 6]);
    assert_eq!(*report.Total(), 12);
    assert_eq!(report.totals(), 1);
    assert_eq!(*report.TotalAgain(), 12);
    assert_eq!(report.totals(), 2);
    assert_eq!(*report.Total(), 12);
    assert_eq!(*report.TotalAgain(), 12);
    assert_eq!(report.totals(), 2);
}

/// Test constant names and custom field prefixes.
#[test]
fn test_named_by_constant() {
    let report = Report::new(vec![2, 4]);
    assert!(!report.has_average());
    assert_eq!(*report.Average(), 3);
    assert!(report.has_average());
    assert_eq!(report.unused(), 0);
}

/// Test that a failed computation leaves the property unset.
#[test]
fn test_retry_after_panic() {
    let flaky = Flaky::default();
    let result = panic::catch_unwind(AssertUnwindSafe(|| *flaky.Value()));
    assert!(result.is_err());
    assert_eq!(flaky.attempts(), 1);

    // The lock was released and the next access computes again.
    assert_eq!(*flaky.Value(), 42);
    assert_eq!(*flaky.Value(), 42);
    assert_eq!(flaky.attempts(), 2);
}

/// Test a property of a generic struct.
#[test]
fn test_generic_struct() {
    let wrapper = Wrapper::new(vec![1, 2]);
    assert_eq!(wrapper.Doubled(), &[1, 2, 1, 2]);

    let words = Wrapper::new(vec!["a"]);
    assert_eq!(words.Doubled().len(), 2);
}
