//! Contract Test: Failure Isolation
//!
//! Constraints verified:
//! - A lookup failure makes no create/update call and is logged
//! - Mutation failures are logged and end the pass
//! - Failing passes never stop the scheduler; later ticks keep running
//!
//! If this test fails, an error inside a pass has escaped its boundary.

mod common;

use common::*;
use ddns6_core::error::Mutation;
use ddns6_core::{Error, Reconciler, Scheduler};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_err;

#[tokio::test]
async fn lookup_failure_makes_no_mutation() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let source = StaticAddressSource::new(Some(v6("2001:db8::1")));
    let repository = MockRepository::new();
    repository.fail_find(true);

    let reconciler = Reconciler::new(
        Box::new(source.clone()),
        Box::new(repository.clone()),
        test_domain(),
    );

    let err = assert_err!(reconciler.try_reconcile().await);
    assert!(matches!(err, Error::Lookup(_)));

    assert_eq!(reconciler.reconcile_once().await, None);
    assert!(repository.created().is_empty());
    assert!(repository.updated().is_empty());
    assert!(logs.contains("record lookup failed"));
}

#[tokio::test]
async fn update_failure_is_reported_as_mutation_failure() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let source = StaticAddressSource::new(Some(v6("2001:db8::2")));
    let repository = MockRepository::new().with_record("42", "home", "2001:db8::1");
    repository.fail_update(true);

    let reconciler = Reconciler::new(
        Box::new(source.clone()),
        Box::new(repository.clone()),
        test_domain(),
    );

    let err = assert_err!(reconciler.try_reconcile().await);
    assert!(matches!(
        err,
        Error::Mutation {
            operation: Mutation::Update,
            ..
        }
    ));

    assert_eq!(reconciler.reconcile_once().await, None);
    assert!(logs.contains("record update failed"));
    assert_eq!(repository.records()[0].value, "2001:db8::1", "remote stays stale");
}

#[tokio::test]
async fn create_failure_is_reported_as_mutation_failure() {
    let source = StaticAddressSource::new(Some(v6("2001:db8::1")));
    let repository = MockRepository::new();
    repository.fail_create(true);

    let reconciler = Reconciler::new(
        Box::new(source.clone()),
        Box::new(repository.clone()),
        test_domain(),
    );

    let err = assert_err!(reconciler.try_reconcile().await);
    assert_eq!(err.to_string(), "record creation failed: Provider error (mock): AddDomainRecord rejected");
}

#[tokio::test]
async fn scheduler_survives_lookup_failures() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let source = StaticAddressSource::new(Some(v6("2001:db8::1")));
    let repository = MockRepository::new();
    repository.fail_find(true);

    let reconciler = Arc::new(Reconciler::new(
        Box::new(source.clone()),
        Box::new(repository.clone()),
        test_domain(),
    ));

    let scheduler = Scheduler::new(Duration::from_millis(10));
    let report = scheduler
        .run(
            move || {
                let reconciler = Arc::clone(&reconciler);
                async move { reconciler.try_reconcile().await }
            },
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await;

    assert!(report.started >= 3, "ticks kept coming: {:?}", report);
    assert!(report.failed >= 3, "every pass failed: {:?}", report);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.panicked, 0);
    assert!(repository.find_call_count() >= 3);
    assert!(repository.created().is_empty());
    assert!(logs.contains("record lookup failed"));
}

#[tokio::test]
async fn scheduler_recovers_once_provider_is_back() {
    let source = StaticAddressSource::new(Some(v6("2001:db8::1")));
    let repository = MockRepository::new();
    repository.fail_find(true);

    let reconciler = Arc::new(Reconciler::new(
        Box::new(source.clone()),
        Box::new(repository.clone()),
        test_domain(),
    ));

    let healer = repository.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        healer.fail_find(false);
    });

    let scheduler = Scheduler::new(Duration::from_millis(10));
    let report = scheduler
        .run(
            move || {
                let reconciler = Arc::clone(&reconciler);
                async move { reconciler.try_reconcile().await }
            },
            tokio::time::sleep(Duration::from_millis(150)),
        )
        .await;

    assert!(report.failed >= 1, "{:?}", report);
    assert!(report.succeeded >= 1, "{:?}", report);
    assert_eq!(repository.records().len(), 1, "record created after recovery");
}
