//! Contract Test: Acknowledged Values Are Verified
//!
//! Constraints verified:
//! - A backend that acknowledges a different value yields `failed`
//! - The failure is a verification mismatch, distinct from a backend error
//! - The check applies to both the create and the patch branch
//! - Extra acknowledged values beyond the submitted one are a mismatch
//!
//! If this test fails, silently mis-applied writes would be reported as
//! successful updates.

mod common;

use common::*;
use dyndns_core::{AddressFamily, Outcome, RecordType, classify};

#[tokio::test]
async fn mismatch_on_create_is_failed() {
    let (reconciler, zone) = reconciler();
    zone.acknowledge_with("1.2.3.4");

    let outcome = reconciler
        .reconcile(DOMAIN, RecordType::A, &classify("8.8.8.8", AddressFamily::V4))
        .await;

    assert_eq!(outcome.outcome, Outcome::Failed);
    assert!(!outcome.is_success());
    assert_eq!(outcome.value, "8.8.8.8");
    let error = outcome.error.unwrap();
    assert!(error.starts_with("verification mismatch"), "{error}");
    assert!(error.contains("1.2.3.4"), "{error}");
}

#[tokio::test]
async fn mismatch_on_patch_is_failed() {
    let (reconciler, zone) = reconciler();
    let verdict = classify("2606:4700:4700::1111", AddressFamily::V6);
    assert_eq!(
        reconciler.reconcile(DOMAIN, RecordType::Aaaa, &verdict).await.outcome,
        Outcome::Created
    );

    zone.acknowledge_with("2606:4700:4700::1001");
    let outcome = reconciler.reconcile(DOMAIN, RecordType::Aaaa, &verdict).await;

    assert_eq!(outcome.outcome, Outcome::Failed);
    assert!(
        outcome
            .error
            .as_deref()
            .unwrap()
            .starts_with("verification mismatch")
    );
}

#[tokio::test]
async fn extra_acknowledged_value_is_a_mismatch() {
    let (reconciler, zone) = reconciler();
    zone.acknowledge_extra("1.2.3.4");

    let outcome = reconciler
        .reconcile(DOMAIN, RecordType::A, &classify("8.8.8.8", AddressFamily::V4))
        .await;

    assert_eq!(outcome.outcome, Outcome::Failed);
    let error = outcome.error.unwrap();
    assert!(error.starts_with("verification mismatch"), "{error}");
    assert!(error.contains("8.8.8.8,1.2.3.4"), "{error}");
}

#[tokio::test]
async fn extra_value_on_patch_is_a_mismatch() {
    let (reconciler, zone) = reconciler();
    let verdict = classify("8.8.8.8", AddressFamily::V4);
    assert_eq!(
        reconciler.reconcile(DOMAIN, RecordType::A, &verdict).await.outcome,
        Outcome::Created
    );

    zone.acknowledge_extra("1.2.3.4");
    let outcome = reconciler.reconcile(DOMAIN, RecordType::A, &verdict).await;

    assert_eq!(outcome.outcome, Outcome::Failed);
    assert!(outcome.error.unwrap().starts_with("verification mismatch"));
}

#[tokio::test]
async fn empty_acknowledgement_is_a_mismatch() {
    let (reconciler, zone) = reconciler();
    zone.acknowledge_with("");

    let outcome = reconciler
        .reconcile(DOMAIN, RecordType::A, &classify("8.8.8.8", AddressFamily::V4))
        .await;

    assert_eq!(outcome.outcome, Outcome::Failed);
    assert!(outcome.error.unwrap().starts_with("verification mismatch"));
}

#[tokio::test]
async fn mismatch_on_one_family_leaves_other_intact() {
    let (reconciler, zone) = reconciler();
    zone.acknowledge_with("8.8.4.4");

    let envelope = reconciler.update(Some("8.8.8.8"), Some("")).await;

    assert_eq!(envelope.v4.outcome, Outcome::Failed);
    assert_eq!(envelope.v6.outcome, Outcome::Skipped);
}
