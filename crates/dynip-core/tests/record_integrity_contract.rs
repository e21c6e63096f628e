//! Workflow Contract Test: Record Integrity
//!
//! Constraints verified:
//! - A missing record is an error and nothing is created
//! - A record without exactly one value is an error and nothing is overwritten
//! - A mixed-case host finds the lowercase record the provider reports

mod common;

use common::*;
use dynip_core::{Error, ResourceRecordSet, RunOutcome, Updater};
use std::net::{IpAddr, Ipv4Addr};

async fn run_against(records: Vec<ResourceRecordSet>) -> (Error, MockDnsProvider) {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockDnsProvider::new(records);

    let updater = Updater::new(
        Box::new(StaticIpSource::new(IpAddr::from([203, 0, 113, 7]))),
        Box::new(StaticResolver::stale()),
        Box::new(provider.clone()),
        minimal_config("home.example.com", &dir),
    )
    .unwrap();

    let err = updater.run().await.expect_err("run must fail");
    (err, provider)
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let (err, provider) = run_against(vec![a_record("www.example.com.", "198.51.100.2")]).await;

    assert!(matches!(err, Error::RecordNotFound { ref host } if host == "home.example.com."));
    assert!(provider.upserts().is_empty());
}

#[tokio::test]
async fn empty_listing_is_not_found() {
    let (err, provider) = run_against(Vec::new()).await;

    assert!(matches!(err, Error::RecordNotFound { .. }));
    assert!(provider.upserts().is_empty());
}

#[tokio::test]
async fn multi_value_record_is_not_set() {
    let record = ResourceRecordSet::new(
        "home.example.com.",
        "A",
        Some(300),
        vec!["198.51.100.2".to_string(), "198.51.100.3".to_string()],
    );
    let (err, provider) = run_against(vec![record]).await;

    assert!(matches!(err, Error::RecordNotSet { count: 2, .. }), "got {err:?}");
    assert!(provider.upserts().is_empty());
}

#[tokio::test]
async fn alias_record_is_not_set() {
    let alias = ResourceRecordSet::new("home.example.com.", "A", None, Vec::new());
    let (err, provider) = run_against(vec![alias]).await;

    assert!(matches!(err, Error::RecordNotSet { count: 0, .. }), "got {err:?}");
    assert!(provider.upserts().is_empty());
}

#[tokio::test]
async fn mixed_case_host_matches_lowercase_record() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockDnsProvider::new(vec![a_record("home.example.com.", "203.0.113.7")]);

    let updater = Updater::new(
        Box::new(StaticIpSource::new(IpAddr::from([203, 0, 113, 7]))),
        Box::new(StaticResolver::stale()),
        Box::new(provider.clone()),
        minimal_config("Home.Example.COM", &dir),
    )
    .unwrap();

    let outcome = updater.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Unchanged {
            ip: Ipv4Addr::new(203, 0, 113, 7)
        }
    );
    assert_eq!(provider.list_call_count(), 1);
}
