//! Workflow Contract Test: Public DNS Short-Circuit
//!
//! Constraints verified:
//! - When public DNS already resolves to the current IP, the provider is never called
//! - When it does not, the provider is consulted
//! - Provider credentials are only needed once the provider is consulted

mod common;

use common::*;
use dynip_core::{Error, RunOutcome, Updater};
use std::net::{IpAddr, Ipv4Addr};

#[tokio::test]
async fn matching_dns_makes_zero_provider_calls() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = StaticResolver::new(vec![
        IpAddr::from([198, 51, 100, 2]),
        IpAddr::from([203, 0, 113, 7]),
    ]);
    let provider = MockDnsProvider::new(vec![a_record("home.example.com.", "198.51.100.2")]);

    let updater = Updater::new(
        Box::new(StaticIpSource::new(IpAddr::from([203, 0, 113, 7]))),
        Box::new(resolver.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com", &dir),
    )
    .unwrap();

    let outcome = updater.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::AlreadyCurrent {
            ip: Ipv4Addr::new(203, 0, 113, 7)
        }
    );
    assert_eq!(resolver.call_count(), 1);
    assert_eq!(
        provider.total_calls(),
        0,
        "Provider must not be called when DNS is already correct"
    );
}

#[tokio::test]
async fn mismatching_dns_consults_provider() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockDnsProvider::new(vec![a_record("home.example.com.", "203.0.113.7")]);

    let updater = Updater::new(
        Box::new(StaticIpSource::new(IpAddr::from([203, 0, 113, 7]))),
        Box::new(StaticResolver::stale()),
        Box::new(provider.clone()),
        minimal_config("home.example.com", &dir),
    )
    .unwrap();

    updater.run().await.unwrap();

    assert_eq!(provider.list_call_count(), 1);
}

#[tokio::test]
async fn matching_dns_succeeds_without_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockDnsProvider::unauthenticated();

    let updater = Updater::new(
        Box::new(StaticIpSource::new(IpAddr::from([203, 0, 113, 7]))),
        Box::new(StaticResolver::new(vec![IpAddr::from([203, 0, 113, 7])])),
        Box::new(provider.clone()),
        minimal_config("home.example.com", &dir),
    )
    .unwrap();

    let outcome = updater.run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::AlreadyCurrent { .. }), "got {outcome:?}");
    assert_eq!(provider.total_calls(), 0);
}

#[tokio::test]
async fn missing_credentials_surface_on_first_provider_call() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockDnsProvider::unauthenticated();

    let updater = Updater::new(
        Box::new(StaticIpSource::new(IpAddr::from([203, 0, 113, 7]))),
        Box::new(StaticResolver::stale()),
        Box::new(provider.clone()),
        minimal_config("home.example.com", &dir),
    )
    .unwrap();

    let err = updater.run().await.unwrap_err();

    assert!(matches!(err, Error::Authentication(_)), "got {err:?}");
    assert_eq!(provider.list_call_count(), 1);
    assert!(provider.upserts().is_empty());
}
