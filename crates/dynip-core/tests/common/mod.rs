//! Test doubles and common utilities for workflow contract tests
//!
//! Each double counts its calls so tests can assert which network
//! boundaries a run crossed.

#![allow(dead_code)]

use dynip_core::error::{Error, Result};
use dynip_core::traits::{ChangeInfo, DnsProvider, HostResolver, IpSource, ResourceRecordSet};
use dynip_core::UpdaterConfig;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that always reports the same address
#[derive(Clone)]
pub struct StaticIpSource {
    ip: IpAddr,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// A HostResolver answering with a fixed address list
#[derive(Clone)]
pub struct StaticResolver {
    addrs: Vec<IpAddr>,
    call_count: Arc<AtomicUsize>,
}

impl StaticResolver {
    pub fn new(addrs: Vec<IpAddr>) -> Self {
        Self {
            addrs,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver that finds nothing useful
    pub fn stale() -> Self {
        Self::new(vec![IpAddr::from([192, 0, 2, 1])])
    }

    /// Get the number of times lookup() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, _host: &str) -> Result<Vec<IpAddr>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.addrs.clone())
    }
}

/// A mock DnsProvider serving fixed record sets and recording upserts
#[derive(Clone)]
pub struct MockDnsProvider {
    records: Vec<ResourceRecordSet>,
    list_call_count: Arc<AtomicUsize>,
    upserts: Arc<Mutex<Vec<(String, ResourceRecordSet)>>>,
    fail_upsert: bool,
    unauthenticated: bool,
}

impl MockDnsProvider {
    pub fn new(records: Vec<ResourceRecordSet>) -> Self {
        Self {
            records,
            list_call_count: Arc::new(AtomicUsize::new(0)),
            upserts: Arc::new(Mutex::new(Vec::new())),
            fail_upsert: false,
            unauthenticated: false,
        }
    }

    /// Provider that has no credentials: every call fails with an
    /// authentication error, the way a lazily-resolved credential chain does
    pub fn unauthenticated() -> Self {
        Self {
            unauthenticated: true,
            ..Self::new(Vec::new())
        }
    }

    /// Provider whose upserts are rejected
    pub fn failing_upsert(records: Vec<ResourceRecordSet>) -> Self {
        Self {
            fail_upsert: true,
            ..Self::new(records)
        }
    }

    /// Get the number of times list_records() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Upserts received, with their zone id
    pub fn upserts(&self) -> Vec<(String, ResourceRecordSet)> {
        self.upserts.lock().unwrap().clone()
    }

    /// Total provider calls of any kind
    pub fn total_calls(&self) -> usize {
        self.list_call_count() + self.upserts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(
        &self,
        _zone_id: &str,
        _name: &str,
        _record_type: &str,
    ) -> Result<Vec<ResourceRecordSet>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.unauthenticated {
            return Err(Error::auth("no credentials found"));
        }
        Ok(self.records.clone())
    }

    async fn upsert_record(
        &self,
        zone_id: &str,
        record: &ResourceRecordSet,
    ) -> Result<ChangeInfo> {
        self.upserts
            .lock()
            .unwrap()
            .push((zone_id.to_string(), record.clone()));

        if self.unauthenticated {
            return Err(Error::auth("no credentials found"));
        }

        if self.fail_upsert {
            return Err(Error::provider("mock", "InvalidChangeBatch"));
        }

        Ok(ChangeInfo {
            id: "/change/C0000000TEST".to_string(),
            status: "PENDING".to_string(),
            submitted_at: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Single-valued A record for `name`
pub fn a_record(name: &str, value: &str) -> ResourceRecordSet {
    ResourceRecordSet::new(name, "A", Some(300), vec![value.to_string()])
}

/// Minimal config with its lock inside `dir`
pub fn minimal_config(host: &str, dir: &tempfile::TempDir) -> UpdaterConfig {
    UpdaterConfig::new(host, "Z0000000TEST").with_lock_path(dir.path().join("dynip.lock"))
}
