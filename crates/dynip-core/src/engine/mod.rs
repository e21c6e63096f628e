//! Core update workflow
//!
//! The [`Updater`] runs one pass of the dynamic IP workflow:
//!
//! ```text
//! LockGuard ──▶ IpSource ──▶ HostResolver ──┬──▶ AlreadyCurrent
//!                                            │
//!                                            ▼
//!                               DnsProvider::list_records
//!                                            │
//!                              ┌─────────────┴─────────────┐
//!                              ▼                           ▼
//!                          Unchanged          DnsProvider::upsert_record
//!                                                          │
//!                                                          ▼
//!                                                       Updated
//! ```
//!
//! Every step either advances or returns an [`Error`]; nothing is retried.
//! The lock is a guard local to [`Updater::run`], so it is released on every
//! return path.
//!
//! The read-then-upsert sequence is not transactional. Route53 offers no
//! compare-and-swap on record values, so a concurrent external edit between
//! the two calls is overwritten.

use crate::config::{RECORD_TYPE_A, UpdaterConfig};
use crate::error::{Error, Result};
use crate::lock::LockGuard;
use crate::resolver::dns_already_current;
use crate::traits::ip_source::require_ipv4;
use crate::traits::{ChangeInfo, DnsProvider, HostResolver, IpSource, ResourceRecordSet};
use std::net::Ipv4Addr;
use tracing::{debug, info};

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Public DNS already resolves to the current IP; the provider was not called
    AlreadyCurrent {
        /// Current public IP
        ip: Ipv4Addr,
    },

    /// The authoritative record already holds the current IP
    Unchanged {
        /// Current public IP
        ip: Ipv4Addr,
    },

    /// An upsert was submitted
    Updated {
        /// Value the record held before
        previous: String,
        /// Value the record holds now
        current: Ipv4Addr,
        /// Provider acknowledgement
        change: ChangeInfo,
    },
}

/// One-shot dynamic IP updater
pub struct Updater {
    /// Source of the current public IP
    ip_source: Box<dyn IpSource>,

    /// Public DNS resolver for the short-circuit check
    resolver: Box<dyn HostResolver>,

    /// Authoritative DNS provider
    provider: Box<dyn DnsProvider>,

    config: UpdaterConfig,
}

impl Updater {
    /// Create a new updater
    ///
    /// Fails if `config` does not validate.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        resolver: Box<dyn HostResolver>,
        provider: Box<dyn DnsProvider>,
        config: UpdaterConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            resolver,
            provider,
            config,
        })
    }

    /// Configuration this updater runs with
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Run the workflow once under the single-instance lock
    pub async fn run(&self) -> Result<RunOutcome> {
        let lock = LockGuard::acquire(&self.config.lock_path)?;
        info!("lock at: {}", lock.path().display());

        self.run_locked().await
    }

    async fn run_locked(&self) -> Result<RunOutcome> {
        let host = self.config.host.as_str();

        let ip = self.ip_source.current().await?;
        info!("Your ip: {} (via {})", ip, self.ip_source.source_name());
        let ip = require_ipv4(ip)?;

        if dns_already_current(self.resolver.as_ref(), host, ip).await? {
            info!("DNS lookup OK, nothing to change.");
            return Ok(RunOutcome::AlreadyCurrent { ip });
        }

        let record = self.read_record().await?;
        let previous = record.values[0].clone();
        let wanted = ip.to_string();

        if previous == wanted {
            info!("Nothing to change.");
            return Ok(RunOutcome::Unchanged { ip });
        }

        info!(
            "Updating {} {} -> {} (ttl: {:?})",
            record.name, previous, wanted, record.ttl
        );
        let change = self
            .provider
            .upsert_record(&self.config.zone_id, &record.with_values(vec![wanted]))
            .await?;
        info!("Change submitted: {} ({})", change.id, change.status);

        Ok(RunOutcome::Updated {
            previous,
            current: ip,
            change,
        })
    }

    /// Fetch the authoritative record for the target host
    ///
    /// The returned record is guaranteed to hold exactly one value.
    pub async fn read_record(&self) -> Result<ResourceRecordSet> {
        let host = self.config.host.as_str();
        let sets = self
            .provider
            .list_records(&self.config.zone_id, host, RECORD_TYPE_A)
            .await?;
        debug!(
            "{} returned {} record set(s) for {}",
            self.provider.provider_name(),
            sets.len(),
            host
        );

        select_record(sets, host)
    }
}

/// Pick the single-valued "A" record named exactly `host`
///
/// Names compare exactly; `host` is already in the lowercase form the
/// provider reports.
///
/// Several record sets sharing the name (routing policies) are ambiguous and
/// rejected the same way as a multi-value record.
pub fn select_record(sets: Vec<ResourceRecordSet>, host: &str) -> Result<ResourceRecordSet> {
    let mut matching: Vec<ResourceRecordSet> = sets
        .into_iter()
        .filter(|set| set.name == host && set.record_type == RECORD_TYPE_A)
        .collect();

    match matching.len() {
        0 => Err(Error::RecordNotFound {
            host: host.to_string(),
        }),
        1 => {
            let record = matching.remove(0);
            if record.values.len() != 1 {
                return Err(Error::RecordNotSet {
                    host: host.to_string(),
                    count: record.values.len(),
                });
            }
            Ok(record)
        }
        count => Err(Error::RecordNotSet {
            host: host.to_string(),
            count,
        }),
    }
}
