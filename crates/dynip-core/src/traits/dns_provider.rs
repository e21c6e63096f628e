// # DNS Provider Trait
//
// Defines the interface for reading and changing records through a DNS
// provider's authoritative API.
//
// ## Implementations
//
// - Route53: `dynip-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use dynip_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let sets = provider.list_records("Z123", "home.example.com.", "A").await?;
//     let mut record = sets[0].clone();
//     record.values = vec!["203.0.113.7".to_string()];
//     provider.upsert_record("Z123", &record).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// A provider's representation of one DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecordSet {
    /// Fully-qualified record name, as the provider reports it
    pub name: String,
    /// Record type (e.g. "A")
    pub record_type: String,
    /// Time-to-live in seconds; absent on alias records
    pub ttl: Option<u32>,
    /// Record values, in provider order
    pub values: Vec<String>,
    /// Routing-policy identifier (weighted, latency, ...), if any
    pub set_identifier: Option<String>,
}

impl ResourceRecordSet {
    /// Create a simple (non-routed) record set
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: Option<u32>,
        values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            ttl,
            values,
            set_identifier: None,
        }
    }

    /// Copy of this record with its values replaced by `values`
    ///
    /// Name, type, TTL and set identifier are preserved.
    pub fn with_values(&self, values: Vec<String>) -> Self {
        Self {
            values,
            ..self.clone()
        }
    }
}

/// Provider acknowledgement of a submitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Provider change id
    pub id: String,
    /// Change status (e.g. "PENDING", "INSYNC")
    pub status: String,
    /// Submission time as reported by the provider
    pub submitted_at: Option<String>,
}

/// Trait for DNS provider implementations
///
/// Providers are single-shot: one API call per method invocation, no retry,
/// no caching, no decision about whether a change is needed. The workflow in
/// [`crate::engine`] owns all of that.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List record sets in `zone_id` starting at `name`/`record_type`
    ///
    /// Providers may return neighbouring records as well; callers filter on
    /// exact name and type.
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Vec<ResourceRecordSet>, crate::Error>;

    /// Create or replace `record` in `zone_id`
    async fn upsert_record(
        &self,
        zone_id: &str,
        record: &ResourceRecordSet,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
