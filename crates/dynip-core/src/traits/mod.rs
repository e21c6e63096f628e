//! Core traits for the updater
//!
//! These are the seams between the workflow and the outside world.
//!
//! - [`IpSource`]: Determine the current public IP
//! - [`HostResolver`]: Forward-resolve the target host through public DNS
//! - [`DnsProvider`]: Read and upsert records through the provider API

pub mod ip_source;
pub mod host_resolver;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use host_resolver::HostResolver;
pub use dns_provider::{ChangeInfo, DnsProvider, ResourceRecordSet};
