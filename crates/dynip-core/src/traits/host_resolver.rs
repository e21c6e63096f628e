//! Host resolver trait
//!
//! Abstraction over forward DNS lookups so the "already correct" check can
//! be exercised without touching the network.

use async_trait::async_trait;
use std::net::IpAddr;

/// Forward resolution of a host name
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolve `host` (trailing dot allowed) to its addresses
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, crate::Error>;
}
