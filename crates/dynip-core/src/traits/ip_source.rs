// # IP Source Trait
//
// Defines the interface for determining the caller's current public IP.
//
// ## Implementations
//
// - HTTP "what is my IP" lookup: `dynip-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dynip_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.current().await?;
//     println!("Your ip: {ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};

/// Trait for IP source implementations
///
/// A source answers one question, once: what is the public address right
/// now. It does not cache between calls and does not retry; a failure is
/// returned to the workflow, which treats it as fatal.
///
/// The returned address may be IPv4 or IPv6. Deciding whether it is usable
/// for an "A" record is the caller's job (see [`require_ipv4`]).
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If unable to determine the current IP
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &'static str;
}

/// Convert `ip` to its 4-byte form
///
/// Plain IPv4 passes through; IPv4-mapped IPv6 (`::ffff:a.b.c.d`) is
/// unwrapped. Anything else is [`crate::Error::NotIpv4`].
pub fn require_ipv4(ip: IpAddr) -> Result<Ipv4Addr, crate::Error> {
    match ip {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().ok_or(crate::Error::NotIpv4(ip)),
    }
}
