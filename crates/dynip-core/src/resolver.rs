//! Public DNS check
//!
//! Before touching the provider API the workflow asks the platform resolver
//! whether the host already points at the current address. This is only an
//! optimization: a resolver cache that still serves an old address costs one
//! extra provider call. The reverse case, a cache already serving the new
//! address while the authoritative record is still old, skips the update
//! until the next run. That window is accepted.

use crate::error::{Error, Result};
use crate::traits::HostResolver;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};

/// [`HostResolver`] backed by the platform resolver (`getaddrinfo`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| Error::dns_lookup(format!("{host}: {e}")))?;

        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Whether `host` already resolves to `ip`
///
/// Any returned address whose IPv4 form equals `ip` counts; IPv6 addresses
/// without an IPv4 form never match.
pub async fn dns_already_current(
    resolver: &dyn HostResolver,
    host: &str,
    ip: Ipv4Addr,
) -> Result<bool> {
    let addrs = resolver.lookup(host).await?;
    tracing::debug!("DNS lookup {}: {:?}", host, addrs);

    Ok(addrs.iter().any(|addr| as_ipv4(*addr) == Some(ip)))
}

fn as_ipv4(addr: IpAddr) -> Option<Ipv4Addr> {
    match addr {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<IpAddr>);

    #[async_trait]
    impl HostResolver for Fixed {
        async fn lookup(&self, _host: &str) -> Result<Vec<IpAddr>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl HostResolver for Failing {
        async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
            Err(Error::dns_lookup(format!("{host}: no such host")))
        }
    }

    const IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 7);

    #[tokio::test]
    async fn match_among_several() {
        let resolver = Fixed(vec![
            IpAddr::from([198, 51, 100, 2]),
            IpAddr::from([203, 0, 113, 7]),
        ]);
        assert!(dns_already_current(&resolver, "home.example.com.", IP).await.unwrap());
    }

    #[tokio::test]
    async fn mapped_ipv6_matches() {
        let resolver = Fixed(vec!["::ffff:203.0.113.7".parse().unwrap()]);
        assert!(dns_already_current(&resolver, "home.example.com.", IP).await.unwrap());
    }

    #[tokio::test]
    async fn no_match() {
        let resolver = Fixed(vec![IpAddr::from([198, 51, 100, 2]), "2001:db8::1".parse().unwrap()]);
        assert!(!dns_already_current(&resolver, "home.example.com.", IP).await.unwrap());
    }

    #[tokio::test]
    async fn lookup_error_propagates() {
        let err = dns_already_current(&Failing, "home.example.com.", IP).await.unwrap_err();
        assert!(matches!(err, Error::DnsLookup(_)));
    }

    #[tokio::test]
    async fn system_resolver_handles_ip_literals() {
        let addrs = SystemResolver.lookup("127.0.0.1").await.unwrap();
        assert_eq!(addrs, vec![IpAddr::from([127, 0, 0, 1])]);
    }
}
