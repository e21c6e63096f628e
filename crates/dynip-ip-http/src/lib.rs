// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the updater.
//
// ## Protocol
//
// One GET against a "what is my IP" service (default
// `https://checkip.amazonaws.com`). Only a 200 counts as success. The first
// line of the body, trimmed, must be a bare IP literal:
//
// ```text
// HTTP/1.1 200 OK
//
// 203.0.113.7
// ```
//
// No retry and no caching: the source is asked once per run.

use dynip_core::traits::IpSource;
use dynip_core::{Error, Result};

use std::net::IpAddr;

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://checkip.amazonaws.com")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dynip/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(url, client))
    }

    /// Create with a caller-supplied client
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        tracing::debug!("Fetching current IP from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::UnexpectedStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {e}")))?;

        parse_first_line(&body)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Parse the first line of `body` as an IP literal
///
/// The line runs up to the first `\n` (or the whole body without one) and is
/// trimmed before parsing. On failure the untrimmed line is kept in the error.
pub fn parse_first_line(body: &str) -> Result<IpAddr> {
    let line = match body.find('\n') {
        Some(end) => &body[..=end],
        None => body,
    };

    line.trim().parse().map_err(|_| Error::InvalidAddress {
        raw: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn first_line_only() {
        let ip = parse_first_line("203.0.113.7\nsomething else\n").unwrap();
        assert_eq!(ip, IpAddr::from([203, 0, 113, 7]));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let ip = parse_first_line("  203.0.113.7 \r\n").unwrap();
        assert_eq!(ip, IpAddr::from([203, 0, 113, 7]));
    }

    #[test]
    fn body_without_newline() {
        let ip = parse_first_line("203.0.113.7").unwrap();
        assert_eq!(ip, IpAddr::from([203, 0, 113, 7]));
    }

    #[test]
    fn ipv6_parses() {
        let ip = parse_first_line("2001:db8::7\n").unwrap();
        assert!(ip.is_ipv6());
    }

    #[test]
    fn garbage_keeps_raw_line() {
        let err = parse_first_line("<html>oops</html>\n<body/>").unwrap_err();
        match err {
            Error::InvalidAddress { raw } => assert_eq!(raw, "<html>oops</html>\n"),
            other => panic!("expected InvalidAddress, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_is_invalid() {
        assert!(matches!(
            parse_first_line(""),
            Err(Error::InvalidAddress { .. })
        ));
    }

    #[tokio::test]
    async fn fetches_address_on_200() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("203.0.113.7\n");
            })
            .await;

        let source = HttpIpSource::new(server.url("/")).unwrap();
        let ip = source.current().await.unwrap();

        assert_eq!(ip, IpAddr::from([203, 0, 113, 7]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_200_carries_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(503).body("203.0.113.7\n");
            })
            .await;

        let source = HttpIpSource::new(server.url("/")).unwrap();
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::UnexpectedStatus(503)), "got {err:?}");
    }

    #[tokio::test]
    async fn other_success_codes_are_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(204);
            })
            .await;

        let source = HttpIpSource::new(server.url("/")).unwrap();
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::UnexpectedStatus(204)), "got {err:?}");
    }

    #[tokio::test]
    async fn unparseable_body_is_invalid_address() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("not an address\n");
            })
            .await;

        let source = HttpIpSource::new(server.url("/")).unwrap();
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::InvalidAddress { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn single_request_per_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ip");
                then.status(200).body("198.51.100.2\n");
            })
            .await;

        let source = HttpIpSource::new(server.url("/ip")).unwrap();
        source.current().await.unwrap();

        assert_eq!(mock.hits_async().await, 1);
    }
}
