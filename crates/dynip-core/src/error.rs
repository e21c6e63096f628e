//! Error types for the dynamic IP updater
//!
//! Every error is terminal: the workflow never recovers locally, it returns
//! the error to the single top-level handler in the binary.

use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the updater
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Another instance holds the lock
    #[error("Locked: another instance holds {}", path.display())]
    Locked {
        /// Lock file path
        path: PathBuf,
    },

    /// Lock file could not be opened or locked
    #[error("Lock error: {0}")]
    Lock(#[from] std::io::Error),

    /// HTTP transport errors (IP lookup or provider calls)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The IP lookup service answered with something other than 200
    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// The IP lookup body did not start with an IP literal
    #[error("Failed to parse ip from: `{raw}`")]
    InvalidAddress {
        /// The unparsed first line of the body
        raw: String,
    },

    /// The resolved address has no IPv4 form
    #[error("Not an IPv4 address: {0}")]
    NotIpv4(IpAddr),

    /// Forward lookup of the target host failed
    #[error("DNS lookup error: {0}")]
    DnsLookup(String),

    /// No record with the target name exists in the zone
    #[error("Record not found: {host}")]
    RecordNotFound {
        /// Normalized target host
        host: String,
    },

    /// The record exists but does not hold exactly one value
    #[error("Record not set: {host} holds {count} value(s), expected exactly one")]
    RecordNotSet {
        /// Normalized target host
        host: String,
        /// Number of values (or matching record sets) found
        count: usize,
    },

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider resource (zone) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a DNS lookup error
    pub fn dns_lookup(msg: impl Into<String>) -> Self {
        Self::DnsLookup(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this error means another instance is running
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}
