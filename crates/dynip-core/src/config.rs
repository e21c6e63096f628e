//! Configuration types for the updater
//!
//! The binary builds one [`UpdaterConfig`] at startup and hands it to every
//! component; nothing reads process-wide globals.

use std::fmt;
use std::path::PathBuf;

/// File name of the default lock, placed in the system temporary directory
pub const DEFAULT_LOCK_FILE_NAME: &str = "dynip2route53.lock";

/// Default "what is my IP" endpoint
pub const DEFAULT_IP_URL: &str = "https://checkip.amazonaws.com";

/// Record type managed by this updater
pub const RECORD_TYPE_A: &str = "A";

/// A fully-qualified, lowercase host name that always ends with exactly one `.`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetHost(String);

impl TargetHost {
    /// Normalize `name` into a fully-qualified host
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(normalize_host(name.as_ref()))
    }

    /// The normalized name, trailing dot included
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without its trailing dot
    pub fn without_root(&self) -> &str {
        self.0.strip_suffix('.').unwrap_or(&self.0)
    }
}

impl fmt::Display for TargetHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase `name` and append the root separator unless it already ends with one
///
/// Route53 stores and returns names in lowercase, so this is the form record
/// names are compared against.
pub fn normalize_host(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    if name.is_empty() || name.ends_with('.') {
        name
    } else {
        format!("{name}.")
    }
}

/// Provider credentials supplied on the command line or environment
///
/// Both halves are optional; when neither is set the provider falls back to
/// ambient credential resolution.
#[derive(Clone, Default)]
pub struct CredentialsConfig {
    /// Access key id
    pub access_key: Option<String>,
    /// Secret access key
    pub secret_key: Option<String>,
}

// Keeps the secret out of logs.
impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl CredentialsConfig {
    /// Create explicit credentials
    pub fn explicit(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: Some(access_key.into()),
            secret_key: Some(secret_key.into()),
        }
    }

    /// Validate that access and secret are given together or not at all
    pub fn validate(&self) -> Result<(), crate::Error> {
        let access = self.access_key.as_deref().is_some_and(|k| !k.is_empty());
        let secret = self.secret_key.as_deref().is_some_and(|k| !k.is_empty());
        if access != secret {
            return Err(crate::Error::config(
                "access key and secret key must be provided together",
            ));
        }
        Ok(())
    }

    /// Whether explicit credentials were supplied
    pub fn is_explicit(&self) -> bool {
        self.access_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Main updater configuration
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Record to keep in sync
    pub host: TargetHost,

    /// Hosted zone owning `host`
    pub zone_id: String,

    /// Provider credentials
    pub credentials: CredentialsConfig,

    /// Lock file path
    pub lock_path: PathBuf,

    /// "What is my IP" endpoint
    pub ip_url: String,

    /// Read everything, change nothing
    pub dry_run: bool,
}

impl UpdaterConfig {
    /// Create a configuration with default lock path and IP endpoint
    pub fn new(host: impl AsRef<str>, zone_id: impl Into<String>) -> Self {
        Self {
            host: TargetHost::new(host),
            zone_id: zone_id.into(),
            credentials: CredentialsConfig::default(),
            lock_path: default_lock_path(),
            ip_url: default_ip_url(),
            dry_run: false,
        }
    }

    /// Set explicit credentials
    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the lock file path
    pub fn with_lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_path = path.into();
        self
    }

    /// Set the IP lookup endpoint
    pub fn with_ip_url(mut self, url: impl Into<String>) -> Self {
        self.ip_url = url.into();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.as_str().is_empty() {
            return Err(crate::Error::config("host required"));
        }
        validate_domain_name(self.host.without_root())?;

        if self.zone_id.trim().is_empty() {
            return Err(crate::Error::config("zone id required"));
        }

        self.credentials.validate()?;

        if self.lock_path.as_os_str().is_empty() {
            return Err(crate::Error::config("lock path cannot be empty"));
        }

        if self.ip_url.is_empty() {
            return Err(crate::Error::config("IP lookup URL cannot be empty"));
        }
        if !self.ip_url.starts_with("https://") && !self.ip_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_url
            )));
        }

        Ok(())
    }
}

/// Basic RFC 1035 host name validation
///
/// A leading `*` label is accepted so wildcard records can be kept in sync.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for (idx, label) in domain.split('.').enumerate() {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{domain}'"
            )));
        }

        if idx == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{label}'"
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{label}'"
            )));
        }
    }

    Ok(())
}

fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_LOCK_FILE_NAME)
}

fn default_ip_url() -> String {
    DEFAULT_IP_URL.to_string()
}
