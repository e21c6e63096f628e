//! AWS credentials
//!
//! Resolution order:
//! 1. explicit access/secret from [`CredentialsConfig`]
//! 2. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` (+ `AWS_SESSION_TOKEN`)
//! 3. the shared credentials file (`AWS_SHARED_CREDENTIALS_FILE` or
//!    `~/.aws/credentials`), profile `AWS_PROFILE` or `default`
//! 4. the EC2 instance role, through the instance metadata service

use crate::imds::InstanceMetadata;
use dynip_core::{CredentialsConfig, Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Resolved AWS credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

// Custom Debug implementation that hides the secret and token
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl Credentials {
    /// Create long-term credentials
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token (temporary credentials)
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Access key id
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key
    /// ⚠️ NEVER log this value
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Session token, if any
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Resolve credentials from configuration, then the process environment
    pub async fn resolve(config: &CredentialsConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok()).await
    }

    /// Resolve credentials with `env` standing in for the process environment
    pub async fn resolve_with(
        config: &CredentialsConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        config.validate()?;

        if let (Some(access), Some(secret)) = (&config.access_key, &config.secret_key)
            && !access.is_empty()
        {
            tracing::debug!("Using explicit credentials");
            return Ok(Self::new(access, secret));
        }

        if let Some(credentials) = Self::from_env_with(&env) {
            tracing::debug!("Using credentials from environment");
            return Ok(credentials);
        }

        let profile = non_empty(env("AWS_PROFILE")).unwrap_or_else(|| "default".to_string());
        if let Some(path) = shared_credentials_path(&env) {
            if let Some(credentials) = Self::from_shared_file(&path, &profile)? {
                tracing::debug!(
                    "Using credentials from {} [{}]",
                    path.display(),
                    profile
                );
                return Ok(credentials);
            }
        }

        if let Some(imds) = InstanceMetadata::from_env(&env)?
            && let Some(credentials) = imds.role_credentials().await?
        {
            tracing::debug!("Using instance role credentials from {}", imds.endpoint());
            return Ok(credentials);
        }

        Err(Error::auth(
            "no AWS credentials found: pass --access-key/--secret-key, \
             set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY, configure ~/.aws/credentials, \
             or attach an instance role",
        ))
    }

    fn from_env_with(env: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        let access = non_empty(env("AWS_ACCESS_KEY_ID"))?;
        let secret = non_empty(env("AWS_SECRET_ACCESS_KEY"))?;
        let credentials = Self::new(access, secret);

        Some(match non_empty(env("AWS_SESSION_TOKEN")) {
            Some(token) => credentials.with_session_token(token),
            None => credentials,
        })
    }

    /// Read `profile` from a shared credentials file
    ///
    /// Returns `Ok(None)` when the file or the profile does not exist.
    pub fn from_shared_file(path: &Path, profile: &str) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::auth(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(parse_profile(&content, profile))
    }
}

fn parse_profile(content: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut access = None;
    let mut secret = None;
    let mut token = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().to_string();
            match key.trim() {
                "aws_access_key_id" => access = Some(value),
                "aws_secret_access_key" => secret = Some(value),
                "aws_session_token" => token = Some(value),
                _ => {}
            }
        }
    }

    let credentials = Credentials::new(non_empty(access)?, non_empty(secret)?);
    Some(match non_empty(token) {
        Some(token) => credentials.with_session_token(token),
        None => credentials,
    })
}

fn shared_credentials_path(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = non_empty(env("AWS_SHARED_CREDENTIALS_FILE")) {
        return Some(PathBuf::from(path));
    }

    non_empty(env("HOME"))
        .or_else(|| non_empty(env("USERPROFILE")))
        .map(|home| PathBuf::from(home).join(".aws").join("credentials"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
