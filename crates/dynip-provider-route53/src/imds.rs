//! EC2 instance role credentials (IMDSv2)
//!
//! 1. `PUT /latest/api/token` for a session token
//! 2. `GET /latest/meta-data/iam/security-credentials/` for the role name
//! 3. `GET /latest/meta-data/iam/security-credentials/{role}` for the keys
//!
//! Off EC2 the metadata address does not answer; that is reported as "no
//! credentials here", not as an error, so the caller can fall through.

use crate::credentials::Credentials;
use dynip_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Instance metadata service address
pub const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";

const TOKEN_PATH: &str = "/latest/api/token";
const ROLES_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const TOKEN_TTL_SECONDS: &str = "21600";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Role credentials document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoleCredentials {
    code: String,
    #[serde(default)]
    access_key_id: String,
    #[serde(default)]
    secret_access_key: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    expiration: Option<String>,
}

/// Client for the instance metadata service
#[derive(Debug, Clone)]
pub struct InstanceMetadata {
    endpoint: String,
    client: reqwest::Client,
}

impl InstanceMetadata {
    /// Create a client for the metadata service at `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Client configured from `AWS_EC2_METADATA_*` variables
    ///
    /// Returns `None` when `AWS_EC2_METADATA_DISABLED` is `true`.
    pub fn from_env(env: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        if env("AWS_EC2_METADATA_DISABLED").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")) {
            return Ok(None);
        }

        let endpoint = env("AWS_EC2_METADATA_SERVICE_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self::new(endpoint).map(Some)
    }

    /// Metadata service address
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the credentials of the instance's role
    ///
    /// `Ok(None)` means there is no usable metadata service or no role
    /// attached.
    pub async fn role_credentials(&self) -> Result<Option<Credentials>> {
        let Some(token) = self
            .text(
                self.client
                    .put(format!("{}{}", self.endpoint, TOKEN_PATH))
                    .header(TOKEN_TTL_HEADER, TOKEN_TTL_SECONDS),
            )
            .await
        else {
            return Ok(None);
        };
        let token = token.trim().to_string();

        let Some(roles) = self.get(&token, ROLES_PATH).await else {
            return Ok(None);
        };
        let Some(role) = roles.lines().map(str::trim).find(|l| !l.is_empty()) else {
            tracing::debug!("No instance role attached");
            return Ok(None);
        };

        let Some(body) = self.get(&token, &format!("{ROLES_PATH}{role}")).await else {
            return Ok(None);
        };

        let document: RoleCredentials = serde_json::from_str(&body).map_err(|e| {
            Error::auth(format!("malformed credentials for instance role {role}: {e}"))
        })?;

        if document.code != "Success" || document.access_key_id.is_empty() {
            return Err(Error::auth(format!(
                "instance role {} credentials unavailable: {}",
                role, document.code
            )));
        }

        tracing::debug!(
            "Instance role {} credentials expire at {}",
            role,
            document.expiration.as_deref().unwrap_or("unknown")
        );

        Ok(Some(
            Credentials::new(document.access_key_id, document.secret_access_key)
                .with_session_token(document.token),
        ))
    }

    async fn get(&self, token: &str, path: &str) -> Option<String> {
        self.text(
            self.client
                .get(format!("{}{}", self.endpoint, path))
                .header(TOKEN_HEADER, token),
        )
        .await
    }

    /// Body of a 2xx response; anything else is logged and skipped
    async fn text(&self, request: reqwest::RequestBuilder) -> Option<String> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Instance metadata unavailable at {}: {}", self.endpoint, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Instance metadata answered {} at {}", status, response.url());
            return None;
        }

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Failed to read instance metadata response: {}", e);
                None
            }
        }
    }
}
