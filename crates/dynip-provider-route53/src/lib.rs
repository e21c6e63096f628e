// # Route53 DNS Provider
//
// This crate provides an AWS Route53 DNS provider implementation for the
// updater.
//
// ## Behaviour
//
// - ✅ One HTTP request per trait call (list or change)
// - ✅ Full error propagation to the workflow
// - ✅ Specific error handling for HTTP status codes (400, 401/403, 404, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ✅ Requests signed with AWS Signature Version 4
// - ✅ Credentials resolved on the first API call, not at construction
// - ❌ NO retry or backoff (a failed run is retried by the next scheduled run)
// - ❌ NO caching (every run reads the record fresh)
// - ❌ NO waiting for the change to reach INSYNC
//
// ## Security Requirements
//
// - Secret key and session token NEVER appear in logs or Debug output
//
// ## API Reference
//
// - List: GET `/2013-04-01/hostedzone/{Id}/rrset?name=...&type=...`
// - Change: POST `/2013-04-01/hostedzone/{Id}/rrset/`

pub mod credentials;
pub mod imds;
pub mod sigv4;
pub mod xml;

pub use credentials::Credentials;

use async_trait::async_trait;
use dynip_core::traits::{ChangeInfo, DnsProvider, ResourceRecordSet};
use dynip_core::{CredentialsConfig, Error, Result, UpdaterConfig};
use reqwest::{Method, Url};
use tokio::sync::OnceCell;

use crate::xml::{
    ChangeResourceRecordSetsRequest, ChangeResourceRecordSetsResponse,
    ListResourceRecordSetsResponse,
};

/// Route53 API endpoint
pub const ROUTE53_ENDPOINT: &str = "https://route53.amazonaws.com";

/// Route53 API version path segment
pub const API_VERSION: &str = "2013-04-01";

/// Route53 is a global service signed in us-east-1
const SIGNING_REGION: &str = "us-east-1";

const SIGNING_SERVICE: &str = "route53";

/// Comment attached to every change batch
pub const CHANGE_COMMENT: &str = "changed by dynip";

/// Route53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform list requests normally
/// - Log the intended change batch
/// - **NOT** submit it
pub struct Route53Provider {
    /// Where credentials come from when none were given up front
    credentials_config: CredentialsConfig,

    /// AWS credentials, resolved once
    /// ⚠️ NEVER log the secret
    credentials: OnceCell<Credentials>,

    /// API endpoint, without trailing slash
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, list but skip change submission
    dry_run: bool,
}

// Custom Debug implementation; Credentials redacts its own secret
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("credentials_config", &self.credentials_config)
            .field("credentials", &self.credentials.get())
            .field("endpoint", &self.endpoint)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Create a new Route53 provider
    ///
    /// # Parameters
    ///
    /// - `credentials`: credentials allowed `route53:ListResourceRecordSets`
    ///   and `route53:ChangeResourceRecordSets` on the zone
    /// - `dry_run`: If true, list records but skip change submission
    pub fn new(credentials: Credentials, dry_run: bool) -> Result<Self> {
        Self::build(
            CredentialsConfig::default(),
            OnceCell::new_with(Some(credentials)),
            dry_run,
        )
    }

    /// Create a provider from the updater configuration
    ///
    /// Nothing is resolved here. On the first API call credentials are
    /// taken from the configuration, then from the ambient AWS environment,
    /// so a run that never reaches the provider never needs them.
    pub fn from_config(config: &UpdaterConfig) -> Result<Self> {
        if config.dry_run {
            tracing::warn!("Route53 provider running in DRY-RUN mode - no changes will be made");
        }

        Self::build(config.credentials.clone(), OnceCell::new(), config.dry_run)
    }

    fn build(
        credentials_config: CredentialsConfig,
        credentials: OnceCell<Credentials>,
        dry_run: bool,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dynip/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            credentials_config,
            credentials,
            endpoint: ROUTE53_ENDPOINT.to_string(),
            client,
            dry_run,
        })
    }

    /// Point the provider at another endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether change submission is skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    async fn credentials(&self) -> Result<&Credentials> {
        self.credentials
            .get_or_try_init(|| Credentials::resolve(&self.credentials_config))
            .await
    }

    fn rrset_url(&self, zone_id: &str) -> String {
        format!(
            "{}/{}/hostedzone/{}/rrset",
            self.endpoint,
            API_VERSION,
            bare_zone_id(zone_id)
        )
    }

    /// Send a signed request and return the body of a 2xx response
    async fn send(&self, method: Method, url: &str, body: Option<String>) -> Result<String> {
        let url = Url::parse(url)
            .map_err(|e| Error::config(format!("Invalid Route53 URL {url}: {e}")))?;
        let credentials = self.credentials().await?;
        let payload = body.as_deref().unwrap_or_default();

        let signed = sigv4::sign(
            credentials,
            method.as_str(),
            &url,
            payload.as_bytes(),
            SIGNING_REGION,
            SIGNING_SERVICE,
            chrono::Utc::now(),
        );

        tracing::debug!("Route53 {} {}", method, url);

        let mut request = self.client.request(method, url.clone());
        for (name, value) in signed.pairs() {
            request = request.header(name, value);
        }
        if let Some(body) = body {
            request = request.header("content-type", "application/xml").body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("Route53 request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read Route53 response: {e}")))?;

        if !status.is_success() {
            return Err(map_error(status.as_u16(), &text));
        }

        Ok(text)
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    /// List record sets starting at `name`/`record_type`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /2013-04-01/hostedzone/:zone_id/rrset?name=home.example.com.&type=A
    /// ```
    async fn list_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Vec<ResourceRecordSet>> {
        let url = format!(
            "{}?name={}&type={}",
            self.rrset_url(zone_id),
            sigv4::uri_encode(name),
            sigv4::uri_encode(record_type)
        );

        let body = self.send(Method::GET, &url, None).await?;

        let response: ListResourceRecordSetsResponse = quick_xml::de::from_str(&body)
            .map_err(|e| Error::provider("route53", format!("Failed to parse response: {e}")))?;

        Ok(response
            .resource_record_sets
            .items
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Submit a single-change UPSERT batch
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /2013-04-01/hostedzone/:zone_id/rrset/
    /// <ChangeResourceRecordSetsRequest>...UPSERT...</ChangeResourceRecordSetsRequest>
    /// ```
    async fn upsert_record(&self, zone_id: &str, record: &ResourceRecordSet) -> Result<ChangeInfo> {
        let url = format!("{}/", self.rrset_url(zone_id));
        let body = ChangeResourceRecordSetsRequest::upsert(record, CHANGE_COMMENT).to_xml()?;

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send POST request to {} with payload: {}", url, body);
            return Ok(ChangeInfo {
                id: "dry-run".to_string(),
                status: "DRY_RUN".to_string(),
                submitted_at: None,
            });
        }

        let response = self.send(Method::POST, &url, Some(body)).await?;

        let response: ChangeResourceRecordSetsResponse = quick_xml::de::from_str(&response)
            .map_err(|e| Error::provider("route53", format!("Failed to parse response: {e}")))?;

        tracing::info!("DNS record upserted: {} -> {:?}", record.name, record.values);
        Ok(response.change_info.into())
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}

/// Strip the `/hostedzone/` prefix the console and CLI sometimes show
pub fn bare_zone_id(zone_id: &str) -> &str {
    let zone_id = zone_id.trim();
    zone_id
        .strip_prefix("/hostedzone/")
        .or_else(|| zone_id.strip_prefix("hostedzone/"))
        .unwrap_or(zone_id)
}

/// Map a non-2xx response to an error
fn map_error(status: u16, body: &str) -> Error {
    let (code, message) = xml::parse_error(body).unwrap_or_else(|| (String::new(), body.trim().to_string()));
    let detail = if code.is_empty() {
        format!("{status}: {message}")
    } else {
        format!("{status} {code}: {message}")
    };

    match (status, code.as_str()) {
        (401 | 403, _) => Error::auth(detail),
        (404, _) | (_, "NoSuchHostedZone") => Error::not_found(detail),
        (429, _) | (_, "Throttling" | "PriorRequestNotComplete") => Error::rate_limited(detail),
        _ => Error::provider("route53", detail),
    }
}
