// # Alibaba Cloud DNS (Alidns) Record Repository
//
// This crate implements `RecordRepository` over the Alidns RPC API
// (version 2015-01-09).
//
// ## Operations
//
// - `find`: `DescribeDomainRecords` filtered by `RRKeyWord` and
//   `TypeKeyWord=AAAA`, walking pages until `TotalCount` records were seen.
//   The keyword filter is a fuzzy match on the provider side, so the exact
//   label comparison happens here.
// - `create`: `AddDomainRecord`
// - `update`: `UpdateDomainRecord`
//
// Every call is a signed GET request (see `signer`). One call per operation,
// no retries, no caching. A failed call is returned to the reconciler and
// the next tick tries again.
//
// ## Security
//
// - The access key secret NEVER appears in logs, errors or `Debug` output
// - Request URLs are stripped from transport errors
//
// ## API Reference
//
// - DescribeDomainRecords: https://help.aliyun.com/document_detail/29776.html
// - AddDomainRecord: https://help.aliyun.com/document_detail/29772.html
// - UpdateDomainRecord: https://help.aliyun.com/document_detail/29774.html

pub mod api;
pub mod signer;

use api::{ApiErrorBody, DescribeDomainRecordsResponse, DomainRecord, RecordMutationResponse};
use async_trait::async_trait;
use ddns6_core::config::{DomainName, ProviderConfig};
use ddns6_core::traits::{RecordRepository, RemoteRecord};
use ddns6_core::{Error, Result};
use serde::de::DeserializeOwned;
use signer::RpcRequest;
use std::net::Ipv6Addr;

/// Provider name used in errors
pub const PROVIDER_NAME: &str = "alidns";

/// Largest page `DescribeDomainRecords` accepts
const PAGE_SIZE: u64 = 500;

/// Record id returned by `create` in dry-run mode
pub const DRY_RUN_RECORD_ID: &str = "dry-run";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Alidns-backed record repository
///
/// Bound at construction to one domain: the registrable domain is sent as
/// `DomainName`, the host label as `RR`.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true the repository will:
/// - Perform `DescribeDomainRecords` as usual
/// - Log the intended `AddDomainRecord` / `UpdateDomainRecord` parameters
/// - **NOT** send them
pub struct AlidnsRepository {
    access_key_id: String,

    /// ⚠️ NEVER log this value
    access_key_secret: String,

    endpoint: String,
    domain: DomainName,
    client: reqwest::Client,
    dry_run: bool,
}

impl std::fmt::Debug for AlidnsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlidnsRepository")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("domain", &self.domain)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl AlidnsRepository {
    /// Create a repository for `domain`
    ///
    /// Fails when the provider configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ProviderConfig, domain: DomainName) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            access_key_id: config.access_key_id.clone(),
            access_key_secret: config.access_key_secret.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            domain,
            client,
            dry_run: config.dry_run,
        })
    }

    /// The domain this repository manages
    pub fn domain(&self) -> &DomainName {
        &self.domain
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Sign and send one RPC call, decoding the JSON body on success
    async fn call<T: DeserializeOwned>(&self, request: RpcRequest) -> Result<T> {
        let action = request.action();
        let timestamp = chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let nonce = format!("{:032x}", rand::random::<u128>());
        let query = request.signed_query(
            &self.access_key_id,
            &self.access_key_secret,
            &timestamp,
            &nonce,
        )?;

        tracing::debug!("Calling {} on {}", action, self.endpoint);

        let response = self
            .client
            .get(format!("{}/?{}", self.endpoint, query))
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{} response unreadable: {}", action, e.without_url())))?;

        if !status.is_success() {
            return Err(classify_error(action, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("Invalid {} response: {}", action, e),
            )
        })
    }

    /// All AAAA records for `host_label`, across pages
    async fn list_aaaa(&self, host_label: &str) -> Result<Vec<DomainRecord>> {
        let mut matches = Vec::new();
        let mut seen = 0u64;
        let mut page = 1u64;

        loop {
            let request = RpcRequest::new("DescribeDomainRecords")
                .param("DomainName", self.domain.registrable_domain())
                .param("RRKeyWord", host_label)
                .param("TypeKeyWord", "AAAA")
                .param("PageSize", PAGE_SIZE.to_string())
                .param("PageNumber", page.to_string());

            let response: DescribeDomainRecordsResponse = self.call(request).await?;
            let records = response.domain_records.record;
            if records.is_empty() {
                break;
            }

            seen += records.len() as u64;
            matches.extend(records.into_iter().filter(|r| r.is_aaaa_for(host_label)));

            if seen >= response.total_count {
                break;
            }
            page += 1;
        }

        Ok(matches)
    }

    fn log_dry_run(&self, request: &RpcRequest) {
        let params = request
            .params()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!("[DRY-RUN] Would call {}: {}", request.action(), params);
    }
}

#[async_trait]
impl RecordRepository for AlidnsRepository {
    async fn find(&self, host_label: &str) -> Result<Option<RemoteRecord>> {
        let mut records = self.list_aaaa(host_label).await?.into_iter();

        let Some(first) = records.next() else {
            tracing::debug!(
                "No AAAA record for {} in {}",
                host_label,
                self.domain.registrable_domain()
            );
            return Ok(None);
        };

        let ignored = records.count();
        if ignored > 0 {
            tracing::warn!(
                "Found {} AAAA records for {}, using record {} and ignoring the other {}",
                ignored + 1,
                self.domain.fqdn(),
                first.record_id,
                ignored
            );
        }

        Ok(Some(RemoteRecord::new(first.record_id, first.rr, first.value)))
    }

    async fn create(&self, host_label: &str, address: Ipv6Addr) -> Result<String> {
        let request = RpcRequest::new("AddDomainRecord")
            .param("DomainName", self.domain.registrable_domain())
            .param("RR", host_label)
            .param("Type", "AAAA")
            .param("Value", address.to_string());

        if self.dry_run {
            self.log_dry_run(&request);
            return Ok(DRY_RUN_RECORD_ID.to_string());
        }

        let response: RecordMutationResponse = self.call(request).await?;
        tracing::debug!(
            "AddDomainRecord accepted (request {})",
            response.request_id.as_deref().unwrap_or("unknown")
        );
        Ok(response.record_id)
    }

    async fn update(&self, record_id: &str, address: Ipv6Addr) -> Result<()> {
        let request = RpcRequest::new("UpdateDomainRecord")
            .param("RecordId", record_id)
            .param("RR", self.domain.host_label())
            .param("Type", "AAAA")
            .param("Value", address.to_string());

        if self.dry_run {
            self.log_dry_run(&request);
            return Ok(());
        }

        let response: RecordMutationResponse = self.call(request).await?;
        tracing::debug!(
            "UpdateDomainRecord accepted for record {} (request {})",
            response.record_id,
            response.request_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Map a non-2xx response to an error
///
/// The provider `Code` is checked together with the HTTP status, since
/// Alidns reports several client errors (bad key, missing domain) as 400.
pub fn classify_error(action: &str, status: u16, body: &str) -> Error {
    let detail: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = detail.code.as_str();

    let summary = if code.is_empty() {
        format!("{} returned HTTP {}: {}", action, status, body.trim())
    } else {
        format!(
            "{} returned HTTP {}: {}: {} (request {})",
            action,
            status,
            code,
            detail.message,
            detail.request_id.as_deref().unwrap_or("unknown")
        )
    };

    if matches!(status, 401 | 403)
        || code.starts_with("InvalidAccessKeyId")
        || code == "SignatureDoesNotMatch"
        || code.starts_with("Forbidden")
    {
        Error::auth(summary)
    } else if status == 429 || code.starts_with("Throttling") {
        Error::rate_limited(summary)
    } else if (500..=599).contains(&status) {
        Error::provider(PROVIDER_NAME, format!("transient: {}", summary))
    } else if status == 404 || code == "InvalidDomainName.NoExist" {
        Error::not_found(summary)
    } else {
        Error::provider(PROVIDER_NAME, summary)
    }
}
