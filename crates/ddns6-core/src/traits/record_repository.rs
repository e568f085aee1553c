// # Record Repository Trait
//
// Defines the interface to the DNS provider's AAAA record for the managed
// host label.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `ddns6-provider-alidns` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns6_core::RecordRepository;
//
// let repository = /* RecordRepository implementation */;
// match repository.find("home").await? {
//     Some(record) => repository.update(&record.record_id, address).await?,
//     None => { repository.create("home", address).await?; }
// }
// ```

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// The provider's current AAAA record for the host label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    /// Opaque provider-side identifier
    pub record_id: String,
    /// Host label the record is attached to
    pub label: String,
    /// Record value as returned by the provider
    pub value: String,
}

impl RemoteRecord {
    /// Create a new remote record
    pub fn new(
        record_id: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            label: label.into(),
            value: value.into(),
        }
    }

    /// The record value parsed as an IPv6 address
    pub fn address(&self) -> Option<Ipv6Addr> {
        self.value.trim().parse().ok()
    }

    /// Whether the record already points at `address`
    ///
    /// Values are compared as addresses, not strings, so `2001:DB8::1` and
    /// `2001:db8:0::1` match. A value that is not an IPv6 address never
    /// matches.
    pub fn points_to(&self, address: Ipv6Addr) -> bool {
        self.address() == Some(address)
    }
}

/// Trait for DNS provider bindings
///
/// Every implementation is configured at construction time with the
/// registrable domain (and host label) it manages.
///
/// # Thread Safety
///
/// Implementations must be thread-safe; overlapping passes may call into
/// the same repository concurrently.
///
/// ## Rules
/// - One provider round-trip per operation (pagination aside)
/// - No caching: every call reflects the provider's current state
/// - No retries or backoff: return the error, the next tick retries
/// - Never decide whether an update is needed (owned by `Reconciler`)
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Find the AAAA record whose label equals `host_label` exactly
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: the first matching record
    /// - `Ok(None)`: no such record exists yet
    /// - `Err(Error)`: the provider could not be queried
    async fn find(&self, host_label: &str) -> Result<Option<RemoteRecord>, crate::Error>;

    /// Create a new AAAA record for `host_label` pointing at `address`
    ///
    /// # Returns
    ///
    /// The provider's identifier for the new record
    async fn create(&self, host_label: &str, address: Ipv6Addr) -> Result<String, crate::Error>;

    /// Point the existing record `record_id` at `address`
    ///
    /// The label stays the configured host label and the type stays AAAA.
    async fn update(&self, record_id: &str, address: Ipv6Addr) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
