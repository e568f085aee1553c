//! Reconciliation pass
//!
//! The Reconciler is responsible for:
//! - Resolving the local global IPv6 address via AddressSource
//! - Fetching the provider's current AAAA record via RecordRepository
//! - Creating, updating or leaving the record alone
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   resolve()    ┌──────────────┐
//! │ AddressSource │ ◀───────────── │  Reconciler  │
//! └───────────────┘                └──────────────┘
//!                                         │
//!                      find() / create() / update()
//!                                         ▼
//!                               ┌──────────────────┐
//!                               │ RecordRepository │
//!                               └──────────────────┘
//! ```
//!
//! ## Decision Table
//!
//! | Remote record | Values equal | Action                          |
//! |---------------|--------------|---------------------------------|
//! | absent        | n/a          | `create(host_label, local)`     |
//! | present       | yes          | no-op                           |
//! | present       | no           | `update(record_id, local)`      |
//!
//! A pass carries no state into the next one.

use crate::config::DomainName;
use crate::error::{Error, Mutation, Result};
use crate::traits::{AddressSource, RecordRepository};
use std::net::Ipv6Addr;
use tracing::{debug, error, info, warn};

/// What a successful pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// No record existed; one was created
    Created {
        record_id: String,
        address: Ipv6Addr,
    },

    /// The record pointed elsewhere and was updated
    Updated {
        record_id: String,
        previous: String,
        address: Ipv6Addr,
    },

    /// The record already pointed at the local address
    Unchanged { address: Ipv6Addr },
}

impl SyncAction {
    /// The address the record points at after the pass
    pub fn address(&self) -> Ipv6Addr {
        match self {
            SyncAction::Created { address, .. }
            | SyncAction::Updated { address, .. }
            | SyncAction::Unchanged { address } => *address,
        }
    }

    /// Whether the pass changed anything on the provider side
    pub fn is_mutation(&self) -> bool {
        !matches!(self, SyncAction::Unchanged { .. })
    }
}

/// Runs one reconciliation pass at a time
///
/// The reconciler holds no mutable state. It is safe to share behind an
/// `Arc` and to run several passes concurrently.
pub struct Reconciler {
    /// Local address discovery
    address_source: Box<dyn AddressSource>,

    /// Provider binding
    repository: Box<dyn RecordRepository>,

    /// Managed domain
    domain: DomainName,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `address_source`: where the local address comes from
    /// - `repository`: provider binding configured for `domain`
    /// - `domain`: the managed domain (host label + registrable domain)
    pub fn new(
        address_source: Box<dyn AddressSource>,
        repository: Box<dyn RecordRepository>,
        domain: DomainName,
    ) -> Self {
        Self {
            address_source,
            repository,
            domain,
        }
    }

    /// The managed domain
    pub fn domain(&self) -> &DomainName {
        &self.domain
    }

    /// Run one pass and log any failure
    ///
    /// Never fails: discovery, lookup and mutation errors are logged here
    /// and reported as `None`. The next pass starts from scratch.
    pub async fn reconcile_once(&self) -> Option<SyncAction> {
        match self.try_reconcile().await {
            Ok(action) => Some(action),
            Err(e) => {
                log_pass_failure(&e);
                None
            }
        }
    }

    /// Run one pass, returning the failure to the caller
    ///
    /// # Returns
    ///
    /// - `Ok(SyncAction)`: what the pass did
    /// - `Err(Error::Discovery)`: no usable local address; no provider call was made
    /// - `Err(Error::Lookup)`: the provider could not be queried
    /// - `Err(Error::Mutation)`: create or update was rejected
    pub async fn try_reconcile(&self) -> Result<SyncAction> {
        let fqdn = self.domain.fqdn();
        let host_label = self.domain.host_label();

        // Step 1: local address
        let address = self.address_source.resolve().ok_or_else(|| {
            Error::discovery(format!(
                "no global IPv6 address on {}",
                self.address_source.describe()
            ))
        })?;
        debug!("Local address for {}: {}", fqdn, address);

        // Step 2: remote record
        let remote = self
            .repository
            .find(host_label)
            .await
            .map_err(Error::lookup)?;

        // Step 3: decide
        match remote {
            None => {
                let record_id = self
                    .repository
                    .create(host_label, address)
                    .await
                    .map_err(|e| Error::mutation(Mutation::Create, e))?;
                info!(
                    "Created AAAA record {} -> {} (record {})",
                    fqdn, address, record_id
                );
                Ok(SyncAction::Created { record_id, address })
            }
            Some(record) if record.points_to(address) => {
                info!(
                    "AAAA record {} already in sync: local {}, remote {}",
                    fqdn, address, record.value
                );
                Ok(SyncAction::Unchanged { address })
            }
            Some(record) => {
                self.repository
                    .update(&record.record_id, address)
                    .await
                    .map_err(|e| Error::mutation(Mutation::Update, e))?;
                info!(
                    "Updated AAAA record {} -> {} (was {})",
                    fqdn, address, record.value
                );
                Ok(SyncAction::Updated {
                    record_id: record.record_id,
                    previous: record.value,
                    address,
                })
            }
        }
    }
}

/// Log a failed pass at the severity its kind deserves
///
/// A missing address is an expected state (interface down, no RA yet) and
/// is logged as a warning. Everything else is an error.
pub fn log_pass_failure(error: &Error) {
    match error {
        Error::Discovery(_) => warn!("{}", error),
        _ => error!("{}", error),
    }
}
