// # ddns6-core
//
// Core library for the ddns6 AAAA record synchronization daemon.
//
// ## Architecture Overview
//
// - **AddressSource**: Trait for discovering the host's global IPv6 address
// - **RecordRepository**: Trait for reading and writing the provider's AAAA record
// - **Reconciler**: One reconciliation pass (discover → look up → create/update/no-op)
// - **Scheduler**: Drives passes on a fixed period, isolating failures between ticks
//
// ## Data Flow
//
// ```text
// Scheduler ──tick──▶ Reconciler ──▶ AddressSource     (local, synchronous)
//                                └─▶ RecordRepository  (provider API, async)
// ```
//
// Nothing is persisted between passes. Every pass re-derives its state from
// the interface and the provider; only the immutable [`SyncConfig`] built at
// startup is shared.

pub mod config;
pub mod error;
pub mod logging;
pub mod reconciler;
pub mod scheduler;
pub mod traits;

// Re-export core types for convenience
pub use config::{DomainName, ProviderConfig, SchedulerConfig, SyncConfig};
pub use error::{Error, Result};
pub use reconciler::{Reconciler, SyncAction};
pub use scheduler::{Scheduler, SchedulerReport};
pub use traits::{AddressSource, RecordRepository, RemoteRecord};
