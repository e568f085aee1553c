//! Core traits for ddns6
//!
//! - [`AddressSource`]: Discover the host's global IPv6 address
//! - [`RecordRepository`]: Read and write the provider's AAAA record

pub mod address_source;
pub mod record_repository;

pub use address_source::AddressSource;
pub use record_repository::{RecordRepository, RemoteRecord};
