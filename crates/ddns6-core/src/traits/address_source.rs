// # Address Source Trait
//
// Defines the interface for discovering the host's current global IPv6
// address.
//
// ## Implementations
//
// - Network interface: `ddns6-ip-ifaddrs` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns6_core::AddressSource;
//
// let source = /* AddressSource implementation */;
// match source.resolve() {
//     Some(address) => println!("global address: {address}"),
//     None => println!("no usable address, skipping this pass"),
// }
// ```

use std::net::Ipv6Addr;

/// Trait for address source implementations
///
/// Resolution is a read-only, local query. It is synchronous on purpose:
/// the reconciler calls it once per pass before any network I/O happens.
///
/// ## Contract
///
/// - Returns at most one address, the first usable one in the order the
///   operating system reports them
/// - Never returns link-local or unique-local addresses
/// - A missing interface or an OS error yields `None`, not an error; the
///   caller treats `None` as "skip this pass"
pub trait AddressSource: Send + Sync {
    /// Resolve the current global IPv6 address
    fn resolve(&self) -> Option<Ipv6Addr>;

    /// Human-readable description of where addresses come from
    /// (for logging, e.g. `interface eth0`)
    fn describe(&self) -> String;
}
