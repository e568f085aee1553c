// # Interface Address Source
//
// This crate provides the address source that reads the host's IPv6
// addresses from a named network interface via `pnet::datalink`.
//
// ## Selection
//
// From the addresses bound to the interface, in the order the OS reports
// them:
// 1. Drop IPv4
// 2. Drop link-local (`fe80::/10`) and unique-local (`fc00::/7`)
// 3. Drop loopback and unspecified
// 4. Take the first one left
//
// No further ranking happens. Temporary (privacy) addresses are not
// distinguished from stable ones because the interface listing does not
// expose the flags; whichever the OS lists first wins.
//
// ## Platform Support
//
// Enumeration goes through `pnet::datalink::interfaces()`, which covers
// Linux, the BSDs, macOS and Windows.

use ddns6_core::AddressSource;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use std::net::{IpAddr, Ipv6Addr};
use tracing::debug;

/// Address source backed by a single network interface
#[derive(Debug, Clone)]
pub struct InterfaceAddressSource {
    interface: String,
}

impl InterfaceAddressSource {
    /// Create a source for the interface named `interface` (e.g. "eth0")
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    /// The interface name
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl AddressSource for InterfaceAddressSource {
    fn resolve(&self) -> Option<Ipv6Addr> {
        let Some(addresses) = interface_addresses(datalink::interfaces(), &self.interface) else {
            debug!("Interface {} not present", self.interface);
            return None;
        };

        let selected = select_global_ipv6(addresses.iter().copied());
        if selected.is_none() {
            debug!(
                "Interface {} has no global IPv6 address among {:?}",
                self.interface, addresses
            );
        }
        selected
    }

    fn describe(&self) -> String {
        format!("interface {}", self.interface)
    }
}

/// Pick the first usable global IPv6 address, preserving input order
pub fn select_global_ipv6<I>(addresses: I) -> Option<Ipv6Addr>
where
    I: IntoIterator<Item = IpAddr>,
{
    addresses.into_iter().find_map(|address| match address {
        IpAddr::V6(v6) if is_global_candidate(&v6) => Some(v6),
        _ => None,
    })
}

/// Whether `address` may be published in a AAAA record
pub fn is_global_candidate(address: &Ipv6Addr) -> bool {
    !(address.is_loopback()
        || address.is_unspecified()
        || is_link_local(address)
        || is_unique_local(address))
}

/// `fe80::/10`
pub fn is_link_local(address: &Ipv6Addr) -> bool {
    (address.segments()[0] & 0xffc0) == 0xfe80
}

/// `fc00::/7`
pub fn is_unique_local(address: &Ipv6Addr) -> bool {
    (address.segments()[0] & 0xfe00) == 0xfc00
}

/// Addresses bound to the interface called `name`, in the order listed
///
/// Returns `None` when no interface with that name exists.
pub fn interface_addresses<I>(interfaces: I, name: &str) -> Option<Vec<IpAddr>>
where
    I: IntoIterator<Item = NetworkInterface>,
{
    interfaces
        .into_iter()
        .find(|iface| iface.name == name)
        .map(|iface| iface.ips.iter().map(IpNetwork::ip).collect())
}
