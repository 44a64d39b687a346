// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interface address configuration applied on Router Advertisement delivery.
//!
//! The registry hands the advertisement to an [`AddressConfigurator`] exactly
//! once per satisfied waiter. [`NetDeviceTable`] is the in-process
//! implementation: per-interface IPv6 state behind a single coarse lock, kept
//! separate from the registry's list lock.
//!
//! Reconfiguring a live interface is acceptable here: outbound traffic on the
//! device is serialized by the same lock, and inbound filtering is done on the
//! MAC address, which never changes.

use crate::ifname::IfName;
use crate::prefix::{merge_prefix, prefix_to_mask, RouterAdvertisement};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::Ipv6Addr;

/// Applies a delivered advertisement to an interface.
///
/// Called outside the registry critical section. Implementations take
/// whatever lock guards their interface state.
pub trait AddressConfigurator: Send + Sync {
    fn set_addresses(&self, ifname: &IfName, ra: &RouterAdvertisement);
}

/// IPv6 addressing state of one interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv6Config {
    /// Interface address.
    pub addr: Ipv6Addr,
    /// Network mask.
    pub netmask: Ipv6Addr,
    /// Default router.
    pub draddr: Ipv6Addr,
}

impl Ipv6Config {
    /// Fresh interface holding only its link-local address.
    pub fn link_local(addr: Ipv6Addr) -> Self {
        Self {
            addr,
            netmask: prefix_to_mask(64),
            draddr: Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Apply an advertisement: mask from prefix length, prefix merged into
    /// the address, router copied verbatim.
    pub fn apply(&mut self, ra: &RouterAdvertisement) {
        self.netmask = prefix_to_mask(ra.prefix_len);
        self.addr = merge_prefix(self.addr, ra.prefix, self.netmask);
        self.draddr = ra.router;
    }
}

impl Default for Ipv6Config {
    fn default() -> Self {
        Self {
            addr: Ipv6Addr::UNSPECIFIED,
            netmask: Ipv6Addr::UNSPECIFIED,
            draddr: Ipv6Addr::UNSPECIFIED,
        }
    }
}

/// Table of interfaces guarded by one coarse "network" lock.
#[derive(Debug, Default)]
pub struct NetDeviceTable {
    devices: Mutex<HashMap<IfName, Ipv6Config>>,
}

impl NetDeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an interface.
    pub fn add_device(&self, ifname: impl Into<IfName>, config: Ipv6Config) {
        let ifname = ifname.into();
        log::debug!("[ra-notify] netdev {} added addr={}", ifname, config.addr);
        self.devices.lock().insert(ifname, config);
    }

    /// Remove an interface, returning its last configuration.
    pub fn remove_device(&self, ifname: &IfName) -> Option<Ipv6Config> {
        self.devices.lock().remove(ifname)
    }

    /// Current configuration of an interface.
    pub fn config(&self, ifname: &IfName) -> Option<Ipv6Config> {
        self.devices.lock().get(ifname).copied()
    }

    /// Names of all known interfaces.
    pub fn devices(&self) -> Vec<IfName> {
        self.devices.lock().keys().copied().collect()
    }
}

impl AddressConfigurator for NetDeviceTable {
    fn set_addresses(&self, ifname: &IfName, ra: &RouterAdvertisement) {
        let mut devices = self.devices.lock();

        let Some(dev) = devices.get_mut(ifname) else {
            log::warn!(
                "[ra-notify] advertisement for unknown interface {} ignored",
                ifname
            );
            return;
        };

        dev.apply(ra);

        log::debug!(
            "[ra-notify] {} preflen={} netmask={}",
            ifname,
            ra.clamped_prefix_len(),
            dev.netmask
        );
        log::debug!("[ra-notify] {} prefix={}", ifname, ra.prefix);
        log::debug!("[ra-notify] {} IP address={}", ifname, dev.addr);
        log::debug!("[ra-notify] {} DR address={}", ifname, dev.draddr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ra(router: &str, prefix: &str, len: u8) -> RouterAdvertisement {
        RouterAdvertisement::new(router.parse().unwrap(), prefix.parse().unwrap(), len)
    }

    #[test]
    fn test_apply_updates_all_fields() {
        let mut cfg = Ipv6Config::link_local("fe80::211:22ff:fe33:4455".parse().unwrap());
        cfg.apply(&ra("fe80::1", "2001:db8::", 64));

        assert_eq!(
            cfg.addr,
            "2001:db8::211:22ff:fe33:4455".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(cfg.netmask, prefix_to_mask(64));
        assert_eq!(cfg.draddr, "fe80::1".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn test_table_set_addresses() {
        let table = NetDeviceTable::new();
        table.add_device("eth0", Ipv6Config::link_local("fe80::5".parse().unwrap()));
        table.add_device("eth1", Ipv6Config::link_local("fe80::6".parse().unwrap()));

        table.set_addresses(&IfName::new("eth0"), &ra("fe80::1", "2001:db8:a::", 48));

        let eth0 = table.config(&IfName::new("eth0")).unwrap();
        assert_eq!(eth0.addr, "2001:db8:a::5".parse::<Ipv6Addr>().unwrap());
        assert_eq!(eth0.draddr, "fe80::1".parse::<Ipv6Addr>().unwrap());

        // Other interfaces untouched
        let eth1 = table.config(&IfName::new("eth1")).unwrap();
        assert_eq!(eth1, Ipv6Config::link_local("fe80::6".parse().unwrap()));
    }

    #[test]
    fn test_unknown_interface_is_ignored() {
        let table = NetDeviceTable::new();
        table.add_device("eth0", Ipv6Config::default());

        table.set_addresses(&IfName::new("wlan0"), &ra("fe80::1", "2001:db8::", 64));

        assert!(table.config(&IfName::new("wlan0")).is_none());
        assert_eq!(table.config(&IfName::new("eth0")), Some(Ipv6Config::default()));
        assert_eq!(table.devices(), vec![IfName::new("eth0")]);
    }

    #[test]
    fn test_remove_device() {
        let table = NetDeviceTable::new();
        table.add_device("eth0", Ipv6Config::default());
        assert!(table.remove_device(&IfName::new("eth0")).is_some());
        assert!(table.remove_device(&IfName::new("eth0")).is_none());
    }
}
