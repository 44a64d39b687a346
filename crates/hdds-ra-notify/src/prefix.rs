// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! IPv6 prefix helpers and the Router Advertisement payload.

use std::net::Ipv6Addr;

/// Longest valid IPv6 prefix length.
pub const MAX_PREFIX_LEN: u8 = 128;

/// Configuration carried by a Router Advertisement.
///
/// Parsing and validating the ICMPv6 message is the caller's job; this is the
/// already-extracted triple applied to the interface on delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouterAdvertisement {
    /// Address of the advertising router (becomes the default router).
    pub router: Ipv6Addr,
    /// Advertised on-link prefix.
    pub prefix: Ipv6Addr,
    /// Prefix length in bits; values above 128 are clamped.
    pub prefix_len: u8,
}

impl RouterAdvertisement {
    pub fn new(router: Ipv6Addr, prefix: Ipv6Addr, prefix_len: u8) -> Self {
        Self {
            router,
            prefix,
            prefix_len,
        }
    }

    /// Prefix length clamped to [`MAX_PREFIX_LEN`].
    pub fn clamped_prefix_len(&self) -> u8 {
        self.prefix_len.min(MAX_PREFIX_LEN)
    }

    /// Network mask derived from the prefix length.
    pub fn netmask(&self) -> Ipv6Addr {
        prefix_to_mask(self.prefix_len)
    }
}

/// Build a network mask with the leading `prefix_len` bits set.
pub fn prefix_to_mask(prefix_len: u8) -> Ipv6Addr {
    let len = u32::from(prefix_len.min(MAX_PREFIX_LEN));
    let mask = match len {
        0 => 0,
        n => u128::MAX << (128 - n),
    };
    Ipv6Addr::from(mask)
}

/// Replace the bits of `addr` selected by `mask` with those of `prefix`.
///
/// Host bits (outside the mask) are left untouched.
pub fn merge_prefix(addr: Ipv6Addr, prefix: Ipv6Addr, mask: Ipv6Addr) -> Ipv6Addr {
    let addr = u128::from(addr);
    let prefix = u128::from(prefix);
    let mask = u128::from(mask);
    Ipv6Addr::from((addr & !mask) | (prefix & mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_to_mask() {
        assert_eq!(prefix_to_mask(0), Ipv6Addr::UNSPECIFIED);
        assert_eq!(
            prefix_to_mask(64),
            "ffff:ffff:ffff:ffff::".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(
            prefix_to_mask(48),
            "ffff:ffff:ffff::".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(
            prefix_to_mask(65),
            "ffff:ffff:ffff:ffff:8000::".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(prefix_to_mask(128), Ipv6Addr::from(u128::MAX));
    }

    #[test]
    fn test_prefix_len_is_clamped() {
        assert_eq!(prefix_to_mask(200), prefix_to_mask(128));

        let ra = RouterAdvertisement::new(Ipv6Addr::LOCALHOST, Ipv6Addr::UNSPECIFIED, 255);
        assert_eq!(ra.clamped_prefix_len(), 128);
        assert_eq!(ra.netmask(), Ipv6Addr::from(u128::MAX));
    }

    #[test]
    fn test_merge_keeps_host_bits() {
        let addr: Ipv6Addr = "fe80::211:22ff:fe33:4455".parse().unwrap();
        let prefix: Ipv6Addr = "2001:db8:1:2::".parse().unwrap();

        let merged = merge_prefix(addr, prefix, prefix_to_mask(64));
        assert_eq!(
            merged,
            "2001:db8:1:2:211:22ff:fe33:4455".parse::<Ipv6Addr>().unwrap()
        );
    }

    #[test]
    fn test_merge_ignores_prefix_bits_outside_mask() {
        let addr: Ipv6Addr = "fe80::1".parse().unwrap();
        let prefix: Ipv6Addr = "2001:db8::dead:beef".parse().unwrap();

        let merged = merge_prefix(addr, prefix, prefix_to_mask(32));
        assert_eq!(merged, "2001:db8::1".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn test_merge_with_empty_mask_is_identity() {
        let addr: Ipv6Addr = "fe80::abcd".parse().unwrap();
        let prefix: Ipv6Addr = "2001:db8::".parse().unwrap();
        assert_eq!(merge_prefix(addr, prefix, prefix_to_mask(0)), addr);
    }
}
