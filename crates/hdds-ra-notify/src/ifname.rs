// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-size network interface names.
//!
//! Waiters copy the interface name at registration time instead of holding a
//! reference to the device, so the entry stays valid if the device handle is
//! reused or renamed while the wait is outstanding.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Interface name buffer size, including the NUL terminator.
pub const IFNAMSIZ: usize = 16;

/// NUL-padded interface name (`eth0`, `wlan0`, ...).
///
/// Names longer than `IFNAMSIZ - 1` bytes are truncated. All bytes after the
/// name are zero, so equality is the bounded `strncmp` comparison.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IfName([u8; IFNAMSIZ]);

impl IfName {
    /// Build from a string, truncating on a UTF-8 boundary if needed.
    ///
    /// An embedded NUL ends the name, as in `from_bytes`.
    pub fn new(name: &str) -> Self {
        let end = name.bytes().position(|b| b == 0).unwrap_or(name.len());
        let mut len = end.min(IFNAMSIZ - 1);
        while !name.is_char_boundary(len) {
            len -= 1;
        }

        let mut buf = [0u8; IFNAMSIZ];
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self(buf)
    }

    /// Build from a raw C buffer. Bytes after the first NUL are ignored.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut buf = [0u8; IFNAMSIZ];
        for (dst, &src) in buf.iter_mut().zip(raw).take(IFNAMSIZ - 1) {
            if src == 0 {
                break;
            }
            *dst = src;
        }
        Self(buf)
    }

    /// Length of the name in bytes.
    pub fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(IFNAMSIZ)
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Name bytes without padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..self.len()]
    }

    /// Name as a string slice (lossy names from raw buffers yield `"?"`).
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or("?")
    }
}

impl FromStr for IfName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for IfName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for IfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for IfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IfName({:?})", self.as_str())
    }
}
