// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-ra-notify - Router Advertisement wait/notify
//!
//! Bounded, exactly-once notification used by IPv6 address
//! autoconfiguration: a task that sends a Router Solicitation parks until the
//! matching Router Advertisement arrives on the same interface, or until a
//! timeout. The receive path delivers the advertisement, applies the
//! prefix/router to the interface and wakes exactly that task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdds_ra_notify::{IfName, Ipv6Config, NetDeviceTable, RaWaitRegistry, RouterAdvertisement};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let netdev = Arc::new(NetDeviceTable::new());
//! netdev.add_device("eth0", Ipv6Config::link_local("fe80::2".parse().unwrap()));
//! let registry = RaWaitRegistry::new(netdev);
//!
//! // Requester: register BEFORE sending the solicitation
//! let waiter = registry.register("eth0");
//! // ... send Router Solicitation on eth0 ...
//!
//! // Receive path (another thread, usually)
//! let ra = RouterAdvertisement::new("fe80::1".parse().unwrap(), "2001:db8::".parse().unwrap(), 64);
//! registry.deliver(&IfName::new("eth0"), &ra);
//!
//! registry.wait_and_remove(waiter, Duration::from_secs(3))?;
//! # Ok::<(), hdds_ra_notify::RaWaitError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------+        +------------------------------+
//! |  autoconf driver (task) |        |  ICMPv6 receive path         |
//! |  register / send / wait |        |  deliver  or  worker.post    |
//! +------------+------------+        +---------------+--------------+
//!              |                                     |
//! +------------v-------------------------------------v--------------+
//! |                        RaWaitRegistry                           |
//! |   waiter list (short lock)  ->  WakeSignal per waiter           |
//! +-------------------------------+---------------------------------+
//!                                 | set_addresses (coarse lock)
//! +-------------------------------v---------------------------------+
//! |                AddressConfigurator / NetDeviceTable              |
//! +-----------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`registry`] - waiter registration, delivery, wait and removal
//! - [`signal`] - bounded-wait binary wake signal
//! - [`netdev`] - interface address configuration
//! - [`prefix`] - prefix/mask helpers and the advertisement payload
//! - [`worker`] - deferred delivery thread
//! - [`config`] - TOML configuration

pub mod config;
pub mod error;
pub mod ifname;
pub mod netdev;
pub mod prefix;
pub mod registry;
pub mod signal;
pub mod worker;

pub use config::{ConfigError, RaNotifyConfig};
pub use error::{RaWaitError, Result};
pub use ifname::{IfName, IFNAMSIZ};
pub use netdev::{AddressConfigurator, Ipv6Config, NetDeviceTable};
pub use prefix::{merge_prefix, prefix_to_mask, RouterAdvertisement, MAX_PREFIX_LEN};
pub use registry::{
    RaWaitRegistry, RaWaiter, RegistryStats, RegistryStatsSnapshot, WaiterState,
};
pub use signal::{SignalWaitError, WakeSignal};
pub use worker::{RaNotifyWorker, WorkerStats};
