// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of tasks waiting for a Router Advertisement.
//!
//! # Protocol
//!
//! ```text
//! requester                         registry                deliverer
//! ---------                         --------                ---------
//! register(ifname) ---------------> link waiter (front)
//! send Router Solicitation
//! wait_and_remove(waiter, timeout)  ...parked...
//!                                                  <------- deliver(ifname, ra)
//!                                   claim first REGISTERED match
//!                                   apply ra (netdev lock)
//!                                   post wake signal
//! <-------------------------------- woken
//! cancel(waiter) -----------------> unlink, destroy signal
//! ```
//!
//! The waiter MUST be registered before the solicitation goes out. A reply
//! that races the send then always finds the entry; registering afterwards
//! reintroduces the missed-wakeup window and the registry cannot detect it.
//!
//! # Locking
//!
//! - List lock: short, never held across a blocking call. Guards link/unlink
//!   and the claim of a waiter by `deliver`.
//! - Configuration lock: owned by the [`AddressConfigurator`], taken by
//!   `deliver` only after the list lock is released.
//!
//! # Waiter states
//!
//! `Registered -> Satisfied -> Removed` or `Registered -> Removed`. A waiter
//! is claimed by at most one `deliver` (compare-and-swap under the list lock),
//! so its result is written at most once.

use crate::config::RaNotifyConfig;
use crate::error::{RaWaitError, Result};
use crate::ifname::IfName;
use crate::netdev::AddressConfigurator;
use crate::prefix::RouterAdvertisement;
use crate::signal::{SignalWaitError, WakeSignal};
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

const STATE_REGISTERED: u8 = 0;
const STATE_SATISFIED: u8 = 1;
const STATE_REMOVED: u8 = 2;

/// Lifecycle state of a waiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaiterState {
    /// Linked, no advertisement yet (timeout sentinel).
    Registered,
    /// Claimed by a delivery; configuration and wake may still be in flight.
    Satisfied,
    /// Unlinked. Terminal.
    Removed,
}

impl WaiterState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_REGISTERED => Self::Registered,
            STATE_SATISFIED => Self::Satisfied,
            _ => Self::Removed,
        }
    }
}

struct WaitSlot {
    ifname: IfName,
    state: AtomicU8,
    signal: WakeSignal,
}

impl WaitSlot {
    fn new(ifname: IfName) -> Self {
        Self {
            ifname,
            state: AtomicU8::new(STATE_REGISTERED),
            signal: WakeSignal::new(),
        }
    }

    fn state(&self) -> WaiterState {
        WaiterState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Move `Registered -> Satisfied`. Fails if already claimed or removed.
    fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(
                STATE_REGISTERED,
                STATE_SATISFIED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn mark_removed(&self) {
        self.state.store(STATE_REMOVED, Ordering::Release);
    }
}

/// Registry counters.
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Waiters registered.
    pub registered: AtomicU64,
    /// Deliveries that satisfied a waiter.
    pub satisfied: AtomicU64,
    /// Deliveries dropped with no matching waiter.
    pub unmatched: AtomicU64,
    /// Waits that timed out.
    pub timeouts: AtomicU64,
    /// Waits that were interrupted.
    pub interrupted: AtomicU64,
    /// Waiters unlinked by `cancel` (including the cleanup in `wait_and_remove`).
    pub cancelled: AtomicU64,
    /// Removals that did not find the waiter.
    pub not_found: AtomicU64,
}

impl RegistryStats {
    /// Get snapshot of current stats.
    pub fn snapshot(&self) -> RegistryStatsSnapshot {
        RegistryStatsSnapshot {
            registered: self.registered.load(Ordering::Relaxed),
            satisfied: self.satisfied.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RegistryStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStatsSnapshot {
    pub registered: u64,
    pub satisfied: u64,
    pub unmatched: u64,
    pub timeouts: u64,
    pub interrupted: u64,
    pub cancelled: u64,
    pub not_found: u64,
}

struct Shared {
    /// Oldest first; scanned in reverse so the newest registration wins.
    waiters: Mutex<Vec<Arc<WaitSlot>>>,
    configurator: Arc<dyn AddressConfigurator>,
    config: RaNotifyConfig,
    stats: RegistryStats,
}

impl Shared {
    fn unlink(&self, slot: &Arc<WaitSlot>) -> bool {
        let mut waiters = self.waiters.lock();
        match waiters.iter().position(|s| Arc::ptr_eq(s, slot)) {
            Some(idx) => {
                waiters.remove(idx);
                slot.mark_removed();
                true
            }
            None => false,
        }
    }
}

/// Handle to a registered wait.
///
/// Returned by [`RaWaitRegistry::register`] and consumed by
/// [`wait_and_remove`](RaWaitRegistry::wait_and_remove) or
/// [`cancel`](RaWaitRegistry::cancel), so a wait can be neither reused nor
/// registered twice. Dropping the handle unlinks it from its registry.
pub struct RaWaiter {
    slot: Arc<WaitSlot>,
    owner: Weak<Shared>,
    linked: bool,
}

impl RaWaiter {
    /// Interface this waiter is bound to.
    pub fn ifname(&self) -> &IfName {
        &self.slot.ifname
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WaiterState {
        self.slot.state()
    }

    /// `true` once a matching advertisement has been applied.
    pub fn is_satisfied(&self) -> bool {
        self.state() == WaiterState::Satisfied
    }
}

impl fmt::Debug for RaWaiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaWaiter")
            .field("ifname", &self.slot.ifname)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for RaWaiter {
    fn drop(&mut self) {
        if !self.linked {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            if owner.unlink(&self.slot) {
                log::debug!(
                    "[ra-notify] {} waiter dropped without cancel, unlinked",
                    self.slot.ifname
                );
            }
        }
        self.slot.mark_removed();
        self.slot.signal.destroy();
    }
}

/// Registry of pending Router Advertisement waits.
///
/// Cheap to clone; clones share the same waiter list. Each networking
/// subsystem owns its own registry, there is no global instance.
#[derive(Clone)]
pub struct RaWaitRegistry {
    shared: Arc<Shared>,
}

impl RaWaitRegistry {
    /// Create a registry applying advertisements through `configurator`.
    pub fn new(configurator: Arc<dyn AddressConfigurator>) -> Self {
        Self::with_config(configurator, RaNotifyConfig::default())
    }

    /// Create a registry with explicit configuration.
    pub fn with_config(configurator: Arc<dyn AddressConfigurator>, config: RaNotifyConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                waiters: Mutex::new(Vec::new()),
                configurator,
                config,
                stats: RegistryStats::default(),
            }),
        }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RaNotifyConfig {
        &self.shared.config
    }

    /// Snapshot of registry counters.
    pub fn stats(&self) -> RegistryStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Number of linked waiters.
    pub fn len(&self) -> usize {
        self.shared.waiters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.waiters.lock().is_empty()
    }

    /// `true` if `waiter` is linked in this registry.
    pub fn contains(&self, waiter: &RaWaiter) -> bool {
        self.shared
            .waiters
            .lock()
            .iter()
            .any(|s| Arc::ptr_eq(s, &waiter.slot))
    }

    /// Number of unsatisfied waiters for `ifname`.
    pub fn pending_for(&self, ifname: &IfName) -> usize {
        self.shared
            .waiters
            .lock()
            .iter()
            .filter(|s| s.ifname == *ifname && s.state() == WaiterState::Registered)
            .count()
    }

    /// Register a wait on `ifname`.
    ///
    /// Call this BEFORE sending the Router Solicitation. Never blocks beyond
    /// the list lock and cannot fail.
    pub fn register(&self, ifname: impl Into<IfName>) -> RaWaiter {
        let slot = Arc::new(WaitSlot::new(ifname.into()));

        self.shared.waiters.lock().push(Arc::clone(&slot));
        self.shared.stats.registered.fetch_add(1, Ordering::Relaxed);

        log::debug!("[ra-notify] {} waiter registered", slot.ifname);

        RaWaiter {
            slot,
            owner: Arc::downgrade(&self.shared),
            linked: true,
        }
    }

    /// Deliver a Router Advertisement received on `ifname`.
    ///
    /// Satisfies the most recently registered unsatisfied waiter for the
    /// interface: applies `ra` through the configurator, then wakes the
    /// waiter. At most one waiter is satisfied per call. With no match the
    /// advertisement is dropped silently (unsolicited or late replies).
    ///
    /// Returns `true` if a waiter was satisfied.
    pub fn deliver(&self, ifname: &IfName, ra: &RouterAdvertisement) -> bool {
        let claimed = {
            let waiters = self.shared.waiters.lock();
            waiters
                .iter()
                .rev()
                .find(|slot| slot.ifname == *ifname && slot.try_claim())
                .cloned()
        };

        let Some(slot) = claimed else {
            self.shared.stats.unmatched.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                "[ra-notify] {} advertisement from {} has no waiter, dropped",
                ifname,
                ra.router
            );
            return false;
        };

        self.shared.configurator.set_addresses(ifname, ra);
        slot.signal.post();
        self.shared.stats.satisfied.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "[ra-notify] {} notified: prefix={}/{} router={}",
            ifname,
            ra.prefix,
            ra.clamped_prefix_len(),
            ra.router
        );
        true
    }

    /// Wait up to `timeout` for a matching advertisement, then remove the
    /// waiter.
    ///
    /// Removal happens on every path. A wait interrupted by
    /// [`shutdown`](Self::shutdown) returns `Interrupted` without consulting
    /// the waiter's result.
    pub fn wait_and_remove(&self, waiter: RaWaiter, timeout: Duration) -> Result<()> {
        log::debug!(
            "[ra-notify] {} waiting up to {:?}",
            waiter.slot.ifname,
            timeout
        );

        let outcome = match waiter.slot.signal.wait_timeout(timeout) {
            Ok(()) => match waiter.slot.state() {
                WaiterState::Satisfied => Ok(()),
                _ => Err(RaWaitError::TimedOut),
            },
            Err(SignalWaitError::Timeout) => Err(RaWaitError::TimedOut),
            Err(SignalWaitError::Interrupted) => Err(RaWaitError::Interrupted),
        };

        match &outcome {
            Err(RaWaitError::TimedOut) => {
                self.shared.stats.timeouts.fetch_add(1, Ordering::Relaxed);
            }
            Err(RaWaitError::Interrupted) => {
                self.shared.stats.interrupted.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        // The wait outcome wins over a removal failure
        let _ = self.cancel(waiter);
        outcome
    }

    /// [`wait_and_remove`](Self::wait_and_remove) with the configured
    /// default timeout.
    pub fn wait_default(&self, waiter: RaWaiter) -> Result<()> {
        let timeout = self.shared.config.default_timeout();
        self.wait_and_remove(waiter, timeout)
    }

    /// Remove a waiter without waiting.
    ///
    /// Safe whether or not the waiter was already satisfied. The wake signal
    /// is destroyed even when the waiter is not found.
    pub fn cancel(&self, mut waiter: RaWaiter) -> Result<()> {
        let found = self.shared.unlink(&waiter.slot);
        waiter.slot.mark_removed();
        waiter.slot.signal.destroy();

        if found {
            waiter.linked = false;
            self.shared.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            log::debug!("[ra-notify] {} waiter removed", waiter.slot.ifname);
            Ok(())
        } else {
            self.shared.stats.not_found.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "[ra-notify] {} waiter not found in registry on removal",
                waiter.slot.ifname
            );
            Err(RaWaitError::NotFound)
        }
    }

    /// Register, transmit, then wait.
    ///
    /// `send` transmits the Router Solicitation; it runs after the waiter is
    /// linked. On a send failure the waiter is cancelled and `SendFailed` is
    /// returned.
    pub fn solicit<F>(&self, ifname: impl Into<IfName>, timeout: Duration, send: F) -> Result<()>
    where
        F: FnOnce() -> io::Result<()>,
    {
        let waiter = self.register(ifname);

        if let Err(e) = send() {
            log::warn!(
                "[ra-notify] {} router solicitation failed: {}",
                waiter.slot.ifname,
                e
            );
            let _ = self.cancel(waiter);
            return Err(RaWaitError::SendFailed(e));
        }

        self.wait_and_remove(waiter, timeout)
    }

    /// Interrupt every registered waiter.
    ///
    /// Blocked and future waits on those waiters return `Interrupted` unless
    /// a delivery already posted them. Owners still remove their waiters
    /// through the usual `wait_and_remove`/`cancel`. Returns the number of
    /// waiters interrupted.
    pub fn shutdown(&self) -> usize {
        let slots: Vec<Arc<WaitSlot>> = self.shared.waiters.lock().clone();

        for slot in &slots {
            slot.signal.interrupt();
        }

        if !slots.is_empty() {
            log::info!("[ra-notify] shutdown interrupted {} waiter(s)", slots.len());
        }
        slots.len()
    }
}

impl fmt::Debug for RaWaitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaWaitRegistry")
            .field("waiters", &self.len())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}
