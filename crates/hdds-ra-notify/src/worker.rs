// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deferred Router Advertisement delivery.
//!
//! For receive paths that must never wait on the interface configuration
//! lock (driver callbacks, poll loops with latency budgets), [`RaNotifyWorker`]
//! queues the advertisement and performs the match-and-apply on its own
//! thread. Posting is a non-blocking channel push.
//!
//! The waiter-facing contract is unchanged: the same registry claims, applies
//! and signals exactly as a direct [`RaWaitRegistry::deliver`] would.

use crate::ifname::IfName;
use crate::prefix::RouterAdvertisement;
use crate::registry::RaWaitRegistry;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum Command {
    Deliver(IfName, RouterAdvertisement),
    Stop,
}

/// Worker counters.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Advertisements accepted into the queue.
    pub posted: AtomicU64,
    /// Advertisements dropped (queue full or worker stopped).
    pub dropped: AtomicU64,
    /// Advertisements handed to the registry.
    pub delivered: AtomicU64,
}

/// Background thread running registry deliveries in task context.
pub struct RaNotifyWorker {
    tx: Sender<Command>,
    /// Set before `Stop` is queued; posts hold the read side across the send.
    stopping: RwLock<bool>,
    thread: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<WorkerStats>,
}

impl RaNotifyWorker {
    /// Spawn the worker for `registry`.
    ///
    /// Queue capacity and thread name come from the registry configuration.
    pub fn spawn(registry: RaWaitRegistry) -> io::Result<Self> {
        let capacity = registry.config().worker_queue_capacity.max(1);
        let name = registry.config().worker_thread_name.clone();
        let (tx, rx) = channel::bounded(capacity);
        let stats = Arc::new(WorkerStats::default());
        let thread_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run(registry, rx, thread_stats))?;

        log::debug!("[ra-notify] deferred worker started (queue={})", capacity);

        Ok(Self {
            tx,
            stopping: RwLock::new(false),
            thread: Mutex::new(Some(handle)),
            stats,
        })
    }

    /// Queue an advertisement for delivery. Never blocks.
    ///
    /// Returns `false` if it was dropped because the queue is full or the
    /// worker has stopped.
    pub fn post(&self, ifname: IfName, ra: RouterAdvertisement) -> bool {
        let stopping = self.stopping.read();
        if *stopping {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "[ra-notify] {} advertisement dropped: worker stopping",
                ifname
            );
            return false;
        }

        match self.tx.try_send(Command::Deliver(ifname, ra)) {
            Ok(()) => {
                self.stats.posted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("[ra-notify] {} advertisement dropped: queue full", ifname);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "[ra-notify] {} advertisement dropped: worker stopped",
                    ifname
                );
                false
            }
        }
    }

    /// Worker counters.
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// `true` once [`stop`](Self::stop) has begun. New posts are dropped.
    pub fn is_stopping(&self) -> bool {
        *self.stopping.read()
    }

    /// `true` while the worker thread is alive.
    pub fn is_running(&self) -> bool {
        self.thread
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the worker after it drains already-queued advertisements.
    ///
    /// Posts accepted before this call are delivered; later posts are
    /// dropped. Waits for the thread to exit. Safe to call multiple times.
    pub fn stop(&self) {
        *self.stopping.write() = true;

        let Some(handle) = self.thread.lock().take() else {
            return;
        };

        // The queue may be full; a blocking send still lands once it drains
        if self.tx.send(Command::Stop).is_err() {
            log::debug!("[ra-notify] worker already gone");
        }
        if handle.join().is_err() {
            log::warn!("[ra-notify] deferred worker panicked");
        }
    }
}

impl Drop for RaNotifyWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(registry: RaWaitRegistry, rx: Receiver<Command>, stats: Arc<WorkerStats>) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            Command::Deliver(ifname, ra) => {
                registry.deliver(&ifname, &ra);
                stats.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Command::Stop => break,
        }
    }
    log::debug!("[ra-notify] deferred worker exiting");
}
