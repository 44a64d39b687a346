// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-slot wake signal with bounded wait.
//!
//! Binary semaphore used to park the soliciting task until the deliverer
//! posts. It is a pure signal, not a resource lock: there is no owner and no
//! priority inheritance, posting never blocks beyond the internal state lock.
//!
//! # Lifecycle
//! - created unset at registration
//! - posted at most once by the deliverer
//! - destroyed by the owning task on removal; posts after that are ignored

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Why a bounded wait returned without being posted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalWaitError {
    /// The deadline elapsed.
    Timeout,
    /// The signal was interrupted or destroyed while waiting.
    Interrupted,
}

#[derive(Debug, Default)]
struct SignalState {
    posted: bool,
    interrupted: bool,
    destroyed: bool,
}

/// Binary wake signal (semaphore initialised to zero).
#[derive(Debug, Default)]
pub struct WakeSignal {
    state: Mutex<SignalState>,
    condvar: Condvar,
}

impl WakeSignal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post the signal, waking the waiter if it is parked.
    ///
    /// Returns `false` if the signal was already destroyed.
    pub fn post(&self) -> bool {
        let mut state = self.state.lock();
        if state.destroyed {
            return false;
        }
        state.posted = true;
        drop(state);

        self.condvar.notify_one();
        true
    }

    /// Wake the waiter with [`SignalWaitError::Interrupted`].
    pub fn interrupt(&self) {
        self.state.lock().interrupted = true;
        self.condvar.notify_all();
    }

    /// Tear the signal down. Later posts are ignored and a parked waiter is
    /// released as interrupted.
    pub fn destroy(&self) {
        self.state.lock().destroyed = true;
        self.condvar.notify_all();
    }

    /// `true` if posted and not yet consumed.
    pub fn is_posted(&self) -> bool {
        self.state.lock().posted
    }

    /// `true` once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Block until posted or until `timeout` elapses, consuming the post.
    ///
    /// A post that happened before the call returns immediately. Spurious
    /// condvar wakeups are absorbed; the wait never returns `Timeout` before
    /// the full duration has elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), SignalWaitError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();

        loop {
            if state.posted {
                state.posted = false;
                return Ok(());
            }
            if state.interrupted || state.destroyed {
                return Err(SignalWaitError::Interrupted);
            }

            match deadline {
                Some(deadline) => {
                    let timed_out = self.condvar.wait_until(&mut state, deadline).timed_out();
                    if timed_out && Instant::now() >= deadline {
                        // A post racing the deadline still counts
                        if state.posted {
                            state.posted = false;
                            return Ok(());
                        }
                        return Err(SignalWaitError::Timeout);
                    }
                }
                None => self.condvar.wait(&mut state),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_post_wakes_waiter() {
        let signal = Arc::new(WakeSignal::new());
        let s = Arc::clone(&signal);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            assert!(s.post());
        });

        let start = Instant::now();
        let result = signal.wait_timeout(Duration::from_millis(1000));
        let elapsed = start.elapsed();

        assert_eq!(result, Ok(()));
        assert!(elapsed < Duration::from_millis(500), "Should wake quickly");
        assert!(!signal.is_posted(), "Post must be consumed");

        handle.join().unwrap();
    }

    #[test]
    fn test_timeout_without_post() {
        let signal = WakeSignal::new();

        let start = Instant::now();
        let result = signal.wait_timeout(Duration::from_millis(20));
        let elapsed = start.elapsed();

        assert_eq!(result, Err(SignalWaitError::Timeout));
        assert!(elapsed >= Duration::from_millis(20), "Must not time out early");
    }

    #[test]
    fn test_immediate_return_if_posted() {
        let signal = WakeSignal::new();
        signal.post();

        let start = Instant::now();
        assert_eq!(signal.wait_timeout(Duration::from_secs(5)), Ok(()));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_interrupt_releases_waiter() {
        let signal = Arc::new(WakeSignal::new());
        let s = Arc::clone(&signal);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            s.interrupt();
        });

        let result = signal.wait_timeout(Duration::from_secs(5));
        assert_eq!(result, Err(SignalWaitError::Interrupted));

        handle.join().unwrap();
    }

    #[test]
    fn test_post_after_destroy_is_ignored() {
        let signal = WakeSignal::new();
        signal.destroy();

        assert!(signal.is_destroyed());
        assert!(!signal.post());
        assert!(!signal.is_posted());
        assert_eq!(
            signal.wait_timeout(Duration::from_millis(1)),
            Err(SignalWaitError::Interrupted)
        );
    }

    #[test]
    fn test_binary_semantics() {
        let signal = WakeSignal::new();
        signal.post();
        signal.post();

        assert_eq!(signal.wait_timeout(Duration::from_millis(1)), Ok(()));
        assert_eq!(
            signal.wait_timeout(Duration::from_millis(1)),
            Err(SignalWaitError::Timeout)
        );
    }
}
