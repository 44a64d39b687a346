// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for Router Advertisement waits.

use std::io;
use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RaWaitError>;

/// Errors returned to the task waiting on a Router Advertisement.
///
/// None of these are retried internally. Retrying (re-register and resend the
/// solicitation) is up to the autoconfiguration driver.
#[derive(Debug, Error)]
pub enum RaWaitError {
    /// No matching advertisement arrived before the deadline.
    #[error("timed out waiting for router advertisement")]
    TimedOut,

    /// The blocking wait was interrupted (registry shutdown).
    #[error("wait for router advertisement interrupted")]
    Interrupted,

    /// The waiter was not linked in the registry it was removed from.
    #[error("waiter not found in registry")]
    NotFound,

    /// The caller's solicitation could not be transmitted.
    #[error("failed to send router solicitation: {0}")]
    SendFailed(#[from] io::Error),
}

impl RaWaitError {
    /// Negative errno equivalent, for C-facing status returns.
    pub fn errno(&self) -> i32 {
        match self {
            Self::TimedOut => -libc::ETIMEDOUT,
            Self::Interrupted => -libc::EINTR,
            Self::NotFound => -libc::ENOENT,
            Self::SendFailed(e) => -e.raw_os_error().unwrap_or(libc::EIO),
        }
    }

    /// `true` for the ordinary "nobody answered" outcome.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}
