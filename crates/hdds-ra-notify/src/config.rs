// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Configuration for Router Advertisement waits.
//!
//! ```toml
//! default_timeout_ms = 3000
//! worker_queue_capacity = 16
//! worker_thread_name = "hdds-ra-notify"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Router Advertisement wait configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaNotifyConfig {
    /// Timeout used by `wait_default` (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Pending advertisements the deferred worker queues before dropping.
    #[serde(default = "default_queue_capacity")]
    pub worker_queue_capacity: usize,

    /// Name of the deferred delivery thread.
    #[serde(default = "default_thread_name")]
    pub worker_thread_name: String,
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_queue_capacity() -> usize {
    16
}

fn default_thread_name() -> String {
    "hdds-ra-notify".to_string()
}

impl Default for RaNotifyConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            worker_queue_capacity: default_queue_capacity(),
            worker_thread_name: default_thread_name(),
        }
    }
}

impl RaNotifyConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "default_timeout_ms must be > 0".into(),
            ));
        }
        if self.worker_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "worker_queue_capacity must be > 0".into(),
            ));
        }
        if self.worker_thread_name.is_empty() {
            return Err(ConfigError::Invalid(
                "worker_thread_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Set the default wait timeout.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the worker queue capacity.
    pub fn with_worker_queue_capacity(mut self, capacity: usize) -> Self {
        self.worker_queue_capacity = capacity;
        self
    }

    /// Set the worker thread name.
    pub fn with_worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.worker_thread_name = name.into();
        self
    }

    /// Default wait timeout as a `Duration`.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
