// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use tether_core::{Result, TetherError};

/// Default prefix of worker thread names.
pub const DEFAULT_NAME_PREFIX: &str = "tether-thread";

/// Configuration for a thread-pool [`WorkRunner`](crate::WorkRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Worker threads are named `"{name_prefix}-{n}"`.
    ///
    /// Default: `"tether-thread"`
    pub name_prefix: String,

    /// Number of worker threads.
    ///
    /// Default: 1
    pub threads: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
            threads: 1,
        }
    }
}

impl RunnerConfig {
    /// Configuration for `threads` workers with the default prefix.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the thread name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::InvalidConfiguration` for zero threads or an empty prefix.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(TetherError::invalid_configuration(
                "a thread pool needs at least one thread",
            ));
        }
        if self.name_prefix.trim().is_empty() {
            return Err(TetherError::invalid_configuration(
                "thread name prefix must not be empty",
            ));
        }
        Ok(())
    }
}
