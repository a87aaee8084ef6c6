// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::RunnerConfig;
use crate::handle::HandleWorkRunner;
use crate::immediate::ImmediateWorkRunner;
use crate::thread_pool::ThreadPoolWorkRunner;
use tether_core::Result;
use tokio::runtime::Handle;

/// Constructors for the stock [`WorkRunner`](crate::WorkRunner)s.
pub struct WorkRunners;

impl WorkRunners {
    /// Runs work on the posting thread.
    pub fn immediate() -> ImmediateWorkRunner {
        ImmediateWorkRunner::new()
    }

    /// One dedicated worker thread.
    ///
    /// # Errors
    ///
    /// Fails if the worker thread cannot be spawned.
    pub fn single_thread() -> Result<ThreadPoolWorkRunner> {
        ThreadPoolWorkRunner::new(&RunnerConfig::default())
    }

    /// `threads` dedicated worker threads sharing one queue.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::InvalidConfiguration` when `threads` is zero.
    pub fn fixed_thread_pool(threads: usize) -> Result<ThreadPoolWorkRunner> {
        ThreadPoolWorkRunner::new(&RunnerConfig::default().with_threads(threads))
    }

    /// A pool built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::InvalidConfiguration` for an invalid `config`.
    pub fn from_config(config: &RunnerConfig) -> Result<ThreadPoolWorkRunner> {
        ThreadPoolWorkRunner::new(config)
    }

    /// Threads started on demand from the current tokio runtime's blocking pool.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::NoRuntime` outside a tokio runtime.
    pub fn cached_thread_pool() -> Result<HandleWorkRunner> {
        HandleWorkRunner::current()
    }

    /// Work posted onto an existing runtime's blocking pool.
    pub fn from_handle(handle: Handle) -> HandleWorkRunner {
        HandleWorkRunner::new(handle)
    }
}
