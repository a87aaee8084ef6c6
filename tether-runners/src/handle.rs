// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::work_runner::{Work, WorkRunner};
use core::sync::atomic::{AtomicBool, Ordering};
use tether_core::{Result, TetherError};
use tokio::runtime::Handle;

/// Runs posted work on the blocking pool of an existing tokio runtime.
///
/// The pool starts threads on demand and retires idle ones, so the runner never queues
/// work behind a busy thread. The threads belong to the runtime: `dispose` only stops
/// accepting work, and work already posted still runs.
#[derive(Debug)]
pub struct HandleWorkRunner {
    handle: Handle,
    disposed: AtomicBool,
}

impl HandleWorkRunner {
    /// Post work onto `handle`'s runtime.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            disposed: AtomicBool::new(false),
        }
    }

    /// Post work onto the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::NoRuntime` outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| TetherError::no_runtime("cached work runner"))
    }
}

impl WorkRunner for HandleWorkRunner {
    fn post(&self, work: Work) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(TetherError::runner_disposed("runtime work runner"));
        }
        drop(self.handle.spawn_blocking(work));
        Ok(())
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            debug!("runtime work runner disposed");
        }
    }
}
