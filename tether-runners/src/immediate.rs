// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::work_runner::{Work, WorkRunner};
use core::sync::atomic::{AtomicBool, Ordering};
use tether_core::{Result, TetherError};

/// Runs posted work synchronously on the posting thread.
#[derive(Debug, Default)]
pub struct ImmediateWorkRunner {
    disposed: AtomicBool,
}

impl ImmediateWorkRunner {
    /// Create an immediate runner.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkRunner for ImmediateWorkRunner {
    fn post(&self, work: Work) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(TetherError::runner_disposed("immediate runner"));
        }
        work();
        Ok(())
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }
}
