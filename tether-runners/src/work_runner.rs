// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;
use tether_core::Result;

/// A unit of work posted to a [`WorkRunner`].
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs posted work, on threads it owns.
///
/// All work posted to one runner executes on that runner's threads. `dispose` releases
/// the threads; it is idempotent, and posting afterwards fails with
/// `TetherError::RunnerDisposed`.
pub trait WorkRunner: Send + Sync {
    /// Queue `work` for execution.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::RunnerDisposed` once the runner has been disposed.
    fn post(&self, work: Work) -> Result<()>;

    /// Release the runner's threads.
    fn dispose(&self);
}

impl<R> WorkRunner for Arc<R>
where
    R: WorkRunner + ?Sized,
{
    fn post(&self, work: Work) -> Result<()> {
        (**self).post(work)
    }

    fn dispose(&self) {
        (**self).dispose();
    }
}
