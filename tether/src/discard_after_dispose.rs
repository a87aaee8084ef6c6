// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Disposal guard for connectables that keep emitting after teardown.
//!
//! Not every connection stops producing the instant `dispose()` is called: work may
//! already be running on another thread. [`DiscardAfterDispose`] puts a [`DisposeGate`]
//! between the wrapped connection and the caller's output consumer so that, once
//! `dispose()` has returned, nothing reaches the consumer any more.

use std::sync::Arc;
use tether_core::{BoxConnection, BoxConsumer, Connectable, Connection, DisposeGate, Result};

/// Wraps a [`Connectable`] so its connections never deliver after disposal.
///
/// Connections handed out by the wrapper also ignore `accept` after `dispose` and
/// forward `dispose` to the wrapped connection exactly once.
#[derive(Debug, Clone)]
pub struct DiscardAfterDispose<C> {
    inner: C,
}

impl<C> DiscardAfterDispose<C> {
    /// Wrap `inner`.
    pub const fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped connectable.
    pub const fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Unwrap the wrapped connectable.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

/// Wrap `connectable` in a [`DiscardAfterDispose`].
pub const fn discard_after_dispose<C>(connectable: C) -> DiscardAfterDispose<C> {
    DiscardAfterDispose::new(connectable)
}

impl<I, O, C> Connectable<I, O> for DiscardAfterDispose<C>
where
    C: Connectable<I, O>,
    I: 'static,
    O: 'static,
{
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>> {
        let gate = Arc::new(DisposeGate::new());

        let guarded: BoxConsumer<O> = {
            let gate = gate.clone();
            Box::new(move |value: O| {
                if !gate.deliver(|| output.accept(value)) {
                    trace!("discarded output emitted after dispose");
                }
            })
        };

        let inner = self.inner.connect(guarded)?;
        gate.activate();

        Ok(Box::new(GuardedConnection { inner, gate }))
    }
}

struct GuardedConnection<I> {
    inner: BoxConnection<I>,
    gate: Arc<DisposeGate>,
}

impl<I> Connection<I> for GuardedConnection<I> {
    fn accept(&self, value: I) {
        if self.gate.is_disposed() {
            trace!("ignored value accepted after dispose");
            return;
        }
        self.inner.accept(value);
    }

    fn dispose(&self) {
        if self.gate.dispose() {
            self.inner.dispose();
        }
    }
}
