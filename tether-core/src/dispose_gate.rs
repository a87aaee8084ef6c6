// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Per-connection lifecycle cell guarding output delivery against disposal.
//!
//! A [`DisposeGate`] is a three-state machine:
//!
//! ```text
//! Uninitialized ──activate──▶ Active ──dispose──▶ Disposed
//!       │                                            ▲
//!       └──────────────────dispose───────────────────┘
//! ```
//!
//! `Disposed` is terminal. The state lives in an atomic cell; every delivery and the
//! disposing transition run inside one critical section, so a delivery that is in flight
//! when `dispose` is called either completes before `dispose` returns or never starts.
//!
//! The critical section is re-entrant: an output consumer may dispose the connection
//! that is delivering to it without deadlocking.
//!
//! ```
//! use tether_core::{DisposeGate, Lifecycle};
//!
//! let gate = DisposeGate::new();
//! gate.activate();
//!
//! assert!(gate.deliver(|| println!("delivered")));
//! assert!(gate.dispose());
//! assert!(!gate.dispose()); // only the first call transitions
//! assert!(!gate.deliver(|| unreachable!()));
//! assert_eq!(gate.lifecycle(), Lifecycle::Disposed);
//! ```

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use parking_lot::ReentrantMutex;

const UNINITIALIZED: u8 = 0;
const ACTIVE: u8 = 1;
const DISPOSED: u8 = 2;

/// Observable state of a [`DisposeGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, not yet wired to its pipeline.
    Uninitialized,
    /// Wired and delivering.
    Active,
    /// Torn down; nothing is delivered any more.
    Disposed,
}

/// Atomic lifecycle cell with a shared deliver/dispose critical section.
pub struct DisposeGate {
    state: AtomicU8,
    section: ReentrantMutex<()>,
}

impl DisposeGate {
    /// Creates a gate in the `Uninitialized` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
            section: ReentrantMutex::new(()),
        }
    }

    /// Moves `Uninitialized` to `Active`.
    ///
    /// Returns `false` if the gate was already active or has been disposed.
    pub fn activate(&self) -> bool {
        self.state
            .compare_exchange(UNINITIALIZED, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Moves the gate to `Disposed`.
    ///
    /// Waits for a delivery running on another thread to finish. Returns `true` only for
    /// the call that performed the transition, which makes it the single owner of any
    /// resource release that follows.
    pub fn dispose(&self) -> bool {
        let _section = self.section.lock();
        let previous = self.state.swap(DISPOSED, Ordering::AcqRel);
        let transitioned = previous != DISPOSED;
        if transitioned {
            trace!("dispose gate transitioned from state {previous} to disposed");
        }
        transitioned
    }

    /// Runs `deliver` inside the critical section unless the gate is disposed.
    ///
    /// Returns whether `deliver` ran. Deliveries are accepted in the `Uninitialized`
    /// state too, since a connection may emit while it is still being wired.
    pub fn deliver<F>(&self, deliver: F) -> bool
    where
        F: FnOnce(),
    {
        let _section = self.section.lock();
        if self.state.load(Ordering::Acquire) == DISPOSED {
            return false;
        }
        deliver();
        true
    }

    /// Returns `true` once the gate has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) == DISPOSED
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        match self.state.load(Ordering::Acquire) {
            UNINITIALIZED => Lifecycle::Uninitialized,
            ACTIVE => Lifecycle::Active,
            _ => Lifecycle::Disposed,
        }
    }
}

impl fmt::Debug for DisposeGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeGate")
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

impl Default for DisposeGate {
    fn default() -> Self {
        Self::new()
    }
}
