// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Adapter configuration.

use tether_core::{Result, TetherError};
use tokio::runtime::Handle;

/// What a stream built from a connectable does with its connection once the upstream
/// has completed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalPolicy {
    /// Keep the connection until the output stream is dropped.
    ///
    /// The connection may outlive any particular upstream; only downstream cancellation
    /// disposes it.
    #[default]
    KeepConnection,
    /// Dispose the connection as soon as the terminal signal has been emitted downstream.
    DisposeConnection,
}

/// Configuration for [`to_transformer_with_config`](crate::to_transformer_with_config).
#[derive(Debug, Clone, Default)]
pub struct TransformerConfig {
    /// Connection handling after upstream completion or failure.
    ///
    /// Default: [`TerminalPolicy::KeepConnection`]
    pub upstream_terminal: TerminalPolicy,
}

impl TransformerConfig {
    /// Configuration that disposes the connection on upstream completion or failure.
    pub fn dispose_on_terminal() -> Self {
        Self {
            upstream_terminal: TerminalPolicy::DisposeConnection,
        }
    }

    /// Sets the upstream terminal policy.
    pub fn with_upstream_terminal(mut self, policy: TerminalPolicy) -> Self {
        self.upstream_terminal = policy;
        self
    }
}

/// Configuration for connectables that drive their pipeline on a spawned task.
#[derive(Debug, Clone, Default)]
pub struct ConnectableConfig {
    /// Runtime the pipeline tasks are spawned on.
    ///
    /// Default: `None`, meaning the runtime `connect` is called from.
    pub runtime: Option<Handle>,
}

impl ConnectableConfig {
    /// Spawn pipeline tasks on `handle` instead of the caller's runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub(crate) fn resolve_runtime(&self, purpose: &str) -> Result<Handle> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current()
                .map_err(|e| TetherError::no_runtime(format!("{purpose}: {e}"))),
        }
    }
}
