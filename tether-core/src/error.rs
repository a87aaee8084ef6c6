// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types shared by every tether crate.
//!
//! [`TetherError`] is the root error. It travels inside [`StreamItem::Error`](crate::StreamItem)
//! on the stream side of a bridge and is returned directly from fallible construction
//! and connect calls on the connection side.
//!
//! # Examples
//!
//! ```
//! use tether_core::{Result, TetherError};
//!
//! fn refuse() -> Result<()> {
//!     Err(TetherError::connection_refused("connection limit reached"))
//! }
//!
//! assert!(matches!(refuse(), Err(TetherError::ConnectionRefused { .. })));
//! ```

use core::fmt;

/// Root error type for all tether operations.
#[derive(Debug, thiserror::Error)]
pub enum TetherError {
    /// A stream reported a failure.
    ///
    /// This is the general error for upstream failures that are forwarded through
    /// a bridge as a failure signal.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong
        context: String,
    },

    /// Custom error from user code.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A connectable declined to hand out a new connection.
    #[error("Connection refused: {context}")]
    ConnectionRefused {
        /// Why the connection was refused
        context: String,
    },

    /// A pipeline had to be spawned but no async runtime was available.
    #[error("No async runtime available: {context}")]
    NoRuntime {
        /// What needed the runtime
        context: String,
    },

    /// Work was posted to a runner that has already been disposed.
    #[error("Work runner disposed: {context}")]
    RunnerDisposed {
        /// The runner that rejected the work
        context: String,
    },

    /// A component was built with settings it cannot honour.
    #[error("Invalid configuration: {context}")]
    InvalidConfiguration {
        /// The offending setting
        context: String,
    },

    /// Multiple errors occurred.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<TetherError>,
    },
}

impl TetherError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Create a connection refused error
    pub fn connection_refused(context: impl Into<String>) -> Self {
        Self::ConnectionRefused {
            context: context.into(),
        }
    }

    /// Create a missing runtime error
    pub fn no_runtime(context: impl Into<String>) -> Self {
        Self::NoRuntime {
            context: context.into(),
        }
    }

    /// Create a disposed runner error
    pub fn runner_disposed(context: impl Into<String>) -> Self {
        Self::RunnerDisposed {
            context: context.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(context: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            context: context.into(),
        }
    }

    /// Aggregate several user errors into a single `MultipleErrors`.
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let count = errors.len();
        let errors = errors
            .into_iter()
            .map(|e| Self::UserError(Box::new(e)))
            .collect();

        Self::MultipleErrors { count, errors }
    }

    /// Returns `true` for errors raised because a component was misused at construction
    /// or connect time rather than because a running pipeline failed.
    #[must_use]
    pub const fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::NoRuntime { .. } | Self::InvalidConfiguration { .. }
        )
    }
}

impl Clone for TetherError {
    fn clone(&self) -> Self {
        match self {
            Self::StreamProcessingError { context } => Self::StreamProcessingError {
                context: context.clone(),
            },
            // Boxed errors cannot be cloned, keep their message
            Self::UserError(e) => Self::StreamProcessingError {
                context: format!("User error: {e}"),
            },
            Self::ConnectionRefused { context } => Self::ConnectionRefused {
                context: context.clone(),
            },
            Self::NoRuntime { context } => Self::NoRuntime {
                context: context.clone(),
            },
            Self::RunnerDisposed { context } => Self::RunnerDisposed {
                context: context.clone(),
            },
            Self::InvalidConfiguration { context } => Self::InvalidConfiguration {
                context: context.clone(),
            },
            Self::MultipleErrors { count, errors } => Self::MultipleErrors {
                count: *count,
                errors: errors.clone(),
            },
        }
    }
}

/// Specialized Result type for tether operations
pub type Result<T> = std::result::Result<T, TetherError>;

/// Errors specific to the [`Relay`](crate::Relay) lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The relay has been closed and cannot accept new items or subscribers.
    Closed,
    /// A unicast relay already has a live subscriber.
    SubscriberLimit,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "Relay is closed"),
            Self::SubscriberLimit => write!(f, "Relay already has a subscriber"),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<RelayError> for TetherError {
    fn from(err: RelayError) -> Self {
        Self::stream_error(err.to_string())
    }
}

/// Extension trait for converting foreign errors into `TetherError`
pub trait IntoTetherError {
    /// Convert this error into a `TetherError`
    fn into_tether(self) -> TetherError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoTetherError for E {
    fn into_tether(self) -> TetherError {
        TetherError::user_error(self)
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(TetherError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TetherError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| match e.into() {
            TetherError::UserError(inner) => TetherError::StreamProcessingError {
                context: format!("{}: {inner}", context.into()),
            },
            TetherError::StreamProcessingError { context: inner } => {
                TetherError::StreamProcessingError {
                    context: format!("{}: {inner}", context.into()),
                }
            }
            other => other,
        })
    }
}
