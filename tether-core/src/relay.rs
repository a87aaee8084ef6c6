// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot multicast subject turning synchronous pushes into a stream.
//!
//! A [`Relay`] is the entry point of a pipeline driven by a push connection: every
//! `push` is broadcast to the relay's current subscribers as a [`StreamItem`].
//!
//! ## Characteristics
//!
//! - **Hot**: Late subscribers do not receive past items, only items pushed after subscribing.
//! - **Unbounded**: Uses unbounded channels internally (no backpressure).
//! - **Thread-safe**: Cheap to clone; all clones share the same internal state.
//! - **Error/close**: An error is delivered to every subscriber and closes the relay.
//!
//! ## Example
//!
//! ```
//! use futures::StreamExt;
//! use tether_core::{Relay, StreamItem};
//!
//! # futures::executor::block_on(async {
//! let relay = Relay::<i32>::new();
//! let mut stream = relay.subscribe().unwrap();
//!
//! relay.push(1).unwrap();
//! relay.push(2).unwrap();
//! relay.close();
//!
//! assert_eq!(stream.next().await, Some(StreamItem::Value(1)));
//! assert_eq!(stream.next().await, Some(StreamItem::Value(2)));
//! assert_eq!(stream.next().await, None);
//! # });
//! ```

use crate::{RelayError, StreamItem, TetherError};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use parking_lot::Mutex;
use std::sync::Arc;

struct RelayState<T> {
    closed: bool,
    senders: Vec<UnboundedSender<StreamItem<T>>>,
}

/// Subscriber side of a [`Relay`].
pub struct RelayStream<T> {
    inner: UnboundedReceiver<StreamItem<T>>,
}

impl<T> Stream for RelayStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// A hot, unbounded subject that broadcasts pushed values to its current subscribers.
///
/// A relay built with [`new`](Self::new) fans out to any number of subscribers and clones
/// each value for all but the last of them. One built with [`unicast`](Self::unicast)
/// takes at most one subscriber at a time and moves values into it, so `T` need not be
/// `Clone`.
///
/// See the [module documentation](self) for details.
pub struct Relay<T> {
    state: Arc<Mutex<RelayState<T>>>,
    fan_out: Option<fn(&T) -> T>,
}

impl<T: Clone + Send + 'static> Relay<T> {
    /// Creates an open relay with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_fan_out(Some(T::clone))
    }
}

impl<T: Send + 'static> Relay<T> {
    /// Creates an open relay that accepts a single live subscriber.
    #[must_use]
    pub fn unicast() -> Self {
        Self::with_fan_out(None)
    }

    fn with_fan_out(fan_out: Option<fn(&T) -> T>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RelayState {
                closed: false,
                senders: Vec::new(),
            })),
            fan_out,
        }
    }

    /// Subscribe to the relay.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Closed` if the relay has been closed, and
    /// `RelayError::SubscriberLimit` if a unicast relay already has a live subscriber.
    pub fn subscribe(&self) -> Result<RelayStream<T>, RelayError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RelayError::Closed);
        }

        state.senders.retain(|tx| !tx.is_closed());
        if self.fan_out.is_none() && !state.senders.is_empty() {
            return Err(RelayError::SubscriberLimit);
        }

        let (tx, rx) = mpsc::unbounded();
        state.senders.push(tx);
        Ok(RelayStream { inner: rx })
    }

    /// Broadcast an item to every live subscriber, pruning subscribers that went away.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Closed` if the relay has been closed.
    pub fn send(&self, item: StreamItem<T>) -> Result<(), RelayError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RelayError::Closed);
        }

        state.senders.retain(|tx| !tx.is_closed());
        let Some((last, rest)) = state.senders.split_last() else {
            return Ok(());
        };

        for tx in rest {
            let copy = match (&item, self.fan_out) {
                (StreamItem::Value(value), Some(fan_out)) => StreamItem::Value(fan_out(value)),
                (StreamItem::Error(e), _) => StreamItem::Error(e.clone()),
                // Unicast relays never hold more than one sender
                (StreamItem::Value(_), None) => continue,
            };
            let _ = tx.unbounded_send(copy);
        }
        let _ = last.unbounded_send(item);
        Ok(())
    }

    /// Broadcast a value. Shorthand for `send(StreamItem::Value(value))`.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Closed` if the relay has been closed.
    pub fn push(&self, value: T) -> Result<(), RelayError> {
        self.send(StreamItem::Value(value))
    }

    /// Broadcast a failure and close the relay.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Closed` if the relay had already been closed.
    pub fn error(&self, err: TetherError) -> Result<(), RelayError> {
        let result = self.send(StreamItem::Error(err));
        self.close();
        result
    }

    /// Closes the relay, completing every subscriber stream. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.senders.clear();
    }

    /// Returns `true` if the relay has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of subscribers seen alive at the last `send` or `subscribe`.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().senders.len()
    }
}

impl<T: Clone + Send + 'static> Default for Relay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Relay<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            fan_out: self.fan_out,
        }
    }
}
