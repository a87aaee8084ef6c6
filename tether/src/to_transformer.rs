// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Connectable → stream transformer.
//!
//! Every output stream owns one connection. The stream is cold: nothing is connected
//! until it is first polled. Polling drains values the connection has delivered, then
//! pulls the upstream and feeds each upstream value into the connection, so no runtime
//! is needed on this side of the bridge.
//!
//! | Upstream event | Output stream |
//! |----------------|---------------|
//! | value `v`      | `connection.accept(v)`; deliveries come out as `StreamItem::Value` |
//! | failure `e`    | pending deliveries, then `StreamItem::Error(e)`, then end |
//! | completion     | pending deliveries, then end |
//!
//! Dropping the output stream is the cancellation signal: the gate closes, the
//! connection is disposed and the upstream is dropped. What happens to the connection
//! on upstream completion or failure is governed by [`TerminalPolicy`].

use crate::config::{TerminalPolicy, TransformerConfig};
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::{Stream, StreamExt};
use pin_project::{pin_project, pinned_drop};
use std::sync::Arc;
use tether_core::{
    BoxConnection, BoxConsumer, Connectable, DisposeGate, ItemStream, StreamItem,
    StreamTransformer, TetherError,
};

/// A [`StreamTransformer`] that opens one connection per output stream.
///
/// Obtained from [`to_transformer`].
pub struct ConnectableTransformer<C, I, O> {
    connectable: Arc<C>,
    config: TransformerConfig,
    _types: PhantomData<fn(I) -> O>,
}

impl<C, I, O> ConnectableTransformer<C, I, O> {
    /// Build a transformer around `connectable`.
    pub fn new(connectable: C, config: TransformerConfig) -> Self {
        Self {
            connectable: Arc::new(connectable),
            config,
            _types: PhantomData,
        }
    }
}

impl<C, I, O> Clone for ConnectableTransformer<C, I, O> {
    fn clone(&self) -> Self {
        Self {
            connectable: self.connectable.clone(),
            config: self.config.clone(),
            _types: PhantomData,
        }
    }
}

/// Turn a connectable into a stream transformer.
///
/// ```
/// use futures::StreamExt;
/// use tether::to_transformer;
/// use tether_core::{connectable_fn, BoxConnection, BoxConsumer, Connection, ItemStream};
/// use tether_core::{StreamItem, StreamTransformer};
///
/// struct Doubler(BoxConsumer<i32>);
///
/// impl Connection<i32> for Doubler {
///     fn accept(&self, value: i32) {
///         self.0.accept(value * 2);
///     }
///     fn dispose(&self) {}
/// }
///
/// let transformer = to_transformer(connectable_fn(|output: BoxConsumer<i32>| {
///     Ok(Box::new(Doubler(output)) as BoxConnection<i32>)
/// }));
///
/// # futures::executor::block_on(async {
/// let upstream: ItemStream<i32> =
///     futures::stream::iter(vec![StreamItem::Value(1), StreamItem::Value(2)]).boxed();
/// let output: Vec<_> = transformer.apply(upstream).collect().await;
/// assert_eq!(output, vec![StreamItem::Value(2), StreamItem::Value(4)]);
/// # });
/// ```
pub fn to_transformer<C, I, O>(connectable: C) -> ConnectableTransformer<C, I, O>
where
    C: Connectable<I, O> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    to_transformer_with_config(connectable, TransformerConfig::default())
}

/// [`to_transformer`] with explicit configuration.
pub fn to_transformer_with_config<C, I, O>(
    connectable: C,
    config: TransformerConfig,
) -> ConnectableTransformer<C, I, O>
where
    C: Connectable<I, O> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    ConnectableTransformer::new(connectable, config)
}

impl<C, I, O> StreamTransformer<I, O> for ConnectableTransformer<C, I, O>
where
    C: Connectable<I, O> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    fn apply(&self, upstream: ItemStream<I>) -> ItemStream<O> {
        Box::pin(connect_stream(
            self.connectable.clone(),
            upstream,
            self.config.clone(),
        ))
    }
}

/// Build the output stream for one subscription: `upstream` fed through a fresh
/// connection of `connectable`.
pub fn connect_stream<C, S, I, O>(
    connectable: C,
    upstream: S,
    config: TransformerConfig,
) -> ConnectionStream<C, S, I, O>
where
    C: Connectable<I, O>,
    S: Stream<Item = StreamItem<I>>,
{
    ConnectionStream {
        connectable,
        upstream,
        config,
        gate: Arc::new(DisposeGate::new()),
        connection: None,
        output: None,
        state: State::Idle,
    }
}

enum Terminal {
    Completed,
    Failed(TetherError),
}

enum State {
    Idle,
    Running,
    Terminating(Terminal),
    Done,
}

/// Output stream of a [`ConnectableTransformer`]. Built by [`connect_stream`].
#[pin_project(PinnedDrop)]
pub struct ConnectionStream<C, S, I, O> {
    connectable: C,
    #[pin]
    upstream: S,
    config: TransformerConfig,
    gate: Arc<DisposeGate>,
    connection: Option<BoxConnection<I>>,
    output: Option<UnboundedReceiver<O>>,
    state: State,
}

impl<C, S, I, O> ConnectionStream<C, S, I, O> {
    /// Returns `true` once the connection has been disposed, by cancellation or by
    /// [`TerminalPolicy::DisposeConnection`].
    pub fn is_disposed(&self) -> bool {
        self.gate.is_disposed()
    }
}

fn release<I>(gate: &DisposeGate, connection: &mut Option<BoxConnection<I>>) {
    if gate.dispose() {
        if let Some(connection) = connection.take() {
            connection.dispose();
            debug!("stream connection disposed");
        }
    }
}

impl<C, S, I, O> Stream for ConnectionStream<C, S, I, O>
where
    C: Connectable<I, O>,
    S: Stream<Item = StreamItem<I>>,
    O: Send + 'static,
{
    type Item = StreamItem<O>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match *this.state {
                State::Idle => {
                    let (tx, rx) = mpsc::unbounded();
                    let output: BoxConsumer<O> = {
                        let gate = this.gate.clone();
                        Box::new(move |value: O| {
                            gate.deliver(|| {
                                let _ = tx.unbounded_send(value);
                            });
                        })
                    };

                    match this.connectable.connect(output) {
                        Ok(connection) => {
                            this.gate.activate();
                            *this.connection = Some(connection);
                            *this.output = Some(rx);
                            *this.state = State::Running;
                            debug!("stream connection established");
                        }
                        Err(e) => {
                            this.gate.dispose();
                            *this.state = State::Done;
                            return Poll::Ready(Some(StreamItem::Error(e)));
                        }
                    }
                }
                State::Running => {
                    if let Some(rx) = this.output.as_mut() {
                        match rx.poll_next_unpin(cx) {
                            Poll::Ready(Some(value)) => {
                                return Poll::Ready(Some(StreamItem::Value(value)))
                            }
                            // The connection dropped its output consumer
                            Poll::Ready(None) => *this.output = None,
                            Poll::Pending => {}
                        }
                    }

                    match this.upstream.as_mut().poll_next(cx) {
                        Poll::Ready(Some(StreamItem::Value(value))) => {
                            if let Some(connection) = this.connection.as_ref() {
                                connection.accept(value);
                            }
                        }
                        Poll::Ready(Some(StreamItem::Error(e))) => {
                            *this.state = State::Terminating(Terminal::Failed(e));
                        }
                        Poll::Ready(None) => {
                            *this.state = State::Terminating(Terminal::Completed);
                        }
                        Poll::Pending => return Poll::Pending,
                    }
                }
                State::Terminating(_) => {
                    if let Some(rx) = this.output.as_mut() {
                        if let Poll::Ready(Some(value)) = rx.poll_next_unpin(cx) {
                            return Poll::Ready(Some(StreamItem::Value(value)));
                        }
                    }

                    let terminal = match core::mem::replace(this.state, State::Done) {
                        State::Terminating(terminal) => terminal,
                        _ => Terminal::Completed,
                    };
                    // Late emissions from a kept connection are dropped, not queued
                    *this.output = None;

                    if this.config.upstream_terminal == TerminalPolicy::DisposeConnection {
                        release(this.gate, this.connection);
                    }

                    return match terminal {
                        Terminal::Failed(e) => {
                            debug!("upstream failed, forwarding failure downstream");
                            Poll::Ready(Some(StreamItem::Error(e)))
                        }
                        Terminal::Completed => {
                            debug!("upstream completed");
                            Poll::Ready(None)
                        }
                    };
                }
                State::Done => return Poll::Ready(None),
            }
        }
    }
}

#[pinned_drop]
impl<C, S, I, O> PinnedDrop for ConnectionStream<C, S, I, O> {
    fn drop(self: Pin<&mut Self>) {
        let this = self.project();
        release(this.gate, this.connection);
    }
}
