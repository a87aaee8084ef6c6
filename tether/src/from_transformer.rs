// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stream transformer → connectable.
//!
//! Every `connect` builds a private pipeline:
//!
//! ```text
//! Connection::accept ──▶ Relay ──▶ transformer ──▶ gate ──▶ output consumer
//! ```
//!
//! `accept` drives the pipeline on the calling thread until the transformed stream has
//! nothing more ready, so a synchronous transformer has delivered its outputs by the
//! time `accept` returns. When the transformed stream becomes ready later (a timer, I/O,
//! another task), the rest is driven by a task spawned on the connection's tokio
//! runtime. At most one thread drives a pipeline at a time; a value accepted while
//! another thread is driving is picked up by that thread.
//!
//! # Error narrowing
//!
//! A push connection has no failure channel. When the transformed stream fails, the
//! error is logged and the pipeline stops; the output consumer never hears about it.
//! Code relying on symmetric error visibility must not build on this adapter.

use crate::config::ConnectableConfig;
use crate::discard_after_dispose::DiscardAfterDispose;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::task::{Context, Poll};
use futures::task::{waker, ArcWake};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tether_core::{
    BoxConnection, BoxConsumer, Connectable, Connection, DisposeGate, ItemStream, Relay,
    Result, StreamItem, StreamTransformer,
};
use tokio::runtime::Handle;

/// A [`Connectable`] running each connection through a [`StreamTransformer`].
///
/// Usually obtained, already wrapped in [`DiscardAfterDispose`], from
/// [`from_transformer`].
pub struct TransformerConnectable<T, I, O> {
    transformer: Arc<T>,
    config: ConnectableConfig,
    _types: PhantomData<fn(I) -> O>,
}

impl<T, I, O> TransformerConnectable<T, I, O> {
    /// Build a connectable around `transformer`.
    pub fn new(transformer: T, config: ConnectableConfig) -> Self {
        Self {
            transformer: Arc::new(transformer),
            config,
            _types: PhantomData,
        }
    }
}

impl<T, I, O> Clone for TransformerConnectable<T, I, O> {
    fn clone(&self) -> Self {
        Self {
            transformer: self.transformer.clone(),
            config: self.config.clone(),
            _types: PhantomData,
        }
    }
}

/// Turn a stream transformer into a connectable.
///
/// Each connection gets its own relay and pipeline. `connect` must be called from inside
/// a tokio runtime; use [`from_transformer_with_config`] to name one explicitly.
///
/// ```
/// use futures::StreamExt;
/// use tether::from_transformer;
/// use tether_core::{transformer_fn, Connectable, Connection, ItemStream};
/// use tokio::sync::mpsc;
///
/// # #[tokio::main]
/// # async fn main() -> tether_core::Result<()> {
/// let doubler = from_transformer(transformer_fn(|upstream: ItemStream<i32>| -> ItemStream<i32> {
///     upstream.map(|item| item.map(|v| v * 2)).boxed()
/// }));
///
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let connection = doubler.connect(Box::new(move |v: i32| {
///     let _ = tx.send(v);
/// }))?;
///
/// connection.accept(21);
/// assert_eq!(rx.recv().await, Some(42));
/// connection.dispose();
/// # Ok(())
/// # }
/// ```
pub fn from_transformer<T, I, O>(transformer: T) -> DiscardAfterDispose<TransformerConnectable<T, I, O>>
where
    T: StreamTransformer<I, O> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    from_transformer_with_config(transformer, ConnectableConfig::default())
}

/// [`from_transformer`] with explicit configuration.
pub fn from_transformer_with_config<T, I, O>(
    transformer: T,
    config: ConnectableConfig,
) -> DiscardAfterDispose<TransformerConnectable<T, I, O>>
where
    T: StreamTransformer<I, O> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    DiscardAfterDispose::new(TransformerConnectable::new(transformer, config))
}

impl<T, I, O> Connectable<I, O> for TransformerConnectable<T, I, O>
where
    T: StreamTransformer<I, O> + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>> {
        let handle = self.config.resolve_runtime("transformer connection")?;

        let relay = Relay::unicast();
        let input = relay.subscribe()?;
        let driver = Arc::new(PipelineDriver {
            pipeline: Mutex::new(Some(self.transformer.apply(Box::pin(input)))),
            output,
            gate: DisposeGate::new(),
            requests: AtomicUsize::new(0),
            handle,
        });

        driver.gate.activate();
        // The transformer may emit before it has seen any input
        driver.drive();
        debug!("transformer connection established");

        Ok(Box::new(RelayConnection { relay, driver }))
    }
}

struct PipelineDriver<O> {
    pipeline: Mutex<Option<ItemStream<O>>>,
    output: BoxConsumer<O>,
    gate: DisposeGate,
    // Drive requests not yet served; non-zero exactly while some thread is driving.
    requests: AtomicUsize,
    handle: Handle,
}

impl<O: Send + 'static> PipelineDriver<O> {
    /// Drive the pipeline here, unless another thread is already driving it, in which
    /// case that thread polls once more before letting go.
    fn drive(self: &Arc<Self>) {
        self.drive_after(|| ());
    }

    /// Run `feed`, then [`drive`](Self::drive). Claiming the pipeline first means the
    /// wake-up `feed` raises is served here instead of by a spawned task.
    fn drive_after<R>(self: &Arc<Self>, feed: impl FnOnce() -> R) -> R {
        let owner = self.requests.fetch_add(1, Ordering::AcqRel) == 0;
        let result = feed();
        if owner {
            self.run(1);
        }
        result
    }

    fn run(self: &Arc<Self>, mut served: usize) {
        let _runtime = self.handle.enter();
        let waker = waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        loop {
            self.poll_pipeline(&mut cx);
            match self
                .requests
                .compare_exchange(served, 0, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return,
                Err(pending) => served = pending,
            }
        }
    }

    fn poll_pipeline(&self, cx: &mut Context<'_>) {
        let mut slot = self.pipeline.lock();

        loop {
            if self.gate.is_disposed() {
                if slot.take().is_some() {
                    debug!("transformer pipeline released");
                }
                return;
            }
            let Some(pipeline) = slot.as_mut() else {
                return;
            };

            match pipeline.poll_next_unpin(cx) {
                Poll::Ready(Some(StreamItem::Value(value))) => {
                    self.gate.deliver(|| self.output.accept(value));
                }
                Poll::Ready(Some(StreamItem::Error(e))) => {
                    warn!("transformer pipeline failed, connection output is not notified: {e}");
                    *slot = None;
                    return;
                }
                Poll::Ready(None) => {
                    debug!("transformer pipeline completed");
                    *slot = None;
                    return;
                }
                Poll::Pending => return,
            }
        }
    }
}

impl<O: Send + 'static> ArcWake for PipelineDriver<O> {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if arc_self.requests.fetch_add(1, Ordering::AcqRel) == 0 {
            let driver = arc_self.clone();
            arc_self.handle.spawn(async move { driver.run(1) });
        }
    }
}

struct RelayConnection<I: Send + 'static, O: Send + 'static> {
    relay: Relay<I>,
    driver: Arc<PipelineDriver<O>>,
}

impl<I: Send + 'static, O: Send + 'static> RelayConnection<I, O> {
    fn release(&self) {
        if self.driver.gate.dispose() {
            // Drops the pipeline, unless another thread is driving it and will do so
            self.driver.drive();
            self.relay.close();
            debug!("transformer connection disposed");
        }
    }
}

impl<I: Send + 'static, O: Send + 'static> Connection<I> for RelayConnection<I, O> {
    fn accept(&self, value: I) {
        if self.driver.drive_after(|| self.relay.push(value)).is_err() {
            trace!("value accepted after dispose was dropped");
        }
    }

    fn dispose(&self) {
        self.release();
    }
}

// The pipeline holds a waker referring back to the driver, so it must be dropped
// explicitly.
impl<I: Send + 'static, O: Send + 'static> Drop for RelayConnection<I, O> {
    fn drop(&mut self) {
        self.release();
    }
}
