// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Connectable running every accepted value as its own task.
//!
//! Each `accept` spawns `on_value(value, output)` on the connection's runtime. The
//! tasks run concurrently and may deliver any number of outputs, in any order. Disposing
//! the connection cancels every task still in flight; outputs a task manages to emit
//! while it is being cancelled are discarded by the [`DiscardAfterDispose`] wrapper.

use crate::config::ConnectableConfig;
use crate::discard_after_dispose::DiscardAfterDispose;
use core::future::Future;
use core::marker::PhantomData;
use std::sync::Arc;
use tether_core::{BoxConnection, BoxConsumer, Connectable, Connection, Result, SharedConsumer};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// A [`Connectable`] spawning one task per accepted value.
///
/// Usually obtained, already wrapped, from [`effect_handler`].
pub struct EffectHandler<F, I, O> {
    on_value: Arc<F>,
    config: ConnectableConfig,
    _types: PhantomData<fn(I) -> O>,
}

/// Build a task-per-value connectable on the caller's runtime.
///
/// ```
/// use tether::effect_handler;
/// use tether_core::{Connectable, Connection, SharedConsumer};
/// use tokio::sync::mpsc;
///
/// # #[tokio::main]
/// # async fn main() -> tether_core::Result<()> {
/// let handler = effect_handler(|id: u32, output: SharedConsumer<String>| async move {
///     output.accept(format!("loaded {id}"));
/// });
///
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// let connection = handler.connect(Box::new(move |v: String| {
///     let _ = tx.send(v);
/// }))?;
///
/// connection.accept(7);
/// assert_eq!(rx.recv().await.as_deref(), Some("loaded 7"));
/// connection.dispose();
/// # Ok(())
/// # }
/// ```
pub fn effect_handler<F, Fut, I, O>(on_value: F) -> DiscardAfterDispose<EffectHandler<F, I, O>>
where
    F: Fn(I, SharedConsumer<O>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    I: Send + 'static,
    O: 'static,
{
    effect_handler_with_config(on_value, ConnectableConfig::default())
}

/// [`effect_handler`] spawning its tasks on `handle`.
pub fn effect_handler_on<F, Fut, I, O>(
    handle: Handle,
    on_value: F,
) -> DiscardAfterDispose<EffectHandler<F, I, O>>
where
    F: Fn(I, SharedConsumer<O>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    I: Send + 'static,
    O: 'static,
{
    effect_handler_with_config(on_value, ConnectableConfig::default().with_runtime(handle))
}

/// [`effect_handler`] with explicit configuration.
pub fn effect_handler_with_config<F, Fut, I, O>(
    on_value: F,
    config: ConnectableConfig,
) -> DiscardAfterDispose<EffectHandler<F, I, O>>
where
    F: Fn(I, SharedConsumer<O>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    I: Send + 'static,
    O: 'static,
{
    DiscardAfterDispose::new(EffectHandler {
        on_value: Arc::new(on_value),
        config,
        _types: PhantomData,
    })
}

impl<F, Fut, I, O> Connectable<I, O> for EffectHandler<F, I, O>
where
    F: Fn(I, SharedConsumer<O>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    I: Send + 'static,
    O: 'static,
{
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>> {
        let handle = self.config.resolve_runtime("effect handler connection")?;

        Ok(Box::new(EffectConnection {
            on_value: self.on_value.clone(),
            output: Arc::from(output),
            cancel: CancellationToken::new(),
            handle,
        }))
    }
}

struct EffectConnection<F, O> {
    on_value: Arc<F>,
    output: SharedConsumer<O>,
    cancel: CancellationToken,
    handle: Handle,
}

impl<F, Fut, I, O> Connection<I> for EffectConnection<F, O>
where
    F: Fn(I, SharedConsumer<O>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
    O: 'static,
{
    fn accept(&self, value: I) {
        if self.cancel.is_cancelled() {
            trace!("effect handler ignored a value accepted after dispose");
            return;
        }

        let work = (self.on_value)(value, self.output.clone());
        let cancel = self.cancel.clone();
        self.handle.spawn(async move {
            if cancel.run_until_cancelled(work).await.is_none() {
                trace!("effect task cancelled");
            }
        });
    }

    fn dispose(&self) {
        self.cancel.cancel();
        debug!("effect handler connection disposed");
    }
}
