// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The reactive-stream side of a bridge.

use crate::StreamItem;
use core::marker::PhantomData;
use core::pin::Pin;
use futures::Stream;
use std::sync::Arc;

/// Boxed stream of [`StreamItem`]s, the currency of every [`StreamTransformer`].
pub type ItemStream<T> = Pin<Box<dyn Stream<Item = StreamItem<T>> + Send + 'static>>;

/// A reusable processing pipeline from one stream to another.
///
/// `apply` may be called any number of times; every call must produce an output stream
/// that is independent of the streams produced by earlier calls. Polling the output
/// stream runs the pipeline, dropping it cancels the pipeline.
pub trait StreamTransformer<I, O>: Send + Sync {
    /// Build the output stream for `upstream`.
    fn apply(&self, upstream: ItemStream<I>) -> ItemStream<O>;
}

impl<I, O, T> StreamTransformer<I, O> for Arc<T>
where
    T: StreamTransformer<I, O> + ?Sized,
{
    fn apply(&self, upstream: ItemStream<I>) -> ItemStream<O> {
        (**self).apply(upstream)
    }
}

/// A [`StreamTransformer`] backed by a closure. Built with [`transformer_fn`].
pub struct FnTransformer<F, I, O> {
    f: F,
    _types: PhantomData<fn(I) -> O>,
}

/// Adapt a closure into a [`StreamTransformer`].
///
/// ```
/// use futures::StreamExt;
/// use tether_core::{transformer_fn, ItemStream, StreamItem, StreamTransformer};
///
/// let doubled = transformer_fn(|upstream: ItemStream<i32>| -> ItemStream<i32> {
///     upstream.map(|item| item.map(|v| v * 2)).boxed()
/// });
///
/// # futures::executor::block_on(async {
/// let input: ItemStream<i32> = futures::stream::iter(vec![StreamItem::Value(1)]).boxed();
/// let output: Vec<_> = doubled.apply(input).collect().await;
/// assert_eq!(output, vec![StreamItem::Value(2)]);
/// # });
/// ```
pub fn transformer_fn<F, I, O>(f: F) -> FnTransformer<F, I, O>
where
    F: Fn(ItemStream<I>) -> ItemStream<O> + Send + Sync,
{
    FnTransformer {
        f,
        _types: PhantomData,
    }
}

impl<F, I, O> StreamTransformer<I, O> for FnTransformer<F, I, O>
where
    F: Fn(ItemStream<I>) -> ItemStream<O> + Send + Sync,
{
    fn apply(&self, upstream: ItemStream<I>) -> ItemStream<O> {
        (self.f)(upstream)
    }
}
