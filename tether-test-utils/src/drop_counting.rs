// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::pin::Pin;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::task::{Context, Poll};
use futures::Stream;
use std::sync::Arc;

/// Counts drops of the streams it has wrapped.
#[derive(Debug, Clone, Default)]
pub struct DropCounter {
    drops: Arc<AtomicUsize>,
}

impl DropCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `inner` so that dropping it is counted here.
    pub fn wrap<S>(&self, inner: S) -> DropCountingStream<S> {
        DropCountingStream {
            inner,
            drops: self.drops.clone(),
        }
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }
}

/// A pass-through stream that bumps its [`DropCounter`] when dropped.
pub struct DropCountingStream<S> {
    inner: S,
    drops: Arc<AtomicUsize>,
}

impl<S> Stream for DropCountingStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Drop for DropCountingStream<S> {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
