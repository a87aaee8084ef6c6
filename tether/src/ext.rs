// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::discard_after_dispose::DiscardAfterDispose;
use crate::from_transformer::{from_transformer, TransformerConnectable};
use crate::to_transformer::{to_transformer, ConnectableTransformer};
use tether_core::{Connectable, StreamTransformer};

/// Method-call access to the adapters for any [`Connectable`].
pub trait ConnectableExt<I, O>: Connectable<I, O> + Sized + 'static {
    /// See [`to_transformer`].
    fn into_transformer(self) -> ConnectableTransformer<Self, I, O>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        to_transformer(self)
    }

    /// See [`discard_after_dispose`](crate::discard_after_dispose()).
    fn discard_after_dispose(self) -> DiscardAfterDispose<Self> {
        DiscardAfterDispose::new(self)
    }
}

impl<I, O, C> ConnectableExt<I, O> for C where C: Connectable<I, O> + 'static {}

/// Method-call access to the adapters for any [`StreamTransformer`].
pub trait TransformerExt<I, O>: StreamTransformer<I, O> + Sized + 'static {
    /// See [`from_transformer`].
    fn into_connectable(self) -> DiscardAfterDispose<TransformerConnectable<Self, I, O>>
    where
        I: Send + 'static,
        O: Send + 'static,
    {
        from_transformer(self)
    }
}

impl<I, O, T> TransformerExt<I, O> for T where T: StreamTransformer<I, O> + 'static {}
