// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The push-connection side of a bridge.
//!
//! A [`Connectable`] is a factory: every call to [`Connectable::connect`] wires a fresh,
//! independently lifecycled [`Connection`] to the caller's output [`Consumer`]. Values go
//! in through [`Connection::accept`], results come back through the consumer, and
//! [`Connection::dispose`] ends the link. There is no completion or failure signal on
//! this side, only disposal.

use crate::error::Result;
use core::marker::PhantomData;
use std::sync::Arc;

/// A single-method callback receiving values.
///
/// Implemented for every `Fn(T) + Send + Sync` closure.
pub trait Consumer<T>: Send + Sync {
    /// Receive one value.
    fn accept(&self, value: T);
}

impl<T, F> Consumer<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn accept(&self, value: T) {
        self(value);
    }
}

/// Owned, type-erased consumer handed to [`Connectable::connect`].
pub type BoxConsumer<T> = Box<dyn Consumer<T>>;

/// Shared, type-erased consumer for outputs that fan out to several tasks.
pub type SharedConsumer<T> = Arc<dyn Consumer<T>>;

/// A live link that accepts values until it is disposed.
///
/// Implementations must tolerate `accept` after `dispose` (the value is dropped) and
/// repeated `dispose` calls (only the first has an effect).
pub trait Connection<I>: Send + Sync {
    /// Push one value into the connection.
    fn accept(&self, value: I);

    /// Tear the connection down. No output is delivered once this has returned.
    fn dispose(&self);
}

/// Owned, type-erased connection returned by [`Connectable::connect`].
pub type BoxConnection<I> = Box<dyn Connection<I>>;

/// A factory of [`Connection`]s.
pub trait Connectable<I, O>: Send + Sync {
    /// Create a new connection delivering its results to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error when the connectable cannot hand out another connection, for
    /// example because a resource limit has been reached or a required runtime is missing.
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>>;
}

impl<I, O, C> Connectable<I, O> for Arc<C>
where
    C: Connectable<I, O> + ?Sized,
{
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>> {
        (**self).connect(output)
    }
}

/// A [`Connectable`] backed by a closure. Built with [`connectable_fn`].
pub struct FnConnectable<F, I, O> {
    f: F,
    _types: PhantomData<fn(I) -> O>,
}

/// Adapt a closure into a [`Connectable`].
///
/// ```
/// use tether_core::{connectable_fn, BoxConnection, BoxConsumer, Connectable, Connection};
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
/// let connectable = connectable_fn(|output: BoxConsumer<i32>| {
///     Ok(Box::new(Doubler(output)) as BoxConnection<i32>)
/// });
///
/// let connection = connectable.connect(Box::new(|v: i32| assert_eq!(v, 42))).unwrap();
/// connection.accept(21);
/// ```
pub fn connectable_fn<F, I, O>(f: F) -> FnConnectable<F, I, O>
where
    F: Fn(BoxConsumer<O>) -> Result<BoxConnection<I>> + Send + Sync,
{
    FnConnectable {
        f,
        _types: PhantomData,
    }
}

impl<F, I, O> Connectable<I, O> for FnConnectable<F, I, O>
where
    F: Fn(BoxConsumer<O>) -> Result<BoxConnection<I>> + Send + Sync,
{
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>> {
        (self.f)(output)
    }
}
