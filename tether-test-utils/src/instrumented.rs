// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A mapping [`Connectable`] that counts what happens to it.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tether_core::{
    BoxConnection, BoxConsumer, Connectable, Connection, Result, TetherError,
};

/// Counters shared by an [`InstrumentedConnectable`] and all its connections.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    connects: AtomicUsize,
    accepts: AtomicUsize,
    disposes: AtomicUsize,
    open: AtomicUsize,
}

impl ConnectionStats {
    /// Successful `connect` calls.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// `accept` calls, including ones made after dispose.
    pub fn accepts(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }

    /// `dispose` calls, including repeated ones on the same connection.
    pub fn disposes(&self) -> usize {
        self.disposes.load(Ordering::SeqCst)
    }

    /// Connections created and not yet disposed.
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

/// A [`Connectable`] applying `map` to every accepted value.
///
/// By default a connection stops emitting once disposed. [`leaky`](Self::leaky) makes
/// it keep emitting, which is what a connectable that does not honour the dispose
/// contract looks like from the outside.
pub struct InstrumentedConnectable<I, O> {
    map: Arc<dyn Fn(I) -> O + Send + Sync>,
    stats: Arc<ConnectionStats>,
    leaky: bool,
    max_connections: Option<usize>,
}

impl<I, O> InstrumentedConnectable<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new(map: impl Fn(I) -> O + Send + Sync + 'static) -> Self {
        Self {
            map: Arc::new(map),
            stats: Arc::new(ConnectionStats::default()),
            leaky: false,
            max_connections: None,
        }
    }

    /// Keep emitting after dispose.
    pub fn leaky(mut self) -> Self {
        self.leaky = true;
        self
    }

    /// Refuse `connect` once `max` connections have been handed out.
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn stats(&self) -> Arc<ConnectionStats> {
        self.stats.clone()
    }
}

impl<I, O> Connectable<I, O> for InstrumentedConnectable<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn connect(&self, output: BoxConsumer<O>) -> Result<BoxConnection<I>> {
        if let Some(max) = self.max_connections {
            if self.stats.connects() >= max {
                return Err(TetherError::connection_refused(format!(
                    "at most {max} connections"
                )));
            }
        }

        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        self.stats.open.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(InstrumentedConnection {
            map: self.map.clone(),
            output,
            stats: self.stats.clone(),
            leaky: self.leaky,
            disposed: AtomicBool::new(false),
        }))
    }
}

struct InstrumentedConnection<I, O> {
    map: Arc<dyn Fn(I) -> O + Send + Sync>,
    output: BoxConsumer<O>,
    stats: Arc<ConnectionStats>,
    leaky: bool,
    disposed: AtomicBool,
}

impl<I, O> Connection<I> for InstrumentedConnection<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn accept(&self, value: I) {
        self.stats.accepts.fetch_add(1, Ordering::SeqCst);
        if self.disposed.load(Ordering::SeqCst) && !self.leaky {
            return;
        }
        self.output.accept((self.map)(value));
    }

    fn dispose(&self) {
        self.stats.disposes.fetch_add(1, Ordering::SeqCst);
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.stats.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
