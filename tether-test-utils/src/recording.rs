// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tether_core::{BoxConsumer, SharedConsumer};
use tokio::sync::Notify;

/// Records every value handed to the consumers it creates.
///
/// Clones share the same record.
pub struct RecordingConsumer<T> {
    values: Arc<Mutex<Vec<T>>>,
    notify: Arc<Notify>,
}

impl<T> Clone for RecordingConsumer<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            notify: self.notify.clone(),
        }
    }
}

impl<T> Default for RecordingConsumer<T> {
    fn default() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
        }
    }
}

impl<T: Send + 'static> RecordingConsumer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one value.
    pub fn record(&self, value: T) {
        self.values.lock().push(value);
        self.notify.notify_one();
    }

    /// An owned consumer feeding this record, for `Connectable::connect`.
    pub fn consumer(&self) -> BoxConsumer<T> {
        let recorder = self.clone();
        Box::new(move |value: T| recorder.record(value))
    }

    /// A shared consumer feeding this record.
    pub fn shared(&self) -> SharedConsumer<T> {
        let recorder = self.clone();
        Arc::new(move |value: T| recorder.record(value))
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least `count` values have been recorded.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` elapses first.
    pub async fn wait_for(&self, count: usize, timeout: Duration) {
        let waited = tokio::time::timeout(timeout, async {
            loop {
                let notified = self.notify.notified();
                if self.len() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await;

        if waited.is_err() {
            panic!(
                "timed out waiting for {count} values, recorded {}",
                self.len()
            );
        }
    }
}

impl<T: Clone> RecordingConsumer<T> {
    /// Snapshot of the values recorded so far, in arrival order.
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}
