// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use tether_core::{ItemStream, StreamItem, TetherError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Sending half of a [`test_channel`].
///
/// Dropping every clone completes the stream.
pub struct TestSender<T> {
    sender: mpsc::UnboundedSender<StreamItem<T>>,
}

impl<T> Clone for TestSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> TestSender<T> {
    /// Send a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream has been dropped.
    pub fn send(&self, value: T) -> Result<(), mpsc::error::SendError<StreamItem<T>>> {
        self.sender.send(StreamItem::Value(value))
    }

    /// Send an error item.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream has been dropped.
    pub fn send_error(
        &self,
        error: TetherError,
    ) -> Result<(), mpsc::error::SendError<StreamItem<T>>> {
        self.sender.send(StreamItem::Error(error))
    }

    /// Returns `true` once the stream side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Complete the stream (once every clone is gone).
    pub fn close(self) {
        drop(self.sender);
    }
}

/// An imperatively driven upstream: values sent on the [`TestSender`] come out of the
/// returned stream.
pub fn test_channel<T: Send + 'static>() -> (TestSender<T>, ItemStream<T>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        TestSender { sender },
        Box::pin(UnboundedReceiverStream::new(receiver)),
    )
}
