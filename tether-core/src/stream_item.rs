// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::TetherError;

/// One element of an [`ItemStream`](crate::ItemStream).
///
/// A push connection only ever sees values. The stream side has two more signals: an
/// `Error` item, after which nothing follows, and the end of the stream (`None`) for
/// completion. Adapters translate between the two worlds at exactly these points.
#[derive(Debug, Clone)]
pub enum StreamItem<T> {
    Value(T),
    /// Terminal failure
    Error(TetherError),
}

// Two failures are never considered the same event.
impl<T: PartialEq> PartialEq for StreamItem<T> {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (StreamItem::Value(a), StreamItem::Value(b)) if a == b)
    }
}

impl<T> StreamItem<T> {
    /// Transform the value of a `Value` item; failures pass through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StreamItem<U> {
        match self {
            StreamItem::Value(v) => StreamItem::Value(f(v)),
            StreamItem::Error(e) => StreamItem::Error(e),
        }
    }
}

impl<T> From<Result<T, TetherError>> for StreamItem<T> {
    fn from(result: Result<T, TetherError>) -> Self {
        result.map_or_else(StreamItem::Error, StreamItem::Value)
    }
}
