// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt::Debug;
use futures::stream::StreamExt;
use futures::Stream;
use std::time::Duration;
use tether_core::{StreamItem, TetherError};
use tokio::time::sleep;

pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
    T: Debug,
{
    tokio::select! {
        item = stream.next() => {
            panic!("Unexpected item emitted, expected no output: {item:?}");
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

pub async fn expect_next_value<S, T>(stream: &mut S, expected: T)
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: Debug + PartialEq,
{
    match stream.next().await {
        Some(StreamItem::Value(value)) => assert_eq!(value, expected),
        other => panic!("expected value {expected:?}, got {other:?}"),
    }
}

pub async fn expect_next_error<S, T>(stream: &mut S) -> TetherError
where
    S: Stream<Item = StreamItem<T>> + Unpin,
    T: Debug,
{
    match stream.next().await {
        Some(StreamItem::Error(error)) => error,
        other => panic!("expected error, got {other:?}"),
    }
}
