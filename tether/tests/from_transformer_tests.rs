// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, OnceLock};
use std::time::Duration;
use tether::{from_transformer, from_transformer_with_config, ConnectableConfig};
use tether_core::{
    transformer_fn, BoxConnection, Connectable, Connection, ItemStream, StreamItem,
    StreamTransformer, TetherError,
};
use tether_runners::{WorkRunner, WorkRunners};
use tether_test_utils::RecordingConsumer;
use tokio::time::sleep;

const TIMEOUT: Duration = Duration::from_secs(2);

fn doubling() -> impl StreamTransformer<i32, i32> {
    transformer_fn(|upstream: ItemStream<i32>| -> ItemStream<i32> {
        upstream.map(|item| item.map(|v| v * 2)).boxed()
    })
}

#[derive(Debug, thiserror::Error)]
#[error("zero is not a valid payload")]
struct ZeroPayload;

fn failing_on_zero() -> impl StreamTransformer<i32, i32> {
    transformer_fn(|upstream: ItemStream<i32>| -> ItemStream<i32> {
        upstream
            .map(|item| match item {
                StreamItem::Value(0) => StreamItem::Error(TetherError::user_error(ZeroPayload)),
                other => other,
            })
            .boxed()
    })
}

fn slow_identity() -> impl StreamTransformer<i32, i32> {
    transformer_fn(|upstream: ItemStream<i32>| -> ItemStream<i32> {
        upstream
            .then(|item| async move {
                sleep(Duration::from_millis(20)).await;
                item
            })
            .boxed()
    })
}

#[tokio::test]
async fn test_accepted_values_are_transformed_in_order() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(doubling());
    let recorder = RecordingConsumer::new();
    let connection = connectable.connect(recorder.consumer())?;

    // Act
    connection.accept(1);
    connection.accept(2);
    connection.accept(3);

    // Assert
    recorder.wait_for(3, TIMEOUT).await;
    assert_eq!(recorder.values(), vec![2, 4, 6]);
    connection.dispose();
    Ok(())
}

#[tokio::test]
async fn test_connections_are_independent() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(doubling());
    let (first, second) = (RecordingConsumer::new(), RecordingConsumer::new());
    let first_connection = connectable.connect(first.consumer())?;
    let second_connection = connectable.connect(second.consumer())?;

    // Act
    first_connection.accept(1);
    second_connection.accept(10);
    first_connection.dispose();
    second_connection.accept(20);

    // Assert
    first.wait_for(1, TIMEOUT).await;
    second.wait_for(2, TIMEOUT).await;
    assert_eq!(first.values(), vec![2]);
    assert_eq!(second.values(), vec![20, 40]);
    second_connection.dispose();
    Ok(())
}

#[tokio::test]
async fn test_nothing_is_delivered_after_dispose() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(slow_identity());
    let recorder = RecordingConsumer::new();
    let connection = connectable.connect(recorder.consumer())?;

    // Act
    connection.accept(1);
    connection.accept(2);
    connection.dispose();
    connection.accept(3);
    sleep(Duration::from_millis(100)).await;

    // Assert
    assert!(recorder.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dispose_is_idempotent() -> anyhow::Result<()> {
    let connectable = from_transformer(doubling());
    let recorder = RecordingConsumer::new();
    let connection = connectable.connect(recorder.consumer())?;

    connection.accept(1);
    recorder.wait_for(1, TIMEOUT).await;
    connection.dispose();
    connection.dispose();
    connection.accept(2);
    sleep(Duration::from_millis(20)).await;

    assert_eq!(recorder.values(), vec![2]);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_failure_is_not_forwarded_and_stops_the_pipeline() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(failing_on_zero());
    let recorder = RecordingConsumer::new();
    let connection = connectable.connect(recorder.consumer())?;

    // Act
    connection.accept(1);
    connection.accept(0);
    connection.accept(2);
    recorder.wait_for(1, TIMEOUT).await;
    sleep(Duration::from_millis(50)).await;

    // Assert
    assert_eq!(recorder.values(), vec![1]);
    connection.dispose();
    Ok(())
}

#[tokio::test]
async fn test_consumer_can_dispose_its_own_connection() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(doubling());
    let recorder = RecordingConsumer::new();
    let slot = Arc::new(OnceLock::<BoxConnection<i32>>::new());
    let consumer = {
        let recorder = recorder.clone();
        let slot = slot.clone();
        move |value: i32| {
            recorder.record(value);
            if let Some(connection) = slot.get() {
                connection.dispose();
            }
        }
    };
    assert!(slot.set(connectable.connect(Box::new(consumer))?).is_ok());

    // Act
    if let Some(connection) = slot.get() {
        connection.accept(1);
        connection.accept(2);
    }
    recorder.wait_for(1, TIMEOUT).await;
    sleep(Duration::from_millis(50)).await;

    // Assert
    assert_eq!(recorder.values(), vec![2]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_delivery_after_dispose_returns_under_concurrent_accepts() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(doubling());
    let disposed = Arc::new(AtomicBool::new(false));
    let late = Arc::new(AtomicUsize::new(0));
    let connection = {
        let disposed = disposed.clone();
        let late = late.clone();
        Arc::new(connectable.connect(Box::new(move |_value: i32| {
            if disposed.load(Ordering::SeqCst) {
                late.fetch_add(1, Ordering::SeqCst);
            }
        }))?)
    };
    let runner = WorkRunners::fixed_thread_pool(2)?;

    // Act
    for i in 0..2_000 {
        let connection = connection.clone();
        runner.post(Box::new(move || connection.accept(i)))?;
    }
    sleep(Duration::from_millis(2)).await;
    connection.dispose();
    disposed.store(true, Ordering::SeqCst);
    tokio::task::spawn_blocking(move || runner.dispose()).await?;
    sleep(Duration::from_millis(50)).await;

    // Assert
    assert_eq!(late.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_connect_outside_runtime_fails_fast() {
    let connectable = from_transformer(doubling());

    let result = connectable.connect(Box::new(|_: i32| {}));

    assert!(matches!(result, Err(TetherError::NoRuntime { .. })));
}

#[test]
fn test_explicit_runtime_allows_connecting_from_any_thread() -> anyhow::Result<()> {
    // Arrange
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let connectable = from_transformer_with_config(
        doubling(),
        ConnectableConfig::default().with_runtime(runtime.handle().clone()),
    );
    let (tx, rx) = mpsc::channel();

    // Act
    let connection = connectable.connect(Box::new(move |v: i32| {
        let _ = tx.send(v);
    }))?;
    connection.accept(21);

    // Assert
    assert_eq!(rx.recv_timeout(TIMEOUT)?, 42);
    connection.dispose();
    Ok(())
}

#[tokio::test]
async fn test_synchronous_transformer_delivers_before_accept_returns() -> anyhow::Result<()> {
    // Arrange
    let connectable = from_transformer(doubling());
    let recorder = RecordingConsumer::new();
    let connection = connectable.connect(recorder.consumer())?;

    // Act
    connection.accept(5);
    connection.accept(6);

    // Assert
    assert_eq!(recorder.values(), vec![10, 12]);
    connection.dispose();
    Ok(())
}

#[tokio::test]
async fn test_input_values_need_not_be_clone() -> anyhow::Result<()> {
    // Arrange
    struct Ticket(u32);

    let connectable = from_transformer(transformer_fn(
        |upstream: ItemStream<Ticket>| -> ItemStream<u32> {
            upstream.map(|item| item.map(|ticket| ticket.0)).boxed()
        },
    ));
    let recorder = RecordingConsumer::new();
    let connection = connectable.connect(recorder.consumer())?;

    // Act
    connection.accept(Ticket(7));

    // Assert
    assert_eq!(recorder.values(), vec![7]);
    connection.dispose();
    Ok(())
}
