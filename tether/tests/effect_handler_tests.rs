// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tether::{effect_handler, effect_handler_on};
use tether_core::{Connectable, Connection, SharedConsumer, TetherError};
use tether_test_utils::RecordingConsumer;
use tokio::time::sleep;

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_each_value_runs_as_its_own_task() -> anyhow::Result<()> {
    // Arrange
    let handler = effect_handler(|id: u32, output: SharedConsumer<String>| async move {
        output.accept(format!("{id}:started"));
        sleep(Duration::from_millis(u64::from(id) * 10)).await;
        output.accept(format!("{id}:done"));
    });
    let recorder = RecordingConsumer::new();
    let connection = handler.connect(recorder.consumer())?;

    // Act
    connection.accept(3);
    connection.accept(1);

    // Assert
    recorder.wait_for(4, TIMEOUT).await;
    let values = recorder.values();
    let position = |s: &str| values.iter().position(|v| v == s);
    assert!(position("1:done") < position("3:done"));
    assert!(position("3:started") < position("3:done"));
    connection.dispose();
    Ok(())
}

#[tokio::test]
async fn test_dispose_cancels_tasks_in_flight() -> anyhow::Result<()> {
    // Arrange
    let completed = Arc::new(AtomicUsize::new(0));
    let handler = {
        let completed = completed.clone();
        effect_handler(move |v: i32, output: SharedConsumer<i32>| {
            let completed = completed.clone();
            async move {
                sleep(Duration::from_millis(50)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                output.accept(v);
            }
        })
    };
    let recorder = RecordingConsumer::new();
    let connection = handler.connect(recorder.consumer())?;

    // Act
    connection.accept(1);
    connection.accept(2);
    sleep(Duration::from_millis(5)).await;
    connection.dispose();
    connection.accept(3);
    sleep(Duration::from_millis(120)).await;

    // Assert
    assert_eq!(completed.load(Ordering::SeqCst), 0);
    assert!(recorder.is_empty());
    Ok(())
}

#[test]
fn test_connect_outside_runtime_fails_fast() {
    let handler = effect_handler(|_: i32, _: SharedConsumer<i32>| async {});

    let result = handler.connect(Box::new(|_: i32| {}));

    assert!(matches!(result, Err(TetherError::NoRuntime { .. })));
}

#[test]
fn test_tasks_run_on_the_given_runtime() -> anyhow::Result<()> {
    // Arrange
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("effects")
        .enable_all()
        .build()?;
    let handler = effect_handler_on(
        runtime.handle().clone(),
        |v: i32, output: SharedConsumer<(i32, Option<String>)>| async move {
            output.accept((v, std::thread::current().name().map(str::to_owned)));
        },
    );
    let (tx, rx) = mpsc::channel();

    // Act
    let connection = handler.connect(Box::new(move |v: (i32, Option<String>)| {
        let _ = tx.send(v);
    }))?;
    connection.accept(8);

    // Assert
    assert_eq!(rx.recv_timeout(TIMEOUT)?, (8, Some("effects".to_owned())));
    connection.dispose();
    Ok(())
}
