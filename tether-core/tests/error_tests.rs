// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io;
use tether_core::{IntoTetherError, ResultExt, StreamItem, TetherError};

#[test]
fn test_error_display() {
    assert_eq!(
        TetherError::stream_error("upstream failed").to_string(),
        "Stream processing error: upstream failed"
    );
    assert_eq!(
        TetherError::connection_refused("limit").to_string(),
        "Connection refused: limit"
    );
    assert_eq!(
        TetherError::invalid_configuration("threads = 0").to_string(),
        "Invalid configuration: threads = 0"
    );
}

#[test]
fn test_misuse_classification() {
    assert!(TetherError::no_runtime("connect").is_misuse());
    assert!(TetherError::invalid_configuration("x").is_misuse());
    assert!(!TetherError::stream_error("x").is_misuse());
    assert!(!TetherError::runner_disposed("x").is_misuse());
}

#[test]
fn test_clone_degrades_user_error_to_message() {
    let err = io::Error::other("disk gone").into_tether();
    let cloned = err.clone();

    assert!(matches!(err, TetherError::UserError(_)));
    assert!(matches!(
        cloned,
        TetherError::StreamProcessingError { ref context } if context.contains("disk gone")
    ));
}

#[test]
fn test_context_prefixes_user_errors() {
    let result: Result<(), TetherError> = Err(io::Error::other("boom").into_tether());

    let err = result.context("connecting").unwrap_err();

    assert_eq!(
        err.to_string(),
        "Stream processing error: connecting: boom"
    );
}

#[test]
fn test_from_user_errors_counts() {
    let err = TetherError::from_user_errors(vec![io::Error::other("a"), io::Error::other("b")]);
    assert!(matches!(err, TetherError::MultipleErrors { count: 2, .. }));
}

#[test]
fn test_stream_item_from_result() {
    let ok: StreamItem<i32> = Ok(1).into();
    let failed: StreamItem<i32> = Err(TetherError::stream_error("x")).into();

    assert_eq!(ok.map(|v| v + 1), StreamItem::Value(2));
    assert!(matches!(failed.map(|v| v + 1), StreamItem::Error(_)));
    // Errors never compare equal, even to themselves
    assert_ne!(
        StreamItem::<i32>::Error(TetherError::stream_error("x")),
        StreamItem::Error(TetherError::stream_error("x"))
    );
}
