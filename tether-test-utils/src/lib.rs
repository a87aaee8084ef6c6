// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the tether workspace.
//!
//! Everything here is meant for tests and benches only.
//!
//! # Key Types
//!
//! - [`RecordingConsumer`] records every value a connection emits and lets a test wait
//!   for a given number of them.
//! - [`InstrumentedConnectable`] is a mapping connectable that counts connects, accepts
//!   and disposes, and can be told to misbehave.
//! - [`test_channel`] builds an imperatively driven upstream for a transformer.
//! - [`DropCountingStream`] counts how many times an upstream was released.
//!
//! ```rust
//! use tether_core::{Connectable, Connection};
//! use tether_test_utils::{InstrumentedConnectable, RecordingConsumer};
//!
//! let connectable = InstrumentedConnectable::new(|v: i32| v + 1);
//! let recorder = RecordingConsumer::new();
//!
//! let connection = connectable.connect(recorder.consumer()).unwrap();
//! connection.accept(41);
//! connection.dispose();
//!
//! assert_eq!(recorder.values(), vec![42]);
//! assert_eq!(connectable.stats().disposes(), 1);
//! ```

pub mod drop_counting;
pub mod helpers;
pub mod instrumented;
pub mod recording;
pub mod test_channel;

pub use self::drop_counting::{DropCounter, DropCountingStream};
pub use self::helpers::{assert_no_element_emitted, expect_next_error, expect_next_value};
pub use self::instrumented::{ConnectionStats, InstrumentedConnectable};
pub use self::recording::RecordingConsumer;
pub use self::test_channel::{test_channel, TestSender};
