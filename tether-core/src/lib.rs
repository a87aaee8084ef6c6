// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared vocabulary for the tether adapters.
//!
//! Two abstractions meet here:
//!
//! - the **push connection**: a [`Connectable`] hands out [`Connection`]s that accept
//!   values synchronously and are torn down with an explicit `dispose()`;
//! - the **stream transformer**: a [`StreamTransformer`] maps one [`ItemStream`] onto
//!   another, where dropping the output stream is the only cancellation signal.
//!
//! The lifecycle primitives ([`DisposeGate`], [`Relay`]) are what the `tether` crate
//! builds its adapters from.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod connection;
pub mod dispose_gate;
pub mod error;
pub mod relay;
pub mod stream_item;
pub mod transformer;

pub use self::connection::{
    connectable_fn, BoxConnection, BoxConsumer, Connectable, Connection, Consumer, FnConnectable,
    SharedConsumer,
};
pub use self::dispose_gate::{DisposeGate, Lifecycle};
pub use self::error::{IntoTetherError, RelayError, Result, ResultExt, TetherError};
pub use self::relay::{Relay, RelayStream};
pub use self::stream_item::StreamItem;
pub use self::transformer::{transformer_fn, FnTransformer, ItemStream, StreamTransformer};
