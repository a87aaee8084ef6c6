// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Adapters between push connections and reactive stream transformers.
//!
//! | From | To | Adapter |
//! |------|----|---------|
//! | [`StreamTransformer`](tether_core::StreamTransformer) | [`Connectable`](tether_core::Connectable) | [`from_transformer`] |
//! | [`Connectable`](tether_core::Connectable) | [`StreamTransformer`](tether_core::StreamTransformer) | [`to_transformer`] |
//! | any [`Connectable`](tether_core::Connectable) | a connectable silent after dispose | [`discard_after_dispose()`] |
//! | an async closure | a task-per-value [`Connectable`](tether_core::Connectable) | [`effect_handler`] |
//!
//! Both directions guarantee that nothing is delivered once `dispose()` has returned
//! (or once the output stream has been dropped), and that the underlying connection or
//! pipeline is released exactly once.
//!
//! # Asymmetries
//!
//! - **Errors**: a stream built with [`to_transformer`] forwards upstream failures as
//!   `StreamItem::Error`. A connection built with [`from_transformer`] cannot report a
//!   pipeline failure to its caller; the failure is logged and the pipeline stops.
//! - **Completion**: upstream completion ends the output stream of [`to_transformer`] but,
//!   by default, leaves the connection open until the stream is dropped. See
//!   [`TerminalPolicy`].

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod config;
pub mod discard_after_dispose;
pub mod effect_handler;
pub mod ext;
pub mod from_transformer;
pub mod to_transformer;

pub use self::config::{ConnectableConfig, TerminalPolicy, TransformerConfig};
pub use self::discard_after_dispose::{discard_after_dispose, DiscardAfterDispose};
pub use self::effect_handler::{
    effect_handler, effect_handler_on, effect_handler_with_config, EffectHandler,
};
pub use self::ext::{ConnectableExt, TransformerExt};
pub use self::from_transformer::{
    from_transformer, from_transformer_with_config, TransformerConnectable,
};
pub use self::to_transformer::{
    connect_stream, to_transformer, to_transformer_with_config, ConnectableTransformer,
    ConnectionStream,
};
