// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Work runners: post closures to be run on threads owned by the runner.
//!
//! ```
//! use std::sync::mpsc;
//! use tether_runners::{WorkRunner, WorkRunners};
//!
//! let runner = WorkRunners::single_thread().unwrap();
//! let (tx, rx) = mpsc::channel();
//!
//! runner
//!     .post(Box::new(move || {
//!         let name = std::thread::current().name().map(str::to_owned);
//!         tx.send(name).unwrap();
//!     }))
//!     .unwrap();
//!
//! let name = rx.recv().unwrap().unwrap();
//! assert!(name.starts_with("tether-thread-"));
//! runner.dispose();
//! ```


#[macro_use]
mod logging;

pub mod config;
pub mod handle;
pub mod immediate;
pub mod thread_pool;
pub mod work_runner;
pub mod work_runners;

pub use self::config::{RunnerConfig, DEFAULT_NAME_PREFIX};
pub use self::handle::HandleWorkRunner;
pub use self::immediate::ImmediateWorkRunner;
pub use self::thread_pool::ThreadPoolWorkRunner;
pub use self::work_runner::{Work, WorkRunner};
pub use self::work_runners::WorkRunners;
