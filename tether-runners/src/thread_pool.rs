// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fixed-size pool of named worker threads.
//!
//! Worker names come from one counter shared by every pool in the process, so two
//! pools never hand out the same name. Which suffix a given pool receives depends on
//! the order pools are created in and is otherwise unspecified.

use crate::config::RunnerConfig;
use crate::work_runner::{Work, WorkRunner};
use async_channel::{Receiver, Sender};
use core::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use tether_core::{Result, TetherError};

// Shared by all pools in the process.
static THREAD_COUNT: AtomicU64 = AtomicU64::new(0);

fn next_thread_name(prefix: &str) -> String {
    let n = THREAD_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    format!("{prefix}-{n}")
}

/// A [`WorkRunner`] backed by a fixed number of named threads.
///
/// Work posted before [`dispose`](WorkRunner::dispose) still runs. `dispose` waits for
/// the workers to drain the queue, except when called from a worker thread.
pub struct ThreadPoolWorkRunner {
    sender: Sender<Work>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    thread_names: Vec<String>,
}

impl ThreadPoolWorkRunner {
    /// Start a pool.
    ///
    /// # Errors
    ///
    /// Returns `TetherError::InvalidConfiguration` for an invalid `config` and a user
    /// error if the OS refuses to spawn a thread.
    pub fn new(config: &RunnerConfig) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = async_channel::unbounded::<Work>();
        let mut workers = Vec::with_capacity(config.threads);
        let mut thread_names = Vec::with_capacity(config.threads);

        for _ in 0..config.threads {
            let name = next_thread_name(&config.name_prefix);
            let receiver = receiver.clone();
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&receiver));

            match spawned {
                Ok(handle) => {
                    workers.push(handle);
                    thread_names.push(name);
                }
                Err(e) => {
                    sender.close();
                    return Err(TetherError::user_error(e));
                }
            }
        }

        debug!("thread pool started: {}", thread_names.join(", "));

        Ok(Self {
            sender,
            workers: Mutex::new(workers),
            thread_names,
        })
    }

    /// Names of the worker threads, in spawn order.
    pub fn thread_names(&self) -> &[String] {
        &self.thread_names
    }

    /// Returns `true` once the pool has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.sender.is_closed()
    }
}

fn worker_loop(receiver: &Receiver<Work>) {
    while let Ok(work) = receiver.recv_blocking() {
        if catch_unwind(AssertUnwindSafe(work)).is_err() {
            error!(
                "work item panicked on {}",
                thread::current().name().unwrap_or("unnamed worker")
            );
        }
    }
}

impl WorkRunner for ThreadPoolWorkRunner {
    fn post(&self, work: Work) -> Result<()> {
        self.sender
            .try_send(work)
            .map_err(|_| TetherError::runner_disposed("thread pool"))
    }

    fn dispose(&self) {
        if !self.sender.close() {
            return;
        }

        let current = thread::current().id();
        let workers = core::mem::take(&mut *self.workers.lock());
        for handle in workers {
            // A worker disposing its own pool cannot join itself
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }
        debug!("thread pool disposed: {}", self.thread_names.join(", "));
    }
}

impl core::fmt::Debug for ThreadPoolWorkRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadPoolWorkRunner")
            .field("threads", &self.thread_names)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
