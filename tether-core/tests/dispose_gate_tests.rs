// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tether_core::{DisposeGate, Lifecycle};

#[test]
fn test_new_gate_is_uninitialized() {
    let gate = DisposeGate::new();
    assert_eq!(gate.lifecycle(), Lifecycle::Uninitialized);
    assert!(!gate.is_disposed());
}

#[test]
fn test_activate_only_once() {
    let gate = DisposeGate::new();
    assert!(gate.activate());
    assert!(!gate.activate());
    assert_eq!(gate.lifecycle(), Lifecycle::Active);
}

#[test]
fn test_no_transition_out_of_disposed() {
    // Arrange
    let gate = DisposeGate::new();
    gate.activate();

    // Act
    assert!(gate.dispose());

    // Assert
    assert!(!gate.activate());
    assert_eq!(gate.lifecycle(), Lifecycle::Disposed);
}

#[test]
fn test_dispose_transitions_exactly_once() {
    let gate = DisposeGate::new();
    gate.activate();

    let transitions = (0..5).filter(|_| gate.dispose()).count();

    assert_eq!(transitions, 1);
    assert!(gate.is_disposed());
}

#[test]
fn test_dispose_from_uninitialized() {
    let gate = DisposeGate::new();
    assert!(gate.dispose());
    assert_eq!(gate.lifecycle(), Lifecycle::Disposed);
}

#[test]
fn test_deliver_runs_until_disposed() {
    // Arrange
    let gate = DisposeGate::new();
    let delivered = AtomicUsize::new(0);

    // Act
    let before_activate = gate.deliver(|| {
        delivered.fetch_add(1, Ordering::SeqCst);
    });
    gate.activate();
    let while_active = gate.deliver(|| {
        delivered.fetch_add(1, Ordering::SeqCst);
    });
    gate.dispose();
    let after_dispose = gate.deliver(|| {
        delivered.fetch_add(1, Ordering::SeqCst);
    });

    // Assert
    assert!(before_activate);
    assert!(while_active);
    assert!(!after_dispose);
    assert_eq!(delivered.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dispose_inside_delivery_does_not_deadlock() {
    let gate = DisposeGate::new();
    gate.activate();

    let ran = gate.deliver(|| {
        assert!(gate.dispose());
    });

    assert!(ran);
    assert!(gate.is_disposed());
}

#[test]
fn test_dispose_waits_for_in_flight_delivery() {
    // Arrange
    let gate = Arc::new(DisposeGate::new());
    gate.activate();
    let finished = Arc::new(AtomicUsize::new(0));
    let entered = Arc::new(Barrier::new(2));

    let deliverer = {
        let gate = gate.clone();
        let finished = finished.clone();
        let entered = entered.clone();
        thread::spawn(move || {
            gate.deliver(|| {
                entered.wait();
                thread::sleep(Duration::from_millis(50));
                finished.fetch_add(1, Ordering::SeqCst);
            });
        })
    };

    // Act
    entered.wait();
    gate.dispose();

    // Assert: the delivery that was already running completed before dispose returned
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    deliverer.join().unwrap();
}

#[test]
fn test_no_delivery_completes_after_dispose_returns() {
    for _ in 0..50 {
        // Arrange
        let gate = Arc::new(DisposeGate::new());
        gate.activate();
        let late = Arc::new(AtomicUsize::new(0));
        let disposed = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let start = Arc::new(Barrier::new(3));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let gate = gate.clone();
                let late = late.clone();
                let disposed = disposed.clone();
                let start = start.clone();
                thread::spawn(move || {
                    start.wait();
                    for _ in 0..500 {
                        gate.deliver(|| {
                            if disposed.load(Ordering::SeqCst) {
                                late.fetch_add(1, Ordering::SeqCst);
                            }
                        });
                    }
                })
            })
            .collect();

        // Act
        start.wait();
        gate.dispose();
        disposed.store(true, Ordering::SeqCst);

        for worker in workers {
            worker.join().unwrap();
        }

        // Assert
        assert_eq!(late.load(Ordering::SeqCst), 0);
    }
}
