//! Randomized stress tests.
//!
//! These drive the primitives with random interleavings and check the
//! conservation and exclusion laws that must hold regardless of schedule.

mod common;

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::thread;

use hos_sync::{Mutex, RwLock, Semaphore};
use rand::Rng;

/// Random hold times never break mutual exclusion or lose increments.
#[test]
fn mutex_exclusion_randomized() {
    const THREADS: u64 = 8;
    const ITERS: u64 = 200;

    let mutex = Mutex::new();
    let inside = AtomicU32::new(0);
    let total = AtomicU64::new(0);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let mut rng = rand::thread_rng();
                for _ in 0..ITERS {
                    mutex.lock();
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0, "mutex violated");
                    if rng.gen_bool(0.2) {
                        std::thread::yield_now();
                    }
                    total.fetch_add(1, Ordering::SeqCst);
                    inside.fetch_sub(1, Ordering::SeqCst);
                    mutex.unlock();
                }
            });
        }
    });

    assert_eq!(total.load(Ordering::SeqCst), THREADS * ITERS);
}

/// Semaphore conservation: with balanced waits and signals, exactly the
/// initial permits remain, and the permit bound is never exceeded.
#[test]
fn semaphore_conservation_randomized() {
    const PERMITS: u32 = 3;
    const THREADS: u32 = 8;
    const ITERS: u32 = 50;

    let sem = Semaphore::new(PERMITS as u64);
    let active = AtomicU32::new(0);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let mut rng = rand::thread_rng();
                for _ in 0..ITERS {
                    if rng.gen_bool(0.5) {
                        if !sem.try_wait() {
                            continue;
                        }
                    } else {
                        sem.wait();
                    }
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    assert!(now <= PERMITS, "more holders than permits");
                    if rng.gen_bool(0.3) {
                        common::sleep_ms(1);
                    }
                    active.fetch_sub(1, Ordering::SeqCst);
                    sem.signal();
                }
            });
        }
    });

    for _ in 0..PERMITS {
        assert!(sem.try_wait(), "an initial permit went missing");
    }
    assert!(!sem.try_wait(), "permits were minted from nowhere");
}

/// Readers and writers under a random mix: writers are exclusive, readers
/// only overlap with readers, and every acquisition is matched.
#[test]
fn rwlock_exclusion_randomized() {
    const THREADS: u32 = 8;
    const ITERS: u32 = 100;

    let rw = RwLock::new();
    let readers = AtomicU32::new(0);
    let writers = AtomicU32::new(0);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let mut rng = rand::thread_rng();
                for _ in 0..ITERS {
                    if rng.gen_bool(0.8) {
                        rw.read_lock();
                        assert_eq!(writers.load(Ordering::SeqCst), 0, "reader saw a writer");
                        readers.fetch_add(1, Ordering::SeqCst);
                        if rng.gen_bool(0.2) {
                            std::thread::yield_now();
                        }
                        readers.fetch_sub(1, Ordering::SeqCst);
                        rw.read_unlock();
                    } else {
                        rw.write_lock();
                        assert_eq!(writers.fetch_add(1, Ordering::SeqCst), 0, "two writers");
                        assert_eq!(readers.load(Ordering::SeqCst), 0, "writer saw a reader");
                        if rng.gen_bool(0.2) {
                            std::thread::yield_now();
                        }
                        writers.fetch_sub(1, Ordering::SeqCst);
                        rw.write_unlock();
                    }
                }
            });
        }
    });

    assert_eq!(readers.load(Ordering::SeqCst), 0);
    assert_eq!(writers.load(Ordering::SeqCst), 0);
    assert!(rw.try_write_lock(), "lock must be free after the run");
    rw.write_unlock();
}
