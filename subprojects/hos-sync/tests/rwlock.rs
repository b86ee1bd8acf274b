//! Read/write lock integration tests.

mod common;

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::{thread, time::Duration, time::Instant};

use common::sleep_ms;
use hos_sync::{Barrier, RwLock};

/// A single reader excludes writers but not other readers.
#[test]
fn read_lock_single_thread() {
    let rw = RwLock::new();

    rw.read_lock();
    assert!(!rw.is_write_lock_held_by_current_thread());
    assert!(!rw.try_write_lock(), "a held read lock excludes writers");
    assert!(rw.try_read_lock(), "readers share");
    rw.read_unlock();
    rw.read_unlock();

    assert!(rw.try_write_lock());
    rw.write_unlock();
}

/// A single writer owns the lock exclusively and reads through it.
#[test]
fn write_lock_single_thread() {
    let rw = RwLock::new();

    rw.write_lock();
    assert!(rw.is_write_lock_held_by_current_thread());
    assert!(rw.is_owned_by_current_thread());

    // Reentrant write and promoted read both ride on the write depth.
    assert!(rw.try_write_lock());
    rw.write_unlock();
    assert!(rw.try_read_lock());
    rw.read_unlock();

    rw.write_unlock();
    assert!(!rw.is_write_lock_held_by_current_thread());
    assert!(rw.try_write_lock());
    rw.write_unlock();
}

/// All readers are admitted concurrently when no writer is around.
#[test]
fn readers_run_concurrently() {
    const READERS: u32 = 4;

    let rw = RwLock::new();
    let start = Barrier::new(READERS as u64);
    let active = AtomicU32::new(0);
    let peak = AtomicU32::new(0);

    thread::scope(|s| {
        for _ in 0..READERS {
            s.spawn(|| {
                start.wait();
                rw.read_lock();
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep_ms(100);
                active.fetch_sub(1, Ordering::SeqCst);
                rw.read_unlock();
            });
        }
    });

    assert_eq!(peak.load(Ordering::SeqCst), READERS, "all readers overlap");
    assert_eq!(active.load(Ordering::SeqCst), 0);
    assert!(rw.try_write_lock(), "all read locks were returned");
    rw.write_unlock();
}

/// Readers arriving while a writer holds the lock are admitted together
/// once the writer leaves, and never overlap with it.
///
/// Timeline (ms): writer locks at 0 and holds 450; readers arrive at 150.
///   t=300  writer active, no readers
///   t=600  writer done, all three readers active
#[test]
fn writer_excludes_readers() {
    const READERS: u32 = 3;

    let rw = RwLock::new();
    let writer_active = AtomicU32::new(0);
    let active_readers = AtomicU32::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            rw.write_lock();
            writer_active.store(1, Ordering::SeqCst);
            sleep_ms(450);
            writer_active.store(0, Ordering::SeqCst);
            rw.write_unlock();
        });

        for _ in 0..READERS {
            s.spawn(|| {
                sleep_ms(150);
                rw.read_lock();
                assert_eq!(
                    writer_active.load(Ordering::SeqCst),
                    0,
                    "reader admitted while the writer is active"
                );
                active_readers.fetch_add(1, Ordering::SeqCst);
                sleep_ms(300);
                active_readers.fetch_sub(1, Ordering::SeqCst);
                rw.read_unlock();
            });
        }

        sleep_ms(300);
        assert_eq!(writer_active.load(Ordering::SeqCst), 1);
        assert_eq!(active_readers.load(Ordering::SeqCst), 0);

        sleep_ms(300); // t=600
        assert_eq!(writer_active.load(Ordering::SeqCst), 0);
        assert_eq!(active_readers.load(Ordering::SeqCst), READERS);
    });

    assert!(rw.try_write_lock());
    rw.write_unlock();
}

/// A queued writer blocks new readers (the anti-starvation rule) and is
/// served before them.
///
/// Timeline (ms): R1 reads at 0 holding 450; W queues at 150; R2 arrives at 300.
#[test]
fn waiting_writer_blocks_new_readers() {
    let rw = RwLock::new();
    let epoch = Instant::now();
    let writer_acquired_ms = AtomicU64::new(u64::MAX);
    let reader2_acquired_ms = AtomicU64::new(u64::MAX);

    thread::scope(|s| {
        s.spawn(|| {
            rw.read_lock();
            sleep_ms(450);
            rw.read_unlock();
        });

        s.spawn(|| {
            sleep_ms(150);
            rw.write_lock();
            writer_acquired_ms.store(epoch.elapsed().as_millis() as u64, Ordering::SeqCst);
            sleep_ms(150);
            rw.write_unlock();
        });

        s.spawn(|| {
            sleep_ms(300);
            rw.read_lock();
            reader2_acquired_ms.store(epoch.elapsed().as_millis() as u64, Ordering::SeqCst);
            rw.read_unlock();
        });

        // While the writer is queued behind R1, new readers must be held
        // back even though only a read lock is active.
        sleep_ms(375);
        assert!(!rw.try_read_lock(), "queued writer blocks new readers");
    });

    let writer_at = writer_acquired_ms.load(Ordering::SeqCst);
    let reader2_at = reader2_acquired_ms.load(Ordering::SeqCst);
    assert!(writer_at < u64::MAX && reader2_at < u64::MAX);
    assert!(
        writer_at < reader2_at,
        "writer (t={writer_at}ms) must be served before the late reader (t={reader2_at}ms)"
    );
}

/// Write-holder promotion, releasing the reads first.
#[test]
fn promotion_unlock_reads_first() {
    let rw = RwLock::new();

    rw.write_lock();
    rw.read_lock();
    rw.read_lock();

    rw.read_unlock();
    rw.read_unlock();
    assert!(rw.is_write_lock_held_by_current_thread());
    rw.write_unlock();

    assert_released(&rw);
}

/// Write-holder promotion, releasing the write first; the final read unlock
/// releases the whole lock.
#[test]
fn promotion_unlock_write_first() {
    let rw = RwLock::new();

    rw.write_lock();
    rw.read_lock();
    rw.read_lock();

    rw.write_unlock();
    assert!(rw.is_owned_by_current_thread());
    rw.read_unlock();
    rw.read_unlock();

    assert_released(&rw);
}

/// Write-holder promotion with interleaved unlock order.
#[test]
fn promotion_unlock_interleaved() {
    let rw = RwLock::new();

    rw.write_lock();
    rw.read_lock();
    rw.write_lock();
    rw.read_lock();

    rw.read_unlock();
    rw.write_unlock();
    rw.read_unlock();
    assert!(rw.is_owned_by_current_thread());
    rw.write_unlock();

    assert_released(&rw);
}

/// After the write-holder's final unlock the lock must be immediately
/// available, both to this thread and to others.
fn assert_released(rw: &RwLock) {
    assert!(!rw.is_owned_by_current_thread());
    assert!(rw.try_write_lock(), "lock must be free after the last unlock");
    rw.write_unlock();

    thread::scope(|s| {
        s.spawn(|| {
            assert!(rw.try_write_lock(), "other threads can take the freed lock");
            rw.write_unlock();
            assert!(rw.try_read_lock());
            rw.read_unlock();
        });
    });
}

/// A writer queued behind readers eventually gets in even while readers
/// keep arriving (no writer starvation).
#[test]
fn writer_is_not_starved_by_reader_stream() {
    let rw = RwLock::new();
    let stop = AtomicU32::new(0);
    let writer_done = AtomicU32::new(0);

    thread::scope(|s| {
        // A continuous stream of short readers.
        for _ in 0..3 {
            s.spawn(|| {
                while stop.load(Ordering::SeqCst) == 0 {
                    rw.read_lock();
                    sleep_ms(10);
                    rw.read_unlock();
                }
            });
        }

        s.spawn(|| {
            sleep_ms(50);
            rw.write_lock();
            writer_done.store(1, Ordering::SeqCst);
            rw.write_unlock();
        });

        let served = common::wait_until(Duration::from_secs(3), || {
            writer_done.load(Ordering::SeqCst) == 1
        });
        stop.store(1, Ordering::SeqCst);
        assert!(served, "writer starved by reader stream");
    });
}
