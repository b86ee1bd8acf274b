//! Condition variable integration tests.
//!
//! The single-waiter timelines sample both the mutex tag and the condvar
//! waiter count at fixed offsets; multi-waiter tests assert only on
//! schedule-independent facts.

mod common;

use core::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::{thread, time::Duration, time::Instant};

use common::{MS, load_word, sleep_ms, wait_until};
use hos_svc::sync::HANDLE_WAIT_MASK;
use hos_sync::{Condvar, Mutex};

const TAG_A: i64 = 0xA;
const TAG_B: i64 = 0xB;

/// Basic wait / wake-one hand-off between two threads.
///
/// Timeline (ms):
///   B: lock at 100, wait at 250     A: lock at 400, wake at 550, unlock at 700
///   t=175  mutex held by B, no cv waiters
///   t=325  mutex released by the wait, one cv waiter
///   t=475  mutex held by A, still one cv waiter
///   t=625  cv waiter consumed; B is parked on the mutex (wait bit set)
///   t=775  everything released; B observed A's tag and wrote its own
#[test]
fn wait_and_wake_one() {
    let mutex = Mutex::new();
    let condvar = Condvar::new();
    let shared = AtomicI64::new(-1);

    thread::scope(|s| {
        // Thread B: waits for A's tag, then leaves its own.
        s.spawn(|| {
            sleep_ms(100);
            mutex.lock();
            sleep_ms(150);
            while shared.load(Ordering::SeqCst) != TAG_A {
                condvar.wait(&mutex).unwrap();
            }
            shared.store(TAG_B, Ordering::SeqCst);
            mutex.unlock();
        });

        // Thread A: publishes its tag and wakes B.
        s.spawn(|| {
            sleep_ms(400);
            mutex.lock();
            shared.store(TAG_A, Ordering::SeqCst);
            sleep_ms(150);
            condvar.wake_one();
            sleep_ms(150);
            mutex.unlock();
        });

        sleep_ms(175);
        let tag = load_word(mutex.as_ptr());
        assert_ne!(tag, 0, "B holds the mutex");
        assert_eq!(tag & HANDLE_WAIT_MASK, 0);
        assert_eq!(load_word(condvar.as_ptr()), 0);
        assert_eq!(shared.load(Ordering::SeqCst), -1);

        sleep_ms(150); // t=325
        assert_eq!(load_word(mutex.as_ptr()), 0, "wait released the mutex");
        assert_eq!(load_word(condvar.as_ptr()), 1);
        assert_eq!(shared.load(Ordering::SeqCst), -1);

        sleep_ms(150); // t=475
        let tag = load_word(mutex.as_ptr());
        assert_ne!(tag, 0, "A holds the mutex");
        assert_eq!(tag & HANDLE_WAIT_MASK, 0);
        assert_eq!(load_word(condvar.as_ptr()), 1);
        assert_eq!(shared.load(Ordering::SeqCst), TAG_A);

        sleep_ms(150); // t=625
        let tag = load_word(mutex.as_ptr());
        assert_ne!(tag, 0, "A still holds the mutex");
        assert_ne!(tag & HANDLE_WAIT_MASK, 0, "woken B is parked on the mutex");
        assert_eq!(load_word(condvar.as_ptr()), 0);
        assert_eq!(shared.load(Ordering::SeqCst), TAG_A);

        sleep_ms(150); // t=775
        assert_eq!(load_word(mutex.as_ptr()), 0);
        assert_eq!(load_word(condvar.as_ptr()), 0);
        assert_eq!(shared.load(Ordering::SeqCst), TAG_B);
    });
}

/// `wake_all` releases every parked thread and returns the waiter count to
/// zero; each thread reports in through its own bit.
#[test]
fn wake_all_releases_all_waiters() {
    const WAITERS: u32 = 32;

    let mutex = Mutex::new();
    let condvar = Condvar::new();
    let release = AtomicU32::new(0);
    let bits = AtomicU32::new(0);

    thread::scope(|s| {
        for i in 0..WAITERS {
            let (mutex, condvar, release, bits) = (&mutex, &condvar, &release, &bits);
            s.spawn(move || {
                mutex.lock();
                while release.load(Ordering::SeqCst) == 0 {
                    condvar.wait(mutex).unwrap();
                }
                mutex.unlock();
                bits.fetch_or(1 << i, Ordering::SeqCst);
            });
        }

        // Give the waiters time to park, then release the whole herd. The
        // flag is written under the mutex, so even a thread still between
        // its registration and the kernel cannot miss the wake.
        sleep_ms(300);
        mutex.lock();
        release.store(1, Ordering::SeqCst);
        condvar.wake_all();
        mutex.unlock();

        assert!(
            wait_until(Duration::from_secs(2), || {
                bits.load(Ordering::SeqCst) == u32::MAX
            }),
            "all 32 waiters must resume"
        );
    });

    assert_eq!(bits.load(Ordering::SeqCst), u32::MAX);
    assert_eq!(load_word(condvar.as_ptr()), 0);
    assert_eq!(load_word(mutex.as_ptr()), 0);
}

/// A timed wait with no signaler reports the timeout, re-holds the mutex,
/// and leaves no waiter registered.
#[test]
fn wait_timeout_expires_and_reacquires_mutex() {
    let mutex = Mutex::new();
    let condvar = Condvar::new();

    mutex.lock();

    let start = Instant::now();
    let timed_out = condvar.wait_timeout(&mutex, 200 * MS).unwrap();
    let elapsed = start.elapsed();

    assert!(timed_out);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(mutex.is_locked_by_current_thread());
    assert_eq!(load_word(condvar.as_ptr()), 0, "timed-out waiter deregisters");

    mutex.unlock();
    assert_eq!(load_word(mutex.as_ptr()), 0);
}

/// Waking with nobody parked has no observable effect and does not
/// accumulate: a later timed wait still runs its full timeout.
#[test]
fn wake_without_waiters_is_noop() {
    let mutex = Mutex::new();
    let condvar = Condvar::new();

    condvar.wake_one();
    condvar.wake_all();
    condvar.wake(7);
    assert_eq!(load_word(condvar.as_ptr()), 0);

    mutex.lock();
    let start = Instant::now();
    let timed_out = condvar.wait_timeout(&mutex, 100 * MS).unwrap();
    mutex.unlock();

    assert!(timed_out, "earlier wakes must not satisfy a later wait");
    assert!(start.elapsed() >= Duration::from_millis(100));
}

/// `wake(n)` releases at most `n` of the parked threads.
#[test]
fn wake_n_releases_at_most_n() {
    const WAITERS: u32 = 4;
    const FIRST_BATCH: u32 = 2;

    let mutex = Mutex::new();
    let condvar = Condvar::new();
    let release = AtomicU32::new(0);
    let resumed = AtomicU32::new(0);

    thread::scope(|s| {
        for _ in 0..WAITERS {
            s.spawn(|| {
                mutex.lock();
                // One wait per permitted resume; re-waits only when the
                // budget is exhausted.
                loop {
                    let budget = release.load(Ordering::SeqCst);
                    if budget > 0
                        && release
                            .compare_exchange(budget, budget - 1, Ordering::SeqCst, Ordering::SeqCst)
                            .is_ok()
                    {
                        break;
                    }
                    condvar.wait(&mutex).unwrap();
                }
                mutex.unlock();
                resumed.fetch_add(1, Ordering::SeqCst);
            });
        }

        sleep_ms(300);

        mutex.lock();
        release.store(FIRST_BATCH, Ordering::SeqCst);
        condvar.wake(FIRST_BATCH);
        mutex.unlock();

        assert!(
            wait_until(Duration::from_secs(2), || {
                resumed.load(Ordering::SeqCst) == FIRST_BATCH
            }),
            "the first batch must resume"
        );
        sleep_ms(100);
        assert_eq!(
            resumed.load(Ordering::SeqCst),
            FIRST_BATCH,
            "no more than {FIRST_BATCH} threads may resume"
        );

        mutex.lock();
        release.store(WAITERS - FIRST_BATCH, Ordering::SeqCst);
        condvar.wake_all();
        mutex.unlock();

        assert!(wait_until(Duration::from_secs(2), || {
            resumed.load(Ordering::SeqCst) == WAITERS
        }));
    });

    assert_eq!(load_word(condvar.as_ptr()), 0);
}

/// Two threads hand a counter back and forth: each increments on its parity
/// and wakes the other, for a fixed number of rounds.
#[test]
fn sequential_wait_signal_ping_pong() {
    const ROUNDS: i64 = 32;

    let mutex = Mutex::new();
    let condvar = Condvar::new();
    let turn = AtomicI64::new(0);

    thread::scope(|s| {
        for parity in 0..2i64 {
            let (mutex, condvar, turn) = (&mutex, &condvar, &turn);
            s.spawn(move || {
                loop {
                    mutex.lock();
                    while turn.load(Ordering::SeqCst) % 2 != parity
                        && turn.load(Ordering::SeqCst) < ROUNDS
                    {
                        condvar.wait(mutex).unwrap();
                    }
                    if turn.load(Ordering::SeqCst) >= ROUNDS {
                        mutex.unlock();
                        return;
                    }
                    turn.fetch_add(1, Ordering::SeqCst);
                    condvar.wake_all();
                    mutex.unlock();
                }
            });
        }
    });

    assert_eq!(turn.load(Ordering::SeqCst), ROUNDS);
    assert_eq!(load_word(condvar.as_ptr()), 0);
}
