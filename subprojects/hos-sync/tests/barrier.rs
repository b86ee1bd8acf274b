//! Barrier integration tests.

mod common;

use core::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use common::sleep_ms;
use hos_sync::Barrier;

/// Four staggered parties over two rounds: nobody enters round two before
/// everyone finished round one.
#[test]
fn four_parties_two_rounds() {
    const PARTIES: u32 = 4;

    let barrier = Barrier::new(PARTIES as u64);
    let phase_one_done = AtomicU32::new(0);
    let phase_two_done = AtomicU32::new(0);

    thread::scope(|s| {
        for i in 0..PARTIES {
            let (barrier, phase_one_done, phase_two_done) =
                (&barrier, &phase_one_done, &phase_two_done);
            s.spawn(move || {
                // Staggered arrivals: the last party shows up 150 ms after
                // the first.
                sleep_ms(u64::from(i) * 50);
                phase_one_done.fetch_add(1, Ordering::SeqCst);
                barrier.wait();

                // The whole round must be in before anyone proceeds.
                assert_eq!(phase_one_done.load(Ordering::SeqCst), PARTIES);

                sleep_ms(u64::from(PARTIES - i) * 50);
                phase_two_done.fetch_add(1, Ordering::SeqCst);
                barrier.wait();

                assert_eq!(phase_two_done.load(Ordering::SeqCst), PARTIES);
            });
        }
    });

    assert_eq!(phase_one_done.load(Ordering::SeqCst), PARTIES);
    assert_eq!(phase_two_done.load(Ordering::SeqCst), PARTIES);
}

/// A two-party barrier stays reusable over many rounds; the release resets
/// the arrival count so rounds cannot bleed into each other.
#[test]
fn two_parties_many_rounds() {
    const ROUNDS: u32 = 50;

    let barrier = Barrier::new(2);
    let rounds_a = AtomicU32::new(0);
    let rounds_b = AtomicU32::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..ROUNDS {
                rounds_a.fetch_add(1, Ordering::SeqCst);
                barrier.wait();
                // The peer is never more than one round behind or ahead.
                let b = rounds_b.load(Ordering::SeqCst);
                assert!(b >= i && b <= i + 2);
            }
        });
        s.spawn(|| {
            for _ in 0..ROUNDS {
                rounds_b.fetch_add(1, Ordering::SeqCst);
                barrier.wait();
            }
        });
    });

    assert_eq!(rounds_a.load(Ordering::SeqCst), ROUNDS);
    assert_eq!(rounds_b.load(Ordering::SeqCst), ROUNDS);
}

/// A single-party barrier never blocks.
#[test]
fn single_party_passes_through() {
    let barrier = Barrier::new(1);
    for _ in 0..10 {
        barrier.wait();
    }
}
