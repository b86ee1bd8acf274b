//! Host backend: a process-local stand-in for the kernel arbiter.
//!
//! The kernel side of the synchronization SVCs is a set of wait queues keyed
//! by the virtual address of a user-space word, plus the rule that every
//! suspension and every wake is linearized inside the kernel. This module
//! reproduces that shape with one process-wide lock over the queues and a
//! single condition variable the parked threads block on, so the user-space
//! protocol built on top behaves the same on development hosts as on the
//! real arbiter.
//!
//! Differences from the kernel, none of which the user-space contract may
//! rely on:
//!
//! - Waiters are released in FIFO order rather than by dynamic priority.
//! - A released thread resumes under the host scheduler's timing.

use core::sync::atomic::{AtomicU32, Ordering::SeqCst};
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Condvar, LazyLock, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::{
    error::{KernelError, ToRawResultCode},
    result::ResultCode,
    sync::HANDLE_WAIT_MASK,
};

use super::{BreakReason, Handle};

/// Successful raw result code.
const SUCCESS: ResultCode = 0;

/// Ticks per second of the emulated counter-timer (the Horizon value).
const TICK_FREQ_HZ: u64 = 19_200_000;

static ARBITER: LazyLock<Arbiter> = LazyLock::new(Arbiter::default);

static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);

#[derive(Default)]
struct Arbiter {
    state: Mutex<State>,
    /// Every queue transition notifies here; parked threads re-check their
    /// own entry. One condvar for all addresses keeps the locking trivial at
    /// the cost of spurious wake-ups, which the wait loops absorb.
    wakeups: Condvar,
}

#[derive(Default)]
struct State {
    /// Threads parked in [`arbitrate_lock`], keyed by mutex word address.
    lock_waiters: HashMap<usize, VecDeque<Handle>>,
    /// Mutex words whose ownership was just transferred; the granted thread
    /// clears its entry when it resumes.
    lock_grants: HashMap<usize, Handle>,
    /// Tickets parked in [`wait_for_address`], keyed by word address.
    addr_waiters: HashMap<usize, VecDeque<u64>>,
    /// Tickets released by [`signal_to_address`] whose threads have not
    /// resumed yet.
    released: HashSet<u64>,
    next_ticket: u64,
}

impl Arbiter {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Views a user-space word as an atomic.
///
/// # Safety
///
/// `ptr` must be a valid, 4-byte aligned pointer to a `u32` that is only
/// accessed atomically while the reference lives.
unsafe fn word<'a>(ptr: *mut u32) -> &'a AtomicU32 {
    unsafe { AtomicU32::from_ptr(ptr) }
}

/// Arbitrates a mutex lock operation.
///
/// Mirrors the kernel: if the word no longer holds
/// `owner_thread_handle | HANDLE_WAIT_MASK` the call returns immediately and
/// the caller retries its acquisition loop; otherwise the calling thread is
/// queued until an unlock transfers the word to it.
///
/// # Safety
///
/// `mutex` must point to a valid, 4-byte aligned `u32` that stays mapped
/// until the call returns.
pub unsafe fn arbitrate_lock(
    owner_thread_handle: Handle,
    mutex: *mut u32,
    curr_thread_handle: Handle,
) -> ResultCode {
    let arb = &*ARBITER;
    let mut state = arb.state();

    // The word load is linearized by the arbiter lock, exactly like the
    // kernel's check under its own spinlock.
    if unsafe { word(mutex) }.load(SeqCst) != owner_thread_handle | HANDLE_WAIT_MASK {
        return SUCCESS;
    }

    let addr = mutex as usize;
    state
        .lock_waiters
        .entry(addr)
        .or_default()
        .push_back(curr_thread_handle);

    loop {
        if state.lock_grants.get(&addr) == Some(&curr_thread_handle) {
            state.lock_grants.remove(&addr);
            return SUCCESS;
        }
        state = arb
            .wakeups
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// Arbitrates a mutex unlock operation.
///
/// Transfers the word to the next queued waiter (re-asserting the wait bit
/// when more remain), or clears it when the queue is empty.
///
/// # Safety
///
/// `mutex` must point to a valid, 4-byte aligned `u32`, and the calling
/// thread must own the mutex it encodes.
pub unsafe fn arbitrate_unlock(mutex: *mut u32) -> ResultCode {
    let arb = &*ARBITER;
    let mut state = arb.state();
    let st = &mut *state;

    let addr = mutex as usize;
    let tag = unsafe { word(mutex) };

    let next = st
        .lock_waiters
        .get_mut(&addr)
        .and_then(VecDeque::pop_front);
    match next {
        Some(next) => {
            // FIFO stands in for the kernel's priority order.
            let more_waiters = st.lock_waiters.get(&addr).is_some_and(|q| !q.is_empty());
            if !more_waiters {
                st.lock_waiters.remove(&addr);
            }
            let waiters_bit = if more_waiters { HANDLE_WAIT_MASK } else { 0 };
            tag.store(next | waiters_bit, SeqCst);
            st.lock_grants.insert(addr, next);
            arb.wakeups.notify_all();
        }
        None => {
            st.lock_waiters.remove(&addr);
            tag.store(0, SeqCst);
        }
    }

    SUCCESS
}

/// Waits on an address while it holds `expected`.
///
/// Returns immediately when the word already changed; otherwise parks the
/// thread until a signal releases it or the relative timeout expires.
/// `u64::MAX` waits forever.
///
/// # Safety
///
/// `addr` must point to a valid, 4-byte aligned `u32` that stays mapped for
/// the whole wait.
pub unsafe fn wait_for_address(addr: *mut u32, expected: u32, timeout_ns: u64) -> ResultCode {
    let arb = &*ARBITER;
    let mut state = arb.state();

    if unsafe { word(addr) }.load(SeqCst) != expected {
        return SUCCESS;
    }

    let key = addr as usize;
    let ticket = state.next_ticket;
    state.next_ticket += 1;
    state.addr_waiters.entry(key).or_default().push_back(ticket);

    // `u64::MAX` waits forever; so does a deadline the clock cannot express.
    let deadline = (timeout_ns != u64::MAX)
        .then(|| Instant::now().checked_add(Duration::from_nanos(timeout_ns)))
        .flatten();

    loop {
        if state.released.remove(&ticket) {
            return SUCCESS;
        }

        match deadline {
            None => {
                state = arb
                    .wakeups
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    // Deregister; the ticket can no longer be released.
                    if let Some(queue) = state.addr_waiters.get_mut(&key) {
                        queue.retain(|t| *t != ticket);
                        if queue.is_empty() {
                            state.addr_waiters.remove(&key);
                        }
                    }
                    return KernelError::TimedOut.to_rc();
                }
                state = arb
                    .wakeups
                    .wait_timeout(state, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        }
    }
}

/// Signals up to `count` threads waiting on `addr`.
///
/// In the signal-and-modify mode the word is decremented by the number of
/// waits the signal consumed. A waiter that has incremented the word but not
/// yet reached [`wait_for_address`] is consumed through the decrement
/// itself: its expected value no longer matches, so its wait returns
/// immediately. Clamping the decrement to the current word value keeps a
/// concurrent timed-out waiter (which backs its own increment out) from
/// driving the word negative.
///
/// # Safety
///
/// `addr` must point to a valid, 4-byte aligned `u32`.
pub unsafe fn signal_to_address(addr: *mut u32, mode: u32, count: u32) -> ResultCode {
    let arb = &*ARBITER;
    let mut state = arb.state();
    let st = &mut *state;

    let key = addr as usize;
    let mut parked = 0;
    if let Some(queue) = st.addr_waiters.get_mut(&key) {
        parked = (count as usize).min(queue.len());
        for _ in 0..parked {
            if let Some(ticket) = queue.pop_front() {
                st.released.insert(ticket);
            }
        }
        if queue.is_empty() {
            st.addr_waiters.remove(&key);
        }
    }

    if mode == super::SignalMode::SignalAndModify as u32 {
        let _ =
            unsafe { word(addr) }.fetch_update(SeqCst, SeqCst, |value| Some(value - count.min(value)));
    }

    if parked > 0 {
        arb.wakeups.notify_all();
    }

    SUCCESS
}

/// Sleeps the current thread; non-positive values are yield sentinels.
pub unsafe fn sleep_thread(nano: i64) {
    if nano > 0 {
        std::thread::sleep(Duration::from_nanos(nano as u64));
    } else {
        std::thread::yield_now();
    }
}

/// Gets the current system tick of the emulated 19.2 MHz counter-timer.
pub unsafe fn get_system_tick() -> u64 {
    let elapsed = EPOCH.elapsed().as_nanos() as u64;
    elapsed / 1_000_000_000 * TICK_FREQ_HZ + elapsed % 1_000_000_000 * TICK_FREQ_HZ / 1_000_000_000
}

/// Breaks execution: aborts the host process.
pub unsafe fn break_event(_reason: BreakReason, _addr: usize, _size: usize) -> ResultCode {
    std::process::abort()
}
