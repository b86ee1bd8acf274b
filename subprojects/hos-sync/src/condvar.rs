//! Condition Variable
//!
//! A condition variable is a synchronization primitive that enables threads to wait
//! until a particular condition occurs. Condition variables are used in conjunction
//! with mutexes to handle situations where a thread needs to wait for some condition
//! that depends on other threads.
//!
//! The condition variable is a single 32-bit word counting the threads
//! currently waiting on it; the word doubles as the kernel wait address. A
//! waiter increments the counter while still holding the paired mutex, then
//! releases the mutex and parks on the word while it still holds the
//! incremented value. Because the increment is published before the mutex is
//! released, any thread that acquires the mutex afterwards sees the waiter
//! and its wake is guaranteed to reach it — even if the waiter has not
//! finished registering with the kernel yet (the wake's counter decrement
//! invalidates the parked value and the wait returns immediately).

use core::sync::atomic::{AtomicU32, Ordering::SeqCst};

use hos_svc::{
    error::ToRawResultCode,
    result::Error,
    sync::{SignalMode, WaitForAddressError, signal_to_address, wait_for_address},
};
use static_assertions::const_assert_eq;

use crate::mutex::Mutex;

/// Timeout value used for waits that never expire.
const NO_TIMEOUT: u64 = u64::MAX;

/// A condition variable primitive for thread synchronization.
///
/// Condition variables are used in conjunction with mutexes to allow threads to wait
/// until a particular condition occurs.
///
/// The all-zero bit pattern means "no waiters", so a `Condvar` can be a
/// zero-initialized global.
// NOTE: The in-memory representation of the Condvar must be u32 for FFI compatibility
#[repr(transparent)]
pub struct Condvar(AtomicU32);

// Ensure the in-memory size of the Condvar is the same as u32
const_assert_eq!(size_of::<Condvar>(), size_of::<u32>());

impl Condvar {
    /// Creates a new condition variable with no waiters.
    pub const fn new() -> Self {
        Condvar(AtomicU32::new(0))
    }

    /// Returns a raw pointer to the underlying counter word.
    ///
    /// # Safety
    ///
    /// This function is intended for FFI and for handing the word to the
    /// kernel arbiter. The caller must ensure that:
    /// - The pointer is not used after the condition variable is dropped
    /// - All accesses through the pointer are atomic
    pub fn as_ptr(&self) -> *mut u32 {
        self.0.as_ptr()
    }

    /// Waits on the condition variable until notified or the timeout expires.
    ///
    /// Atomically registers the calling thread as a waiter, releases the
    /// mutex, and suspends the thread until either another thread calls
    /// [`wake`](Self::wake) (or one of its shorthands) or `timeout_ns`
    /// relative nanoseconds elapse.
    ///
    /// When the function returns, the mutex is re-acquired — also on timeout
    /// and error. Spurious wake-ups are possible; callers must re-check
    /// their predicate in a loop regardless of the return value.
    ///
    /// # Arguments
    /// * `mutex` - The mutex protecting the condition. Must be held by the
    ///   calling thread.
    /// * `timeout_ns` - Maximum time to wait in nanoseconds; `u64::MAX`
    ///   waits forever.
    ///
    /// # Returns
    /// * `Ok(true)` if the wait timed out
    /// * `Ok(false)` if the thread was woken (possibly spuriously)
    /// * `Err(_)` with the raw kernel code for any other arbiter failure
    pub fn wait_timeout(&self, mutex: &Mutex, timeout_ns: u64) -> Result<bool, Error> {
        // Register as a waiter while the mutex is still held; the new
        // counter value is the value we park on.
        let waiters = self.0.fetch_add(1, SeqCst) + 1;

        // Release the mutex. This may arbitrate the hand-off to a waiter of
        // the mutex itself.
        mutex.unlock();

        let result = unsafe { wait_for_address(self.as_ptr(), waiters, timeout_ns) };

        if let Err(WaitForAddressError::TimedOut) = result {
            // Back our registration out; wakes only account for waits they
            // actually consumed. A concurrent signal may have consumed ours
            // through its counter decrement already, in which case the word
            // is back at zero and there is nothing to undo.
            let _ = self.0.fetch_update(SeqCst, SeqCst, |v| v.checked_sub(1));
        }

        // Re-acquire unconditionally before reporting the outcome.
        mutex.lock();

        match result {
            Ok(()) => Ok(false),
            Err(WaitForAddressError::TimedOut) => Ok(true),
            Err(err) => Err(Error::from_raw(err.to_rc())),
        }
    }

    /// Waits on the condition variable indefinitely until notified.
    ///
    /// Equivalent to [`wait_timeout`](Self::wait_timeout) with an infinite
    /// timeout. When the function returns, the mutex is re-acquired.
    #[inline]
    pub fn wait(&self, mutex: &Mutex) -> Result<(), Error> {
        self.wait_timeout(mutex, NO_TIMEOUT).map(|_| ())
    }

    /// Wakes up to `count` threads waiting on the condition variable.
    ///
    /// The wake is clamped to the current waiter count; with no waiters the
    /// call is a no-op and does not accumulate. The kernel decrements the
    /// counter word by the number of waits the signal consumed.
    pub fn wake(&self, count: u32) {
        let waiters = self.0.load(SeqCst);
        let count = count.min(waiters);
        if count == 0 {
            return;
        }

        let _ = unsafe { signal_to_address(self.as_ptr(), SignalMode::SignalAndModify, count) };
    }

    /// Wakes up a single thread waiting on the condition variable.
    #[inline]
    pub fn wake_one(&self) {
        self.wake(1);
    }

    /// Wakes up all threads waiting on the condition variable.
    #[inline]
    pub fn wake_all(&self) {
        self.wake(u32::MAX);
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}
