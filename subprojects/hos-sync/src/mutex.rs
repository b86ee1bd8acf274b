//! # Mutex
//!
//! A mutex is a synchronization primitive that can be used to protect shared
//! data from being simultaneously accessed by multiple threads.
//!
//! The whole lock is a single 32-bit word:
//!
//! - Bits 0–29 hold the owner's thread handle, or 0 when the mutex is free.
//! - Bit 30 ([`HANDLE_WAIT_MASK`]) is the _waiters bitflag_: set iff at
//!   least one thread is parked in the kernel arbiter on this address.
//! - Bit 31 is reserved kernel handle space.
//!
//! Uncontended transitions happen with plain compare-and-swaps; the kernel
//! arbiter is only entered once the waiters bit is set, and is the single
//! point where threads suspend. The owner field only changes under kernel
//! arbitration; the waiters bit is set speculatively by contenders and
//! cleared by the kernel on unlock.

use core::sync::atomic::{AtomicU32, Ordering::SeqCst};

use hos_svc::{
    debug::{BreakReason, break_event},
    raw::INVALID_HANDLE,
    sync::{HANDLE_WAIT_MASK, arbitrate_lock, arbitrate_unlock},
};
use hos_sys_thread::{Handle, current_thread_handle};
use static_assertions::const_assert_eq;

/// Mutex type.
///
/// A mutex is a synchronization primitive that can be used to protect shared
/// data from being simultaneously accessed by multiple threads.
///
/// The all-zero bit pattern is the unlocked state, so a `Mutex` can be a
/// zero-initialized global.
// NOTE: The in-memory representation of the Mutex must be u32 for FFI compatibility
#[repr(transparent)]
pub struct Mutex(AtomicU32);

// Ensure the in-memory size of the Mutex is the same as u32
const_assert_eq!(size_of::<Mutex>(), size_of::<u32>());

impl Mutex {
    /// Creates a new mutex.
    ///
    /// The mutex is initially unlocked.
    pub const fn new() -> Self {
        Self(AtomicU32::new(INVALID_HANDLE))
    }

    /// Returns a raw pointer to the underlying tag word.
    ///
    /// # Safety
    ///
    /// This function is intended for FFI and for handing the word to the
    /// kernel arbiter. The caller must ensure that:
    /// - The pointer is not used after the mutex is dropped
    /// - All accesses through the pointer are atomic
    pub fn as_ptr(&self) -> *mut u32 {
        self.0.as_ptr()
    }

    /// Locks the mutex, blocking until it is acquired.
    ///
    /// The fast path is a single compare-and-swap of `0 → own handle`. Under
    /// contention the slow path registers the thread as a waiter by setting
    /// the waiters bit and asks the kernel to arbitrate; the kernel may
    /// return without granting the lock (the owner changed in the meantime),
    /// in which case the loop retries.
    pub fn lock(&self) {
        let curr_thread_handle = current_thread_handle();

        loop {
            let state = MutexState::from_raw(self.0.load(SeqCst));

            match state {
                MutexState::Unlocked => {
                    // Try to acquire the mutex by storing the current thread's tag
                    if self
                        .0
                        .compare_exchange(INVALID_HANDLE, curr_thread_handle, SeqCst, SeqCst)
                        .is_ok()
                    {
                        return;
                    }
                }
                MutexState::Locked(mut tag) => {
                    // If the waiters bit is not set yet, we are the first
                    // contender and have to set it before entering the
                    // arbiter. The bit tells the kernel (and the unlocking
                    // thread) that the unlock must be arbitrated.
                    if !tag.has_waiters() {
                        let raw = tag.into_raw();
                        tag.set_waiters_bitflag();
                        if self
                            .0
                            .compare_exchange(raw, tag.into_raw(), SeqCst, SeqCst)
                            .is_err()
                        {
                            continue; // Tag changed under us; reload and retry
                        }
                    }

                    // Ask the kernel to arbitrate the lock for us. The kernel
                    // parks this thread only while the word still equals
                    // `owner | HANDLE_WAIT_MASK`; any other value makes the
                    // call return so the loop can re-examine the word.
                    unsafe {
                        if arbitrate_lock(tag.owner_handle(), self.as_ptr(), curr_thread_handle)
                            .is_err()
                        {
                            // This should never happen
                            break_event(BreakReason::Assert, 0, 0);
                        }
                    }

                    // Reload the tag and check whether the kernel handed the
                    // mutex to us.
                    let state = MutexState::from_raw(self.0.load(SeqCst));
                    if matches!(state, MutexState::Locked(tag) if tag.owner_handle() == curr_thread_handle)
                    {
                        return;
                    }
                }
            }
        }
    }

    /// Attempts to lock the mutex without waiting.
    ///
    /// Returns `true` if the mutex was successfully locked, `false` otherwise.
    pub fn try_lock(&self) -> bool {
        let curr_thread_handle = current_thread_handle();
        self.0
            .compare_exchange(INVALID_HANDLE, curr_thread_handle, SeqCst, SeqCst)
            .is_ok()
    }

    /// Unlocks the mutex.
    ///
    /// Must only be called by the thread that holds the lock. With no
    /// waiters the unlock is a single compare-and-swap back to zero; with
    /// the waiters bit set the kernel arbitrates the hand-off to the next
    /// waiter.
    pub fn unlock(&self) {
        let curr_thread_handle = current_thread_handle();

        loop {
            let state = MutexState::from_raw(self.0.load(SeqCst));

            match state {
                MutexState::Unlocked => return,
                MutexState::Locked(tag) => {
                    // Unlocking a mutex held by another thread is undefined;
                    // leave the word alone.
                    if tag.owner_handle() != curr_thread_handle {
                        return;
                    }

                    if tag.has_waiters() {
                        // The kernel clears the word or transfers ownership
                        // to the next waiter.
                        unsafe {
                            if arbitrate_unlock(self.as_ptr()).is_err() {
                                // This should never happen
                                break_event(BreakReason::Assert, 0, 0);
                            }
                        }
                        return;
                    }

                    if self
                        .0
                        .compare_exchange(tag.into_raw(), INVALID_HANDLE, SeqCst, SeqCst)
                        .is_ok()
                    {
                        return;
                    }
                    // A contender set the waiters bit between the load and
                    // the swap; reload and let the arbiter path handle it.
                }
            }
        }
    }

    /// Gets whether the mutex is locked by the current thread.
    pub fn is_locked_by_current_thread(&self) -> bool {
        let curr_thread_handle = current_thread_handle();
        let state = MutexState::from_raw(self.0.load(SeqCst));

        matches!(state, MutexState::Locked(tag) if tag.owner_handle() == curr_thread_handle)
    }
}

impl Default for Mutex {
    /// Creates a new mutex.
    ///
    /// The mutex is initially unlocked.
    fn default() -> Self {
        Self::new()
    }
}

/// Internal representation of the [MutexTag].
type RawMutexTag = u32;

/// Mutex state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutexState {
    /// Unlocked mutex.
    Unlocked,
    /// Locked mutex.
    Locked(MutexTag),
}

impl MutexState {
    /// Convert a raw mutex tag value into a mutex state.
    fn from_raw(value: RawMutexTag) -> Self {
        if value == INVALID_HANDLE {
            Self::Unlocked
        } else {
            Self::Locked(MutexTag(value))
        }
    }
}

/// Mutex tag
///
/// The mutex tag holds two pieces of information:
///
/// - **The owner's thread kernel handle.**
///   When locked, the mutex tag stores the owner's thread kernel handle. And when
///   unlocked, it is reset to `INVALID_HANDLE`.
/// - **The _waiters_ bitflag.**
///   The _waiters bit_ indicates to the kernel that there are other threads waiting for
///   the mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MutexTag(RawMutexTag);

impl MutexTag {
    /// Get the mutex owner handle.
    ///
    /// Returns the mutex owner's thread kernel handle with the _waiters bitflag_ cleared.
    fn owner_handle(&self) -> Handle {
        self.0 & !HANDLE_WAIT_MASK
    }

    /// Check if there is any other thread waiting for the mutex.
    ///
    /// Returns `true` if the _waiters bitflag_ is set, `false` otherwise.
    fn has_waiters(&self) -> bool {
        self.0 & HANDLE_WAIT_MASK != 0
    }

    /// Set the mutex tag's _waiters bitflag_.
    fn set_waiters_bitflag(&mut self) {
        self.0 |= HANDLE_WAIT_MASK;
    }

    /// Converts the tag back into its raw word value.
    fn into_raw(self) -> RawMutexTag {
        self.0
    }
}
