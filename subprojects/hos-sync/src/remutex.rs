//! # Reentrant Mutex
//!
//! A mutex that the same thread may lock multiple times. The lock is only
//! released once `unlock` has been called as many times as `lock`.
//!
//! ## Behavior
//!
//! A reentrant mutex operates on a per-thread basis: the owning thread can
//! re-acquire freely while other threads block until the owner has fully
//! released it. The owner is tracked next to the plain [`Mutex`] in a
//! tag/counter pair, so the zero bit pattern is a valid unlocked state.
//!
//! ## Misuse detection
//!
//! Unlocking from a thread that does not own the lock would release it out
//! from under the real owner, so it panics here instead of being left
//! undefined like the plain mutex. The depth counter saturates at zero for
//! the same reason.

use core::{cell::UnsafeCell, sync::atomic::{AtomicU32, Ordering::SeqCst}};

use hos_svc::raw::INVALID_HANDLE;
use hos_sys_thread::current_thread_handle;
use static_assertions::const_assert_eq;

use crate::mutex::Mutex;

/// A reentrant mutual exclusion primitive useful for protecting shared data.
#[repr(C)]
pub struct ReentrantMutex {
    mutex: Mutex,
    /// Owning thread's handle, or 0. Written by the thread that holds (or
    /// just acquired) `mutex`; read from anywhere for the owner check.
    thread_tag: AtomicU32,
    /// Lock depth. Only touched by the owning thread.
    counter: UnsafeCell<u32>,
}

// Keep the tag/counter pair word-sized next to the mutex word.
const_assert_eq!(size_of::<ReentrantMutex>(), 12);
const_assert_eq!(align_of::<ReentrantMutex>(), align_of::<u32>());

// SAFETY: The depth counter is only accessed by the thread named in
// `thread_tag`, which is atomic.
unsafe impl Send for ReentrantMutex {}
unsafe impl Sync for ReentrantMutex {}

impl ReentrantMutex {
    /// Creates a new `ReentrantMutex`.
    pub const fn new() -> Self {
        Self {
            mutex: Mutex::new(),
            thread_tag: AtomicU32::new(INVALID_HANDLE),
            counter: UnsafeCell::new(0),
        }
    }

    /// Locks the reentrant mutex.
    ///
    /// If the mutex is already locked by the current thread, the lock count is incremented.
    /// If the mutex is locked by another thread, this function will block until the mutex is released.
    pub fn lock(&self) {
        let curr_thread_handle = current_thread_handle();

        if self.thread_tag.load(SeqCst) != curr_thread_handle {
            self.mutex.lock();
            self.thread_tag.store(curr_thread_handle, SeqCst);
        }
        unsafe { *self.counter.get() += 1 };
    }

    /// Attempts to lock the reentrant mutex.
    ///
    /// If the mutex is already locked by the current thread, the lock count is incremented and `true` is returned.
    /// If the mutex is locked by another thread, this function returns `false` immediately.
    /// If the mutex is unlocked, it becomes locked by the current thread, and `true` is returned.
    pub fn try_lock(&self) -> bool {
        let curr_thread_handle = current_thread_handle();

        if self.thread_tag.load(SeqCst) != curr_thread_handle {
            if !self.mutex.try_lock() {
                return false;
            }
            self.thread_tag.store(curr_thread_handle, SeqCst);
        }
        unsafe { *self.counter.get() += 1 };
        true
    }

    /// Unlocks the reentrant mutex.
    ///
    /// The mutex is only released when the lock count reaches zero.
    ///
    /// # Panics
    ///
    /// This function will panic if it is called by a thread that has not locked the mutex.
    pub fn unlock(&self) {
        let curr_thread_handle = current_thread_handle();

        if self.thread_tag.load(SeqCst) != curr_thread_handle {
            // Releasing another thread's lock would unlock it prematurely.
            panic!("thread attempted to unlock a reentrant mutex it does not own");
        }

        let counter = self.counter.get();
        unsafe { *counter = (*counter).saturating_sub(1) };
        if unsafe { *counter } == 0 {
            self.thread_tag.store(INVALID_HANDLE, SeqCst);
            self.mutex.unlock();
        }
    }
}

impl Default for ReentrantMutex {
    fn default() -> Self {
        Self::new()
    }
}
