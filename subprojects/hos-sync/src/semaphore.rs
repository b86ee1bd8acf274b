//! # Semaphore
//!
//! A semaphore is a synchronization primitive that maintains a count of available resources.
//! It allows threads to wait for and release resources in a thread-safe manner. The semaphore's
//! internal counter represents the number of available resources.

use core::cell::UnsafeCell;

use static_assertions::const_assert_eq;

use crate::{condvar::Condvar, mutex::Mutex};

/// A counting semaphore synchronization primitive.
///
/// The semaphore maintains an internal counter of available permits. Threads
/// can wait for a permit (decrementing the counter, blocking while it is
/// zero) or signal when they are done (incrementing the counter).
///
/// Zero-initialized state is a valid semaphore with no permits.
#[repr(C)]
pub struct Semaphore {
    /// Condition variable the waiters block on
    condvar: Condvar,
    /// Mutex protecting the counter
    mutex: Mutex,
    /// Number of available permits
    count: UnsafeCell<u64>,
}

// Ensure that the Semaphore object has a 16 bytes size, and is properly aligned
const_assert_eq!(size_of::<Semaphore>(), 16);
const_assert_eq!(align_of::<Semaphore>(), align_of::<u64>());

// SAFETY: The counter is only accessed under the internal mutex.
unsafe impl Send for Semaphore {}
unsafe impl Sync for Semaphore {}

impl Semaphore {
    /// Creates a new semaphore with the specified initial permit count.
    ///
    /// # Arguments
    /// * `count` - Initial value for the semaphore's counter, typically
    ///   representing the number of available resources.
    pub const fn new(count: u64) -> Self {
        Self {
            condvar: Condvar::new(),
            mutex: Mutex::new(),
            count: UnsafeCell::new(count),
        }
    }

    /// Signals the semaphore, incrementing its counter and waking one waiting thread.
    pub fn signal(&self) {
        self.mutex.lock();

        let count = self.count.get();
        unsafe { *count = (*count).checked_add(1).expect("semaphore count overflow") };
        self.condvar.wake_one();

        self.mutex.unlock();
    }

    /// Waits for the semaphore, decrementing its counter when a permit becomes available.
    ///
    /// This call will block while no permits are available.
    pub fn wait(&self) {
        self.mutex.lock();

        let count = self.count.get();
        while unsafe { *count } == 0 {
            let _ = self.condvar.wait(&self.mutex);
        }
        unsafe { *count = (*count).checked_sub(1).expect("semaphore count underflow") };

        self.mutex.unlock();
    }

    /// Attempts to acquire a permit without blocking.
    ///
    /// Returns `true` if a permit was acquired, `false` if none were available.
    pub fn try_wait(&self) -> bool {
        self.mutex.lock();

        let count = self.count.get();
        let acquired = unsafe { *count } > 0;
        if acquired {
            unsafe { *count = (*count).checked_sub(1).expect("semaphore count underflow") };
        }

        self.mutex.unlock();
        acquired
    }
}
