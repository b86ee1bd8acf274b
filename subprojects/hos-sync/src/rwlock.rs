//! # Read-Write Lock
//!
//! A read/write lock synchronization primitive that allows multiple readers or a single writer.
//!
//! The lock is composed from an internal mutex and two condition variables.
//! The internal mutex is only held transiently — every operation acquires it,
//! updates the bookkeeping, and releases it before returning — so the
//! blocking states live entirely in the condition variables: readers park on
//! one, writers on the other.
//!
//! The thread holding the write lock may take further read and write locks
//! without blocking ("read promotion"): all of its nested acquisitions are
//! accounted in a single depth counter together with the base write lock, so
//! the matching unlocks may arrive in any order. Whichever unlock drives the
//! depth to zero releases the lock.
//!
//! Fairness: new readers are held back whenever a writer is queued, which
//! keeps a steady stream of readers from starving writers. Among writers the
//! wake order is whatever the kernel arbiter picks; nothing stronger is
//! guaranteed.

use core::{
    cell::UnsafeCell,
    sync::atomic::{AtomicU32, Ordering::SeqCst},
};

use hos_svc::raw::INVALID_HANDLE;
use hos_sys_thread::{Handle, current_thread_handle};
use static_assertions::const_assert_eq;

use crate::{condvar::Condvar, mutex::Mutex};

/// Read/write lock structure that allows multiple readers or a single writer.
///
/// Zero-initialized state is a valid unlocked lock.
#[repr(C)]
pub struct RwLock {
    mutex: Mutex,
    condvar_reader_wait: Condvar,
    condvar_writer_wait: Condvar,
    /// Active readers. Guarded by `mutex`.
    read_lock_count: UnsafeCell<u32>,
    /// Writers parked on `condvar_writer_wait`. Guarded by `mutex`.
    write_waiter_count: UnsafeCell<u32>,
    /// Write-lock depth: the base write lock plus every nested read or write
    /// acquisition by the write-holder. Accessed by the write-holder fast
    /// paths without taking `mutex`, so every access is atomic.
    write_lock_count: AtomicU32,
    /// Owning writer's thread handle, or 0. Written under `mutex`; read from
    /// anywhere (atomically) for the write-holder fast paths.
    write_owner_tag: WriteOwnerTag,
}

// Ensure the struct keeps its C layout: 4 words of state after the three
// one-word primitives.
const_assert_eq!(size_of::<RwLock>(), 28);
const_assert_eq!(align_of::<RwLock>(), align_of::<u32>());

// SAFETY: The plain counters are guarded by the internal mutex; the owner
// tag and the write-lock depth are atomic.
unsafe impl Send for RwLock {}
unsafe impl Sync for RwLock {}

impl RwLock {
    /// Creates a new [`RwLock`] in an unlocked state.
    ///
    /// The lock is initialized with no readers or writers, and can be immediately used
    /// for synchronization.
    pub const fn new() -> Self {
        Self {
            mutex: Mutex::new(),
            condvar_reader_wait: Condvar::new(),
            condvar_writer_wait: Condvar::new(),
            read_lock_count: UnsafeCell::new(0),
            write_waiter_count: UnsafeCell::new(0),
            write_lock_count: AtomicU32::new(0),
            write_owner_tag: WriteOwnerTag::new(),
        }
    }

    /// Locks the [`RwLock`] for reading.
    ///
    /// Multiple threads can acquire the read lock simultaneously as long as there is no writer.
    /// If the current thread already holds the write lock, it can also acquire read locks
    /// without blocking.
    ///
    /// This call will block if:
    /// - Another thread holds the write lock
    /// - There are waiting writers (to prevent writer starvation)
    pub fn read_lock(&self) {
        let curr_thread_handle = current_thread_handle();

        // If the current thread already holds the write lock, the read rides
        // on the write depth without blocking.
        if self.write_owner_tag == curr_thread_handle {
            self.write_lock_count.fetch_add(1, SeqCst);
            return;
        }

        self.mutex.lock();

        // Readers are admitted only while no writer holds the lock and none
        // is queued.
        while self.write_owner_tag.get() != INVALID_HANDLE || unsafe { *self.write_waiter_count.get() } > 0
        {
            let _ = self.condvar_reader_wait.wait(&self.mutex);
        }

        unsafe { *self.read_lock_count.get() += 1 };

        self.mutex.unlock();
    }

    /// Attempts to lock the [`RwLock`] for reading without waiting.
    ///
    /// This method will never block. If the lock cannot be acquired immediately,
    /// it returns `false`.
    ///
    /// # Returns
    ///
    /// * `true` if the lock was acquired successfully:
    ///   - No other thread holds the write lock
    ///   - No writers are waiting
    ///   - The current thread holds the write lock
    /// * `false` if there was contention
    pub fn try_read_lock(&self) -> bool {
        let curr_thread_handle = current_thread_handle();

        // Write-holder fast path, as in `read_lock`.
        if self.write_owner_tag == curr_thread_handle {
            self.write_lock_count.fetch_add(1, SeqCst);
            return true;
        }

        if !self.mutex.try_lock() {
            return false;
        }

        let got_lock = self.write_owner_tag.get() == INVALID_HANDLE
            && unsafe { *self.write_waiter_count.get() } == 0;
        if got_lock {
            unsafe { *self.read_lock_count.get() += 1 };
        }

        self.mutex.unlock();

        got_lock
    }

    /// Unlocks the [`RwLock`] for reading.
    ///
    /// This method must only be called by a thread that currently holds a read lock.
    /// If this is the last read lock and there are waiting writers, one of them will
    /// be woken up.
    pub fn read_unlock(&self) {
        let curr_thread_handle = current_thread_handle();

        if self.write_owner_tag == curr_thread_handle {
            // Promoted read: peel one acquisition off the write depth. The
            // matching unlocks of a write-holder may arrive in any order, so
            // this unlock releases the whole lock when it is the last one.
            if self.write_lock_count.fetch_sub(1, SeqCst) == 1 {
                self.release_write_ownership();
            }
            return;
        }

        self.mutex.lock();

        unsafe { *self.read_lock_count.get() -= 1 };

        // The last reader out hands the lock to a queued writer.
        if unsafe { *self.read_lock_count.get() } == 0 && unsafe { *self.write_waiter_count.get() } > 0
        {
            self.condvar_writer_wait.wake_one();
        }

        self.mutex.unlock();
    }

    /// Locks the [`RwLock`] for writing.
    ///
    /// Only one thread can acquire the write lock at a time, and no readers can acquire
    /// the lock while a writer holds it. If the current thread already holds the write lock,
    /// the write count is incremented without blocking.
    ///
    /// This call will block if:
    /// - Other threads hold read locks
    /// - Another thread holds the write lock
    pub fn write_lock(&self) {
        let curr_thread_handle = current_thread_handle();

        // Reentrant write acquisition by the current owner.
        if self.write_owner_tag == curr_thread_handle {
            self.write_lock_count.fetch_add(1, SeqCst);
            return;
        }

        self.mutex.lock();

        unsafe { *self.write_waiter_count.get() += 1 };
        while self.write_owner_tag.get() != INVALID_HANDLE || unsafe { *self.read_lock_count.get() } > 0
        {
            let _ = self.condvar_writer_wait.wait(&self.mutex);
        }
        unsafe { *self.write_waiter_count.get() -= 1 };

        self.write_owner_tag.set(curr_thread_handle);
        self.write_lock_count.store(1, SeqCst);

        self.mutex.unlock();
    }

    /// Attempts to lock the [`RwLock`] for writing without waiting.
    ///
    /// This method will never block. If the lock cannot be acquired immediately,
    /// it returns `false`.
    ///
    /// # Returns
    ///
    /// * `true` if the lock was acquired successfully:
    ///   - No other thread holds read locks or the write lock
    ///   - The current thread already holds the write lock
    /// * `false` if there was contention
    pub fn try_write_lock(&self) -> bool {
        let curr_thread_handle = current_thread_handle();

        // Reentrant write acquisition by the current owner.
        if self.write_owner_tag == curr_thread_handle {
            self.write_lock_count.fetch_add(1, SeqCst);
            return true;
        }

        if !self.mutex.try_lock() {
            return false;
        }

        let got_lock = self.write_owner_tag.get() == INVALID_HANDLE
            && unsafe { *self.read_lock_count.get() } == 0;
        if got_lock {
            self.write_owner_tag.set(curr_thread_handle);
            self.write_lock_count.store(1, SeqCst);
        }

        self.mutex.unlock();

        got_lock
    }

    /// Unlocks the [`RwLock`] for writing.
    ///
    /// This method must only be called by a thread that currently holds the write lock.
    /// When the last write lock is released, waiting writers are given priority over
    /// waiting readers to prevent writer starvation.
    pub fn write_unlock(&self) {
        // NOTE: This function assumes the write lock is held, i.e.
        //       `write_owner_tag` names the current thread.
        if self.write_lock_count.fetch_sub(1, SeqCst) == 1 {
            self.release_write_ownership();
        }
    }

    /// Checks if the write lock is held by the current thread.
    ///
    /// # Returns
    ///
    /// * `true` if the current thread holds the write lock
    /// * `false` if it does not hold the write lock or only holds read locks
    pub fn is_write_lock_held_by_current_thread(&self) -> bool {
        self.write_owner_tag == current_thread_handle()
            && self.write_lock_count.load(SeqCst) > 0
    }

    /// Checks if the [`RwLock`] is owned by the current thread.
    ///
    /// A thread owns the lock if it holds the write lock or if it holds read locks
    /// that were acquired while it held the write lock.
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.write_owner_tag == current_thread_handle()
    }

    /// Clears write ownership and hands the lock over: a queued writer first,
    /// otherwise every queued reader.
    fn release_write_ownership(&self) {
        self.mutex.lock();

        self.write_owner_tag.clear();

        if unsafe { *self.write_waiter_count.get() } > 0 {
            self.condvar_writer_wait.wake_one();
        } else {
            self.condvar_reader_wait.wake_all();
        }

        self.mutex.unlock();
    }
}

impl Default for RwLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag used to identify the owner of the write lock.
///
/// Written while holding the internal mutex; read atomically from anywhere
/// for the write-holder fast paths.
#[repr(transparent)]
struct WriteOwnerTag(AtomicU32);

impl WriteOwnerTag {
    /// Creates a new [`WriteOwnerTag`] not associated with any handle.
    const fn new() -> Self {
        Self(AtomicU32::new(INVALID_HANDLE))
    }

    fn get(&self) -> Handle {
        self.0.load(SeqCst)
    }

    fn set(&self, handle: Handle) {
        self.0.store(handle, SeqCst);
    }

    fn clear(&self) {
        self.0.store(INVALID_HANDLE, SeqCst);
    }
}

impl PartialEq<Handle> for WriteOwnerTag {
    fn eq(&self, other: &Handle) -> bool {
        self.get() == *other
    }
}
