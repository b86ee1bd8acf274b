//! C FFI bindings for the `hos-sync` primitives.
//!
//! Every operation of the Rust API is exported as a `__hos_sync_*` symbol
//! operating on a raw pointer to the primitive. All primitives are
//! POD-initializable, so the `*_init` functions simply write the fresh
//! state; a zero-filled allocation is equally valid without any init call.

use hos_svc::{
    error::{KernelError, ToRawResultCode},
    result::ResultCode,
};

use crate::{
    barrier::Barrier, condvar::Condvar, mutex::Mutex, remutex::ReentrantMutex, rwlock::RwLock,
    semaphore::Semaphore,
};

//
// Mutex
//

/// Initializes a mutex.
///
/// # Safety
///
/// `mutex` must point to valid, writable memory for a [`Mutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_mutex_init(mutex: *mut Mutex) {
    unsafe { mutex.write(Mutex::new()) };
}

/// Locks the mutex.
///
/// # Safety
///
/// `mutex` must point to a valid, initialized [`Mutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_mutex_lock(mutex: *mut Mutex) {
    unsafe { &*mutex }.lock();
}

/// Attempts to lock the mutex without waiting.
///
/// Returns `true` if the mutex was acquired, `false` on contention.
///
/// # Safety
///
/// `mutex` must point to a valid, initialized [`Mutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_mutex_try_lock(mutex: *mut Mutex) -> bool {
    unsafe { &*mutex }.try_lock()
}

/// Unlocks the mutex.
///
/// # Safety
///
/// `mutex` must point to a valid, initialized [`Mutex`] held by the current
/// thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_mutex_unlock(mutex: *mut Mutex) {
    unsafe { &*mutex }.unlock();
}

/// Gets whether the mutex is locked by the current thread.
///
/// # Safety
///
/// `mutex` must point to a valid, initialized [`Mutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_mutex_is_locked_by_current_thread(mutex: *mut Mutex) -> bool {
    unsafe { &*mutex }.is_locked_by_current_thread()
}

//
// Condition variable
//

/// Initializes a condition variable.
///
/// # Safety
///
/// `condvar` must point to valid, writable memory for a [`Condvar`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_condvar_init(condvar: *mut Condvar) {
    unsafe { condvar.write(Condvar::new()) };
}

/// Waits on a condition variable with a timeout.
///
/// On return, regardless of the reason, the mutex is re-acquired.
///
/// # Returns
///
/// * `0` on successful wait and wake
/// * The timed-out result code if the timeout expired
/// * Another result code for any other arbiter failure
///
/// # Safety
///
/// `condvar` and `mutex` must point to valid, initialized primitives, and
/// the current thread must hold the mutex.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_condvar_wait_timeout(
    condvar: *mut Condvar,
    mutex: *mut Mutex,
    timeout_ns: u64,
) -> ResultCode {
    let mutex = unsafe { &*mutex };
    match unsafe { &*condvar }.wait_timeout(mutex, timeout_ns) {
        Ok(false) => 0,
        Ok(true) => KernelError::TimedOut.to_rc(),
        Err(err) => err.to_raw(),
    }
}

/// Waits on a condition variable indefinitely.
///
/// On return, the mutex is re-acquired.
///
/// # Safety
///
/// `condvar` and `mutex` must point to valid, initialized primitives, and
/// the current thread must hold the mutex.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_condvar_wait(
    condvar: *mut Condvar,
    mutex: *mut Mutex,
) -> ResultCode {
    let mutex = unsafe { &*mutex };
    match unsafe { &*condvar }.wait(mutex) {
        Ok(()) => 0,
        Err(err) => err.to_raw(),
    }
}

/// Wakes up to `count` threads waiting on a condition variable.
///
/// # Safety
///
/// `condvar` must point to a valid, initialized [`Condvar`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_condvar_wake(condvar: *mut Condvar, count: u32) {
    unsafe { &*condvar }.wake(count);
}

/// Wakes up a single thread waiting on a condition variable.
///
/// # Safety
///
/// `condvar` must point to a valid, initialized [`Condvar`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_condvar_wake_one(condvar: *mut Condvar) {
    unsafe { &*condvar }.wake_one();
}

/// Wakes up all threads waiting on a condition variable.
///
/// # Safety
///
/// `condvar` must point to a valid, initialized [`Condvar`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_condvar_wake_all(condvar: *mut Condvar) {
    unsafe { &*condvar }.wake_all();
}

//
// Semaphore
//

/// Initializes a semaphore with an initial permit count.
///
/// # Safety
///
/// `sem` must point to valid, writable memory for a [`Semaphore`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_semaphore_init(sem: *mut Semaphore, count: u64) {
    unsafe { sem.write(Semaphore::new(count)) };
}

/// Increments the semaphore's counter and wakes one waiting thread.
///
/// # Safety
///
/// `sem` must point to a valid, initialized [`Semaphore`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_semaphore_signal(sem: *mut Semaphore) {
    unsafe { &*sem }.signal();
}

/// Decrements the semaphore's counter, blocking while no permits are available.
///
/// # Safety
///
/// `sem` must point to a valid, initialized [`Semaphore`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_semaphore_wait(sem: *mut Semaphore) {
    unsafe { &*sem }.wait();
}

/// Attempts to decrement the semaphore's counter without blocking.
///
/// # Safety
///
/// `sem` must point to a valid, initialized [`Semaphore`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_semaphore_try_wait(sem: *mut Semaphore) -> bool {
    unsafe { &*sem }.try_wait()
}

//
// Barrier
//

/// Initializes a barrier for `total` parties.
///
/// # Safety
///
/// `bar` must point to valid, writable memory for a [`Barrier`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_barrier_init(bar: *mut Barrier, total: u64) {
    unsafe { bar.write(Barrier::new(total)) };
}

/// Blocks until all parties of the current round have arrived.
///
/// # Safety
///
/// `bar` must point to a valid, initialized [`Barrier`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_barrier_wait(bar: *mut Barrier) {
    unsafe { &*bar }.wait();
}

//
// Read/write lock
//

/// Initializes a read/write lock.
///
/// # Safety
///
/// `rw` must point to valid, writable memory for a [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_init(rw: *mut RwLock) {
    unsafe { rw.write(RwLock::new()) };
}

/// Locks the read/write lock for reading.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_read_lock(rw: *mut RwLock) {
    unsafe { &*rw }.read_lock();
}

/// Attempts to lock the read/write lock for reading without waiting.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_try_read_lock(rw: *mut RwLock) -> bool {
    unsafe { &*rw }.try_read_lock()
}

/// Unlocks the read/write lock for reading.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`] on which the current
/// thread holds a read lock.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_read_unlock(rw: *mut RwLock) {
    unsafe { &*rw }.read_unlock();
}

/// Locks the read/write lock for writing.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_write_lock(rw: *mut RwLock) {
    unsafe { &*rw }.write_lock();
}

/// Attempts to lock the read/write lock for writing without waiting.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_try_write_lock(rw: *mut RwLock) -> bool {
    unsafe { &*rw }.try_write_lock()
}

/// Unlocks the read/write lock for writing.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`] whose write lock the
/// current thread holds.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_write_unlock(rw: *mut RwLock) {
    unsafe { &*rw }.write_unlock();
}

/// Checks if the write lock is held by the current thread.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_is_write_lock_held_by_current_thread(
    rw: *mut RwLock,
) -> bool {
    unsafe { &*rw }.is_write_lock_held_by_current_thread()
}

/// Checks if the read/write lock is owned by the current thread.
///
/// # Safety
///
/// `rw` must point to a valid, initialized [`RwLock`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_rwlock_is_owned_by_current_thread(rw: *mut RwLock) -> bool {
    unsafe { &*rw }.is_owned_by_current_thread()
}

//
// Reentrant mutex
//

/// Initializes a reentrant mutex.
///
/// # Safety
///
/// `rmutex` must point to valid, writable memory for a [`ReentrantMutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_remutex_init(rmutex: *mut ReentrantMutex) {
    unsafe { rmutex.write(ReentrantMutex::new()) };
}

/// Locks the reentrant mutex.
///
/// # Safety
///
/// `rmutex` must point to a valid, initialized [`ReentrantMutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_remutex_lock(rmutex: *mut ReentrantMutex) {
    unsafe { &*rmutex }.lock();
}

/// Attempts to lock the reentrant mutex without waiting.
///
/// # Safety
///
/// `rmutex` must point to a valid, initialized [`ReentrantMutex`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_remutex_try_lock(rmutex: *mut ReentrantMutex) -> bool {
    unsafe { &*rmutex }.try_lock()
}

/// Unlocks the reentrant mutex.
///
/// # Safety
///
/// `rmutex` must point to a valid, initialized [`ReentrantMutex`] owned by
/// the current thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __hos_sync_remutex_unlock(rmutex: *mut ReentrantMutex) {
    unsafe { &*rmutex }.unlock();
}
