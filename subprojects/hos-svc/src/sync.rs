//! Synchronization primitives
//!
//! Safe wrappers over the four arbiter SVCs the user-space primitives are
//! built on. Each wrapper decodes the result codes its syscall is known to
//! produce and funnels everything else into an opaque `Unknown` variant that
//! still carries the raw 32-bit code.

use crate::{
    error::{KernelError as KError, ResultCode, ToRawResultCode},
    raw::{self, Handle},
    result::{Error, Result, raw::Result as RawResult},
};

pub use crate::raw::SignalMode;

/// Bitmask for the _waiters bitflag_ in mutex raw tag values.
///
/// When set in a mutex raw tag value, indicates that there are threads waiting to acquire the mutex.
/// The mutex raw tag value is expected to be `owner_thread_handle | HANDLE_WAIT_MASK` when threads
/// are waiting.
pub const HANDLE_WAIT_MASK: u32 = 0x40000000;

/// Arbitrates a mutex lock operation in userspace
///
/// Attempts to acquire a mutex by arbitrating the lock with the owner thread.
///
/// # Arguments
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _owner_thread_handle_ | The owner thread's kernel handle. Must be a valid thread handle. |
/// | IN | _mutex_ | Pointer to the mutex raw tag value in userspace memory. The mutex raw tag value must be `owner_thread_handle | [`HANDLE_WAIT_MASK`]`. |
/// | IN | _curr_thread_handle_ | The current thread's kernel handle requesting the lock. |
///
/// # Behavior
/// The kernel will:
/// 1. Validate the current thread's state and memory access
/// 2. Check if the mutex value matches the expected pattern (`owner_thread_handle | HANDLE_WAIT_MASK`);
///    if not, return immediately so the caller can retry its acquisition loop
/// 3. If matched, add the current thread to the owner's mutex waiter list
/// 4. Pause current thread execution until the mutex is released
/// 5. On wake-up, the mutex word holds the current thread's handle (with the
///    wait bit re-asserted when more waiters remain)
///
/// # Notes
/// - This is a blocking operation that will pause the current thread if the mutex is held.
/// - The caller is responsible for having set the wait bit with a compare-and-swap beforehand.
///
/// # Safety
/// The caller **must uphold** *all* of the following invariants:
/// 1. `mutex` must point to a 4-byte aligned, readable **and writable** `u32` that is mapped in
///    the caller's address space for the whole duration of the call **and** until the mutex is
///    subsequently unlocked.
/// 2. `owner_thread_handle` and `curr_thread_handle` are valid thread handles belonging to the
///    same process.
/// 3. No safe-Rust mutable aliasing of the memory behind `mutex` may happen while the kernel is
///    arbitrating the lock.
///
/// Violating any of these requirements results in **undefined behaviour**.
pub unsafe fn arbitrate_lock(
    owner_thread_handle: Handle,
    mutex: *mut u32,
    curr_thread_handle: Handle,
) -> Result<(), ArbitrateLockError> {
    let rc = unsafe { raw::arbitrate_lock(owner_thread_handle, mutex, curr_thread_handle) };
    RawResult::from_raw(rc).map((), |rc| match rc.description() {
        desc if KError::InvalidHandle == desc => ArbitrateLockError::InvalidHandle,
        desc if KError::InvalidAddress == desc => ArbitrateLockError::InvalidMemState,
        desc if KError::TerminationRequested == desc => ArbitrateLockError::ThreadTerminating,
        _ => ArbitrateLockError::Unknown(Error::from(rc)),
    })
}

/// Error type for [`arbitrate_lock`]
#[derive(Debug, thiserror::Error)]
pub enum ArbitrateLockError {
    /// The owner thread handle is invalid.
    #[error("Invalid handle")]
    InvalidHandle,
    /// The mutex memory address cannot be accessed.
    #[error("Invalid memory state")]
    InvalidMemState,
    /// The current thread is marked for termination.
    #[error("Thread terminating")]
    ThreadTerminating,
    /// An unknown error occurred.
    ///
    /// This variant is used when the error code is not recognized.
    #[error("Unknown error: {0}")]
    Unknown(Error),
}

/// Arbitrates a mutex unlock operation in userspace
///
/// Releases a mutex by arbitrating the unlock operation with waiting threads.
///
/// # Arguments
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _mutex_ | Pointer to the mutex tag value in userspace memory. |
///
/// # Behavior
/// The kernel will:
/// 1. Validate the current thread's state and memory access
/// 2. If threads are waiting, select the next owner, write its handle into the
///    mutex word (with the wait bit re-asserted when more waiters remain) and
///    wake it
/// 3. Otherwise clear the mutex word
///
/// ## Notes
/// - The current thread must be the owner of the mutex. Otherwise, this is a no-op
///
/// # Safety
/// In addition to the invariants listed for [`arbitrate_lock`], the caller must ensure:
/// 1. The **current thread actually owns** the mutex referenced by `mutex`.
/// 2. The mutex word had the wait bit observed set before this call.
///
/// Violating any of these requirements results in **undefined behaviour**.
pub unsafe fn arbitrate_unlock(mutex: *mut u32) -> Result<(), ArbitrateUnlockError> {
    let rc = unsafe { raw::arbitrate_unlock(mutex) };
    RawResult::from_raw(rc).map((), |rc| match rc.description() {
        desc if KError::InvalidAddress == desc => ArbitrateUnlockError::InvalidMemState,
        _ => ArbitrateUnlockError::Unknown(Error::from(rc)),
    })
}

/// Error type for [`arbitrate_unlock`]
#[derive(Debug, thiserror::Error)]
pub enum ArbitrateUnlockError {
    /// The mutex memory address cannot be accessed.
    #[error("Invalid memory state")]
    InvalidMemState,
    /// An unknown error occurred.
    ///
    /// This variant is used when the error code is not recognized.
    #[error("Unknown error: {0}")]
    Unknown(Error),
}

/// Waits on an address while it holds an expected value
///
/// Suspends the current thread while `*addr == expected`, for at most
/// `timeout_ns` relative nanoseconds.
///
/// # Arguments
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _addr_ | Pointer to the word to wait on. |
/// | IN | _expected_ | Value the word must still hold for the thread to be parked. |
/// | IN | _timeout_ns_ | Relative timeout in nanoseconds. Use `u64::MAX` for an infinite wait. |
///
/// # Behavior
/// The kernel will:
/// 1. Validate the current thread's state and memory access
/// 2. Compare the word against `expected`; on mismatch, return success
///    immediately (the caller re-checks its predicate, treating this as a
///    spurious wake)
/// 3. Otherwise park the thread on the word's address until a matching
///    signal releases it or the timeout expires
///
/// # Notes
/// - This is a blocking operation that will pause the current thread
/// - A return without [`WaitForAddressError::TimedOut`] does **not** imply the
///   caller's predicate holds; callers always loop
///
/// # Safety
/// The caller must guarantee that `addr` points to a 4-byte aligned, readable
/// **and writable** `u32` residing in the current process' address space,
/// valid for the entire wait.
///
/// Violating this requirement results in **undefined behaviour**.
pub unsafe fn wait_for_address(
    addr: *mut u32,
    expected: u32,
    timeout_ns: u64,
) -> Result<(), WaitForAddressError> {
    let rc = unsafe { raw::wait_for_address(addr, expected, timeout_ns) };
    RawResult::from_raw(rc).map((), |rc| match rc.description() {
        desc if KError::InvalidAddress == desc => WaitForAddressError::InvalidMemState,
        desc if KError::TerminationRequested == desc => WaitForAddressError::ThreadTerminating,
        desc if KError::TimedOut == desc => WaitForAddressError::TimedOut,
        _ => WaitForAddressError::Unknown(Error::from(rc)),
    })
}

/// Error type for [`wait_for_address`]
#[derive(Debug, thiserror::Error)]
pub enum WaitForAddressError {
    /// The word's memory address cannot be accessed.
    #[error("Invalid memory state")]
    InvalidMemState,
    /// The current thread is marked for termination.
    #[error("Thread terminating")]
    ThreadTerminating,
    /// The wait operation timed out.
    #[error("Operation timed out")]
    TimedOut,
    /// An unknown error occurred.
    ///
    /// This variant is used when the error code is not recognized.
    #[error("Unknown error: {0}")]
    Unknown(Error),
}

impl ToRawResultCode for WaitForAddressError {
    fn to_rc(self) -> ResultCode {
        match self {
            WaitForAddressError::InvalidMemState => KError::InvalidAddress.to_rc(),
            WaitForAddressError::ThreadTerminating => KError::TerminationRequested.to_rc(),
            WaitForAddressError::TimedOut => KError::TimedOut.to_rc(),
            WaitForAddressError::Unknown(err) => err.to_raw(),
        }
    }
}

/// Signals threads waiting on an address
///
/// Wakes up to `count` threads parked on `addr`.
///
/// # Arguments
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _addr_ | Pointer to the word waiters are keyed on. |
/// | IN | _mode_ | [`SignalMode::Signal`] leaves the word untouched; [`SignalMode::SignalAndModify`] decrements it by the number of waits the signal consumed. |
/// | IN | _count_ | Maximum number of threads to wake. |
///
/// # Notes
/// - This is a non-blocking operation
/// - Signaling an address nobody waits on is a no-op and does not accumulate
///
/// # Safety
/// The caller must ensure that `addr` is a valid, 4-byte aligned, writable
/// pointer to a `u32` located in process memory. The pointed-to memory must
/// stay valid until all woken threads have resumed.
pub unsafe fn signal_to_address(
    addr: *mut u32,
    mode: SignalMode,
    count: u32,
) -> Result<(), SignalToAddressError> {
    let rc = unsafe { raw::signal_to_address(addr, mode as u32, count) };
    RawResult::from_raw(rc).map((), |rc| match rc.description() {
        desc if KError::InvalidAddress == desc => SignalToAddressError::InvalidMemState,
        _ => SignalToAddressError::Unknown(Error::from(rc)),
    })
}

/// Error type for [`signal_to_address`]
#[derive(Debug, thiserror::Error)]
pub enum SignalToAddressError {
    /// The word's memory address cannot be accessed.
    #[error("Invalid memory state")]
    InvalidMemState,
    /// An unknown error occurred.
    ///
    /// This variant is used when the error code is not recognized.
    #[error("Unknown error: {0}")]
    Unknown(Error),
}
