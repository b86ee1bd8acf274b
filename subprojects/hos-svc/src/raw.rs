//! Raw _Supervisor Call (SVC)_ API.
//!
//! Shared types plus the backend that actually issues the calls:
//!
//! - `svc` (Horizon targets): naked `svc` instruction stubs, one per syscall
//!   code in [crate::code].
//! - `emu` (all other targets): a process-local arbiter reproducing the
//!   kernel's observable wait/wake protocol, so code layered on this module
//!   behaves identically on development hosts.
//!
//! Both backends expose the same function set with identical signatures.

/// A raw handle type.
///
/// Alias for `u32`.
pub type Handle = u32;

/// Invalid handle
pub const INVALID_HANDLE: Handle = 0;

/// Pseudo handle for the current thread
pub const CUR_THREAD_HANDLE: Handle = 0xFFFF8000;

/// Yielding types
///
/// Ref: <https://switchbrew.org/wiki/SVC#SleepThread>
#[repr(i64)]
pub enum YieldType {
    /// Yielding without core migration
    NoMigration = 0,
    /// Yielding with core migration
    WithMigration = -1,
    /// Yielding to any other thread
    ToAnyThread = -2,
}

/// SignalToAddress behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SignalMode {
    /// Wakes waiters and leaves the word untouched
    Signal = 0,
    /// Wakes waiters and decrements the word by the number of threads the
    /// signal released
    SignalAndModify = 1,
}

/// Break reasons
#[repr(u32)]
pub enum BreakReason {
    /// Panic
    Panic = 0,
    /// Assert
    Assert = 1,
    /// User
    User = 2,
    /// PreLoadDll
    PreLoadDll = 3,
    /// PostLoadDll
    PostLoadDll = 4,
    /// PreUnloadDll
    PreUnloadDll = 5,
    /// PostUnloadDll
    PostUnloadDll = 6,
    /// CppException
    CppException = 7,

    /// NotificationOnlyFlag
    NotificationOnlyFlag = 0x80000000,
}

#[cfg(target_os = "horizon")]
mod svc;
#[cfg(target_os = "horizon")]
pub use svc::{
    arbitrate_lock, arbitrate_unlock, break_event, get_system_tick, signal_to_address,
    sleep_thread, wait_for_address,
};

#[cfg(not(target_os = "horizon"))]
mod emu;
#[cfg(not(target_os = "horizon"))]
pub use emu::{
    arbitrate_lock, arbitrate_unlock, break_event, get_system_tick, signal_to_address,
    sleep_thread, wait_for_address,
};
