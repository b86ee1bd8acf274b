//! # hos-sys-thread
//!
//! Thread identity for the synchronization primitives.
//!
//! Every thread carries a non-zero 32-bit kernel handle, stable for the
//! thread's lifetime and fitting in the low 30 bits (bit 30 is the mutex
//! waiters flag, bit 31 is reserved handle space). The mutex encodes its
//! owner with this handle, and the condition variable uses it as the waiter
//! tag.
//!
//! On Horizon the handle is read from the `ThreadVars` footer of the
//! thread's TLS block, where the runtime stores it during thread start-up.
//! On other targets a process-wide registry hands out tags with the same
//! guarantees so the primitives behave identically under the host backend.

#![no_std]

#[cfg(not(target_os = "horizon"))]
extern crate std;

pub use hos_svc::raw::{Handle, INVALID_HANDLE};

mod sys;

/// Returns the kernel handle of the current thread.
///
/// The returned handle is never [`INVALID_HANDLE`], never has the mutex
/// waiters bit (bit 30) set, and does not change for the lifetime of the
/// thread. Synchronization primitives use it to identify the owning or
/// waiting thread.
#[inline]
pub fn current_thread_handle() -> Handle {
    sys::current_thread_handle()
}
