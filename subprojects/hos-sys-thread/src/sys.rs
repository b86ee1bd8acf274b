//! Per-target thread identity backends.

#[cfg(target_os = "horizon")]
mod horizon;
#[cfg(target_os = "horizon")]
pub use horizon::current_thread_handle;

#[cfg(not(target_os = "horizon"))]
mod host;
#[cfg(not(target_os = "horizon"))]
pub use host::current_thread_handle;
