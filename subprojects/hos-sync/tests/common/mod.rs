//! Shared helpers for the synchronization test suites.

#![allow(dead_code)]

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Nanoseconds per millisecond, for timeout arguments.
pub const MS: u64 = 1_000_000;

/// Sleeps the current thread for the given number of milliseconds through
/// the kernel gate.
pub fn sleep_ms(ms: u64) {
    hos_svc::thread::sleep(ms * MS);
}

/// Atomically samples a primitive's raw counter word (a mutex tag or a
/// condition variable waiter count), the way the kernel sees it.
pub fn load_word(ptr: *mut u32) -> u32 {
    unsafe { AtomicU32::from_ptr(ptr) }.load(Ordering::SeqCst)
}

/// Polls `cond` every millisecond until it holds or `timeout` elapses.
/// Returns whether the condition was observed.
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}
