//! Miscellaneous system calls.

use super::raw;

/// Gets the current system tick.
///
/// The tick counter is monotonic and advances at the counter-timer frequency
/// (19.2 MHz on Horizon hardware). It backs timeout arithmetic in code that
/// needs a clock without going through a time service.
///
/// Ref: <https://switchbrew.org/wiki/SVC#GetSystemTick>
pub fn get_system_tick() -> u64 {
    unsafe { raw::get_system_tick() }
}
