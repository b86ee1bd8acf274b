//! _Supervisor Call (SVC)_ codes.
//!
//! Only the calls the synchronization core depends on are listed; the full
//! table lives in the Switchbrew documentation.
//!
//! References:
//! - <https://switchbrew.org/wiki/SVC#system_calls>
//! - <https://developer.arm.com/documentation/ddi0602/2024-12/Base-Instructions/SVC--Supervisor-call->

/// Sleeps the current thread for the specified amount of time.
pub const SLEEP_THREAD: u16 = 0xB;

/// Arbitrates a mutex lock operation in userspace.
pub const ARBITRATE_LOCK: u16 = 0x1A;

/// Arbitrates a mutex unlock operation in userspace.
pub const ARBITRATE_UNLOCK: u16 = 0x1B;

/// Gets the current system tick.
pub const GET_SYSTEM_TICK: u16 = 0x1E;

/// Breaks execution.
pub const BREAK: u16 = 0x26;

/// Waits on an address, keyed by the word's virtual address.
pub const WAIT_FOR_ADDRESS: u16 = 0x34;

/// Signals (and optionally modifies) an address.
pub const SIGNAL_TO_ADDRESS: u16 = 0x35;
