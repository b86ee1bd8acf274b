//! Horizon backend: naked `svc` instruction stubs.
//!
//! Each function issues a single supervisor call with the immediate from
//! [crate::code] and returns the kernel's result in `w0`, per the Horizon
//! SVC ABI.

use crate::{code::*, result::ResultCode};

use super::{BreakReason, Handle};

/// Arbitrates a mutex lock operation in userspace.
///
/// `Result svcArbitrateLock(u32 wait_tag, uint32_t* mutex, uint32_t self_tag);`
///
/// Syscall code: [ARBITRATE_LOCK] (`0x1A`).
///
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _owner_thread_handle_ | The owner thread's kernel handle. |
/// | IN | _mutex_ | Pointer to the mutex raw tag value. |
/// | IN | _curr_thread_handle_ | The current thread's kernel handle. |
///
/// Ref: <https://switchbrew.org/wiki/SVC#ArbitrateLock>
///
/// # Safety
///
/// The caller must ensure:
/// - Both `owner_thread_handle` and `curr_thread_handle` are valid kernel thread handles
/// - `mutex` points to a valid u32 value
#[unsafe(naked)]
pub unsafe extern "C" fn arbitrate_lock(
    owner_thread_handle: Handle,
    mutex: *mut u32,
    curr_thread_handle: Handle,
) -> ResultCode {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0x1A
        "ret",
        code = const ARBITRATE_LOCK,
    );
}

/// Arbitrates a mutex unlock operation in userspace.
///
/// `Result svcArbitrateUnlock(uint32_t* mutex);`
///
/// Syscall code: [ARBITRATE_UNLOCK] (`0x1B`).
///
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _mutex_ | Pointer to the mutex raw tag value. |
///
/// Ref: <https://switchbrew.org/wiki/SVC#ArbitrateUnlock>
///
/// # Safety
///
/// The caller must ensure that `mutex` points to a valid u32 value.
#[unsafe(naked)]
pub unsafe extern "C" fn arbitrate_unlock(mutex: *mut u32) -> ResultCode {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0x1B
        "ret",
        code = const ARBITRATE_UNLOCK,
    );
}

/// Waits on an address while it holds an expected value.
///
/// `Result svcWaitForAddress(uint32_t* addr, uint32_t expected, uint64_t timeout_ns);`
///
/// Syscall code: [WAIT_FOR_ADDRESS] (`0x34`).
///
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _addr_ | Pointer to the word to wait on. |
/// | IN | _expected_ | Value the word must hold for the thread to be parked. |
/// | IN | _timeout_ns_ | Relative timeout in nanoseconds; `u64::MAX` waits forever. |
///
/// Ref: <https://switchbrew.org/wiki/SVC#WaitForAddress>
///
/// # Safety
///
/// The caller must ensure that `addr` points to a valid, 4-byte aligned u32
/// that stays mapped for the whole wait.
#[unsafe(naked)]
pub unsafe extern "C" fn wait_for_address(
    addr: *mut u32,
    expected: u32,
    timeout_ns: u64,
) -> ResultCode {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0x34
        "ret",
        code = const WAIT_FOR_ADDRESS,
    );
}

/// Signals threads waiting on an address.
///
/// `Result svcSignalToAddress(uint32_t* addr, uint32_t mode, uint32_t count);`
///
/// Syscall code: [SIGNAL_TO_ADDRESS] (`0x35`).
///
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _addr_ | Pointer to the word waiters are keyed on. |
/// | IN | _mode_ | [`SignalMode`](super::SignalMode) as its `u32` value. |
/// | IN | _count_ | Maximum number of threads to wake. |
///
/// Ref: <https://switchbrew.org/wiki/SVC#SignalToAddress>
///
/// # Safety
///
/// The caller must ensure that `addr` points to a valid, 4-byte aligned u32.
#[unsafe(naked)]
pub unsafe extern "C" fn signal_to_address(addr: *mut u32, mode: u32, count: u32) -> ResultCode {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0x35
        "ret",
        code = const SIGNAL_TO_ADDRESS,
    );
}

/// Sleeps the current thread for the specified amount of time.
///
/// Setting nanoseconds to 0, -1, or -2 indicates a [`YieldType`](super::YieldType).
///
/// `void svcSleepThread(int64_t nano);`
///
/// Syscall code: [SLEEP_THREAD] (`0xB`).
///
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _nano_ | Number of nanoseconds to sleep, or a yield sentinel. |
///
/// Ref: <https://switchbrew.org/wiki/SVC#SleepThread>
///
/// # Safety
///
/// This function is safe to call from any context. The value passed is used directly
/// by the kernel.
#[unsafe(naked)]
pub unsafe extern "C" fn sleep_thread(nano: i64) {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0xB
        "ret",
        code = const SLEEP_THREAD,
    );
}

/// Gets the current system tick.
///
/// `uint64_t svcGetSystemTick();`
///
/// Syscall code: [GET_SYSTEM_TICK] (`0x1E`).
///
/// Ref: <https://switchbrew.org/wiki/SVC#GetSystemTick>
///
/// # Safety
///
/// This function is safe to call from any context.
#[unsafe(naked)]
pub unsafe extern "C" fn get_system_tick() -> u64 {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0x1E
        "ret",
        code = const GET_SYSTEM_TICK,
    );
}

/// Breaks execution.
///
/// `Result svcBreak(uint32_t breakReason, uintptr_t address, uintptr_t size);`
///
/// Syscall code: [BREAK] (`0x26`).
///
/// | Arg | Name | Description |
/// | --- | --- | --- |
/// | IN | _reason_ | The reason for the break event. |
/// | IN | _addr_ | Address of the buffer to pass to the debugger. |
/// | IN | _size_ | Size of the buffer to pass to the debugger. |
///
/// Ref: <https://switchbrew.org/wiki/SVC#Break>
///
/// # Safety
///
/// The caller must ensure that `addr`/`size` describe readable memory, or are
/// both zero.
#[unsafe(naked)]
pub unsafe extern "C" fn break_event(
    reason: BreakReason,
    addr: usize,
    size: usize,
) -> ResultCode {
    core::arch::naked_asm!(
        "svc {code}", // Issue the SVC call with immediate value 0x26
        "ret",
        code = const BREAK,
    );
}
