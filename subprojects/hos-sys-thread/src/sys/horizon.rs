//! Horizon backend: the thread handle lives in the TLS `ThreadVars` footer.
//!
//! Every user-mode thread on Horizon OS receives a 0x200-byte TLS block whose
//! base address is exposed through the read-only `TPIDRRO_EL0` system
//! register. The last 0x20 bytes of the block hold the `ThreadVars`
//! structure, written once during thread start-up; its `handle` field is the
//! kernel handle of the thread.
//!
//! ```text
//! TLS base + 0x1E0
//! 0x1E0 ┌────────────────────────────┐
//!       │ magic       (u32)          │ 4 bytes  - Magic value "!TV$"
//! 0x1E4 ├────────────────────────────┤
//!       │ handle      (u32)          │ 4 bytes  - Kernel thread handle
//! 0x1E8 ├────────────────────────────┤
//!       │ thread_ptr  (*mut c_void)  │ 8 bytes  - Thread object pointer
//! 0x1F0 ├────────────────────────────┤
//!       │ reent       (*mut c_void)  │ 8 bytes  - Reentrancy state
//! 0x1F8 ├────────────────────────────┤
//!       │ tls_ptr     (*mut c_void)  │ 8 bytes  - Thread pointer (ABI-fixed)
//! 0x200 └────────────────────────────┘
//! ```
//!
//! Reading the handle before the runtime has initialized `ThreadVars` is
//! undefined behavior; the synchronization primitives therefore must not be
//! used before thread start-up completes.
//!
//! # References
//! - [Switchbrew Wiki: Thread Local Region](https://switchbrew.org/wiki/Thread_Local_Region)

use core::{arch::asm, ffi::c_void, mem::offset_of, ptr};

use hos_svc::raw::Handle;
use static_assertions::const_assert_eq;

/// Size of the Thread Local Storage (TLS) region in bytes.
pub const TLS_REGION_SIZE: usize = 0x200;

/// Size of the [`ThreadVars`] structure in bytes.
pub const THREAD_VARS_SIZE: usize = 0x20;

/// Magic value used to verify that the [`ThreadVars`] structure is initialized.
///
/// The value `0x21545624` corresponds to the ASCII string "!TV$" (little-endian).
pub const THREAD_VARS_MAGIC: u32 = 0x21545624;

/// Per-thread variables located at the end of the TLS area.
#[repr(C)]
pub struct ThreadVars {
    /// Magic value used to check if the struct is initialized.
    pub magic: u32,
    /// Kernel handle identifying the thread.
    pub handle: Handle,
    /// Pointer to the current thread object (if any).
    pub thread_info_ptr: *mut c_void,
    /// Pointer to the thread's reentrancy state.
    pub reent: *mut c_void,
    /// Pointer to this thread's thread-local segment.
    ///
    /// Must stay the last field: the AArch64 thread-pointer helper loads it
    /// from the fixed offset 0x1F8.
    pub tls_ptr: *mut c_void,
}

// Ensure the layout stays consistent with Horizon expectations.
const_assert_eq!(size_of::<ThreadVars>(), THREAD_VARS_SIZE);
const_assert_eq!(offset_of!(ThreadVars, handle), 0x4);
const_assert_eq!(offset_of!(ThreadVars, tls_ptr), 0x18);

/// Returns the base address of this thread's TLS block.
///
/// On AArch64, the per-thread TLS pointer is exposed to user-mode code via
/// the read-only system register `TPIDRRO_EL0`, initialized by the kernel
/// during thread creation.
#[inline]
fn tls_base_addr() -> usize {
    let value: usize;
    // SAFETY: Reading TPIDRRO_EL0 is a side-effect-free operation returning
    // the kernel-initialized TLS base address.
    unsafe {
        asm!(
            "mrs {}, tpidrro_el0",
            out(reg) value,
            options(nostack, nomem, preserves_flags)
        );
    }
    value
}

/// Returns a raw pointer to the [`ThreadVars`] for the current thread.
#[inline]
fn thread_vars_ptr() -> *mut ThreadVars {
    (tls_base_addr() + TLS_REGION_SIZE - THREAD_VARS_SIZE) as *mut ThreadVars
}

/// Returns the kernel handle of the current thread.
///
/// The field access is performed with `read_volatile` to keep the compiler
/// from caching the value across calls.
#[inline]
pub fn current_thread_handle() -> Handle {
    let tv = thread_vars_ptr();

    // SAFETY: `tv` points to the ThreadVars inside the current thread's TLS
    // block, which the runtime initialized before any code here can run.
    unsafe { ptr::read_volatile(&raw const (*tv).handle) }
}
