//! Error modules and kernel error descriptions.
//!
//! Horizon result codes are split into a _module_ (which subsystem produced
//! the error) and a _description_ (the error itself). This module carries the
//! kernel's module id, the description values the synchronization SVCs can
//! return, and the [`ToRawResultCode`] trait used to re-encode decoded errors
//! into their on-wire form.
//!
//! # References
//! - [Switchbrew Wiki: Error codes](https://switchbrew.org/wiki/Error_codes)

pub use crate::result::ResultCode;

/// A value that can be re-encoded as a raw 32-bit result code.
pub trait ToRawResultCode {
    /// Converts this value into its raw result code representation.
    fn to_rc(self) -> ResultCode;
}

/// Error modules.
///
/// Only the modules this crate constructs codes for are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Module {
    /// The kernel itself.
    Kernel = 1,
}

/// Kernel error descriptions.
///
/// These are the description halves of `Module::Kernel` result codes. The
/// discriminants are the kernel's own description values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum KernelError {
    /// The current thread is marked for termination.
    TerminationRequested = 59,
    /// An address was invalid or inaccessible.
    InvalidAddress = 102,
    /// The memory at the given address is in an unexpected state.
    InvalidCurrentMemory = 106,
    /// A handle was invalid.
    InvalidHandle = 114,
    /// The operation timed out.
    TimedOut = 117,
    /// The operation was cancelled.
    Cancelled = 118,
    /// An argument was out of range.
    OutOfRange = 119,
    /// An enum argument had an invalid value.
    InvalidEnumValue = 120,
    /// The object was in an invalid state for the operation.
    InvalidState = 125,
}

impl KernelError {
    /// Returns this error's description value.
    #[inline]
    pub const fn description(self) -> u32 {
        self as u32
    }
}

impl ToRawResultCode for KernelError {
    fn to_rc(self) -> ResultCode {
        crate::result::raw::ResultCode::from_parts(Module::Kernel, self.description()).to_raw()
    }
}

impl PartialEq<u32> for KernelError {
    fn eq(&self, other: &u32) -> bool {
        self.description() == *other
    }
}

impl PartialEq<KernelError> for u32 {
    fn eq(&self, other: &KernelError) -> bool {
        *self == other.description()
    }
}
