//! # hos-svc
//!
//! A Rust library for the small set of Horizon OS _Supervisor Calls_ (SVCs)
//! the user-space synchronization primitives are built on: mutex arbitration,
//! address-keyed wait/wake, thread sleep and the system tick.
//!
//! The [raw](raw) module carries two interchangeable backends:
//!
//! - On Horizon targets, each function is a naked `svc` instruction stub.
//! - On every other target, a process-local arbiter reproduces the kernel's
//!   observable wait/wake protocol so the primitives (and their test suites)
//!   run on development hosts.
//!
//! ## References:
//! - [Switchbrew Wiki: SVC](https://switchbrew.org/wiki/SVC)

#![no_std]

#[cfg(not(target_os = "horizon"))]
extern crate std;

pub mod code;
pub mod debug;
pub mod error;
pub mod misc;
pub mod raw;
pub mod result;
pub mod sync;
pub mod thread;

/// #[panic_handler]
///
/// Use different panic handlers for debug and release builds.
/// - 'dev': halt on panic. Easier to debug panics; can put a breakpoint on `rust_begin_unwind`
/// - 'release': abort on panic. Minimal binary size.
///
/// On non-Horizon targets the handler comes from `std`.
///
/// See:
///  - <https://doc.rust-lang.org/nomicon/panic-handler.html>
///  - <https://docs.rust-embedded.org/book/start/panicking.html>
#[cfg(all(target_os = "horizon", not(debug_assertions)))]
#[allow(unused_imports)]
use panic_abort as _;
#[cfg(all(target_os = "horizon", debug_assertions))]
#[allow(unused_imports)]
use panic_halt as _;
