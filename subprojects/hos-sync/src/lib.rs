//! # hos-sync
//!
//! Blocking synchronization primitives for a Horizon-style kernel
//! environment: mutex, condition variable, counting semaphore, barrier and
//! reader/writer lock, layered directly on the kernel's address-keyed
//! arbitration SVCs.
//!
//! Every primitive is POD-initializable — the all-zero bit pattern is a
//! valid unlocked/idle state — so all of them can live in `static`s without
//! run-time construction. None of them owns heap memory or stores pointers
//! to itself; the only external resource is the kernel's per-address wait
//! queue, keyed by the virtual address of the primitive's counter word.
//! Relocating a primitive while a thread is blocked on it is therefore
//! undefined.
//!
//! Composition is strictly layered: [`RwLock`], [`Semaphore`] and
//! [`Barrier`] are built from [`Mutex`] and [`Condvar`]; those two talk to
//! the kernel gate directly.

#![no_std]

#[cfg(feature = "ffi")]
mod ffi;

mod barrier;
mod condvar;
mod mutex;
mod remutex;
mod rwlock;
mod semaphore;

#[doc(inline)]
pub use self::{
    barrier::Barrier, condvar::Condvar, mutex::Mutex, remutex::ReentrantMutex, rwlock::RwLock,
    semaphore::Semaphore,
};
