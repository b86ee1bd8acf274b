//! Host backend: a process-wide tag registry.
//!
//! Development hosts have no `ThreadVars` TLS footer, so thread identity
//! comes from a registry instead: the first time a thread asks for its
//! handle, it draws a tag from a process-global counter and keeps it in
//! thread-local storage for the rest of its life. Tags are non-zero and
//! confined to the low 30 bits, matching the handle space the mutex word
//! encoding expects.

use core::sync::atomic::{AtomicU32, Ordering};

use hos_svc::raw::Handle;

/// Handles must leave bit 30 (mutex waiters flag) and bit 31 (reserved
/// handle space) clear.
const HANDLE_TAG_MASK: u32 = 0x3FFF_FFFF;

static NEXT_TAG: AtomicU32 = AtomicU32::new(1);

std::thread_local! {
    static TAG: Handle = alloc_tag();
}

fn alloc_tag() -> Handle {
    loop {
        let tag = NEXT_TAG.fetch_add(1, Ordering::Relaxed) & HANDLE_TAG_MASK;
        // The counter wraps through zero after 2^30 threads; skip it.
        if tag != 0 {
            return tag;
        }
    }
}

/// Returns the registry tag of the current thread.
#[inline]
pub fn current_thread_handle() -> Handle {
    TAG.with(|tag| *tag)
}
