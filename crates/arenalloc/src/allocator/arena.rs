//! Variant 2: multi-arena allocator.
//!
//! Allocations are dispatched round-robin across the registry; frees are
//! routed back to the owning arena by address, so a block may be freed by
//! a different thread than allocated it.

use crate::allocator::VariantAlloc;
use crate::heap::registry;

pub struct ArenaAllocator;

impl VariantAlloc for ArenaAllocator {
    fn init(&self) -> bool {
        registry::init()
    }

    unsafe fn malloc(&self, size: usize) -> *mut u8 {
        let arena = registry::pick();
        // The arena seeds its heap inside its own lock if init was unable
        // to (or has not yet run for this arena).
        arena.alloc(size)
    }

    unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        match registry::arena_for(ptr) {
            Some(arena) => arena.free(ptr),
            // Not ours: undefined behaviour by contract. Trap in debug
            // builds, ignore in release.
            None => debug_assert!(false, "free of a pointer outside every arena"),
        }
    }
}
