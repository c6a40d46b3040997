//! Variant 3: multi-arena allocator fronted by the per-thread block cache.
//!
//! Frees park blocks in the thread cache; later allocations drain it
//! without taking any arena lock. A full cache evicts probabilistically:
//! always evicting throws away reuse opportunities, never evicting starves
//! the arenas, so a weighted coin picks between them.

use crate::allocator::thread_cache::with_thread_cache;
use crate::allocator::VariantAlloc;
use crate::heap::block::BlockRef;
use crate::heap::registry;
use crate::platform;
use crate::util::{round_up, ARENA_MAX_SIZE, CACHE_EVICT_PROBABILITY, DSIZE, WSIZE};
use core::ptr;

pub struct CachedAllocator;

/// One Bernoulli trial at the eviction probability.
fn evict_coin() -> bool {
    let threshold = (CACHE_EVICT_PROBABILITY * u64::MAX as f64) as u64;
    platform::fast_random_u64() < threshold
}

/// Return a block to its owning arena, which coalesces and relists it.
///
/// # Safety
/// `block` must be a live allocated block of some registry arena.
unsafe fn truly_free(block: BlockRef) {
    match registry::arena_for(block.addr()) {
        Some(arena) => arena.free_block(block),
        None => debug_assert!(false, "cached block belongs to no arena"),
    }
}

impl VariantAlloc for CachedAllocator {
    fn init(&self) -> bool {
        registry::init()
    }

    unsafe fn malloc(&self, size: usize) -> *mut u8 {
        if size == 0 || size > ARENA_MAX_SIZE {
            return ptr::null_mut();
        }

        // The cache stores whole blocks, so a hit must cover the adjusted
        // block size, not just the raw request.
        let asize = round_up(size + WSIZE, DSIZE);
        if let Some(Some(block)) = with_thread_cache(|cache| unsafe { cache.query(asize) }) {
            // Still marked allocated in its arena; hand it straight back.
            return block.payload();
        }

        registry::pick().alloc(size)
    }

    unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        let block = BlockRef::from_payload(ptr);

        match with_thread_cache(|cache| unsafe { cache.add(block) }) {
            Some(true) => return,
            Some(false) => {
                if evict_coin() {
                    // Make room once, send the victim home, and retry.
                    let (victim, readded) = with_thread_cache(|cache| unsafe {
                        match cache.evict() {
                            Some(victim) => (Some(victim), cache.add(block)),
                            None => (None, false),
                        }
                    })
                    .unwrap_or((None, false));

                    if let Some(victim) = victim {
                        truly_free(victim);
                    }
                    if readded {
                        return;
                    }
                }
            }
            // TLS unavailable: thread teardown or a re-entrant touch.
            None => {}
        }

        truly_free(block);
    }
}
