//! Variant 1: one process-wide heap behind one process-wide mutex.
//!
//! The baseline the multi-arena designs are benchmarked against. Every
//! thread serializes on the single arena's lock.

use crate::allocator::VariantAlloc;
use crate::heap::arena::Arena;

static HEAP: Arena = Arena::new();

pub struct NaiveAllocator;

impl VariantAlloc for NaiveAllocator {
    fn init(&self) -> bool {
        HEAP.ensure_heap()
    }

    unsafe fn malloc(&self, size: usize) -> *mut u8 {
        HEAP.alloc(size)
    }

    unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        HEAP.free(ptr);
    }
}
