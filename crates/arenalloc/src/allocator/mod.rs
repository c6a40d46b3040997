pub mod arena;
pub mod cached;
pub mod naive;
pub mod passthrough;
pub mod thread_cache;

pub use arena::ArenaAllocator;
pub use cached::CachedAllocator;
pub use naive::NaiveAllocator;
pub use passthrough::PassthroughAllocator;

use crate::heap::block::BlockRef;
use core::ptr;

/// Common surface of every allocator variant. `malloc` and `free` are the
/// engine-specific parts; `realloc`, `calloc`, and `usable_size` derive from
/// them identically, so they live here as default methods. The passthrough
/// variant overrides them to keep host semantics intact.
pub trait VariantAlloc {
    /// Prepare the variant's backing state. Idempotent; false means the OS
    /// mapping failed and the variant is unusable.
    fn init(&self) -> bool;

    /// Allocate `size` bytes, 16-byte aligned. Null when `size` is zero or
    /// no capacity is left anywhere.
    ///
    /// # Safety
    /// `init` must have succeeded.
    unsafe fn malloc(&self, size: usize) -> *mut u8;

    /// Release a pointer previously returned by this variant's `malloc`.
    /// Null is a no-op; anything else this allocator did not hand out is
    /// undefined behaviour.
    ///
    /// # Safety
    /// See above.
    unsafe fn free(&self, ptr: *mut u8);

    /// Bytes usable at `ptr`: the block size minus its header word.
    ///
    /// # Safety
    /// `ptr` must be null or a live pointer from this variant's `malloc`.
    unsafe fn usable_size(&self, ptr: *mut u8) -> usize {
        if ptr.is_null() {
            0
        } else {
            BlockRef::from_payload(ptr).payload_size()
        }
    }

    /// Resize by allocate-copy-free. Size zero frees and returns null; a
    /// null `ptr` behaves as `malloc`. On failure the original block is
    /// left untouched.
    ///
    /// # Safety
    /// See `malloc`/`free`.
    unsafe fn realloc(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        if size == 0 {
            self.free(ptr);
            return ptr::null_mut();
        }
        if ptr.is_null() {
            return self.malloc(size);
        }

        let new_ptr = self.malloc(size);
        if new_ptr.is_null() {
            return ptr::null_mut();
        }
        let copy_size = self.usable_size(ptr).min(size);
        ptr::copy_nonoverlapping(ptr, new_ptr, copy_size);
        self.free(ptr);
        new_ptr
    }

    /// Overflow-checked `nmemb * size` allocation, zero-filled.
    ///
    /// # Safety
    /// See `malloc`.
    unsafe fn calloc(&self, nmemb: usize, size: usize) -> *mut u8 {
        let total = match nmemb.checked_mul(size) {
            Some(total) => total,
            None => return ptr::null_mut(),
        };
        let ptr = self.malloc(total);
        if !ptr.is_null() {
            ptr::write_bytes(ptr, 0, total);
        }
        ptr
    }
}
