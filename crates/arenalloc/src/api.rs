//! Public allocation surface over the feature-selected variant.

use crate::allocator::VariantAlloc;
use crate::init;
use core::ptr;

/// Initialize the active allocator explicitly. Optional: `malloc` performs
/// the same initialization on first use. False means the OS declined the
/// backing mappings.
pub fn init() -> bool {
    init::ensure_initialized()
}

/// Allocate `size` bytes aligned to 16. Null when `size` is zero or no
/// arena has capacity left.
///
/// # Safety
/// The returned pointer must be released through [`free`] (or [`realloc`])
/// and not used afterwards.
pub unsafe fn malloc(size: usize) -> *mut u8 {
    if !init::ensure_initialized() {
        return ptr::null_mut();
    }
    init::allocator().malloc(size)
}

/// Release a pointer from [`malloc`]. Null is a no-op; a pointer this
/// allocator did not produce is undefined behaviour.
///
/// # Safety
/// `ptr` must not be used after this call.
pub unsafe fn free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    // A non-null pointer implies malloc already ran, so the allocator is up.
    init::allocator().free(ptr);
}

/// Resize an allocation, preserving the common prefix. Size zero frees and
/// returns null; a null `ptr` allocates.
///
/// # Safety
/// `ptr` must be null or live; it is invalid after a successful call.
pub unsafe fn realloc(ptr: *mut u8, size: usize) -> *mut u8 {
    if !init::ensure_initialized() {
        return ptr::null_mut();
    }
    init::allocator().realloc(ptr, size)
}

/// Allocate a zero-filled array of `nmemb` elements of `size` bytes. Null
/// on multiplication overflow.
///
/// # Safety
/// As [`malloc`].
pub unsafe fn calloc(nmemb: usize, size: usize) -> *mut u8 {
    if !init::ensure_initialized() {
        return ptr::null_mut();
    }
    init::allocator().calloc(nmemb, size)
}

/// Bytes usable at `ptr`; zero for null.
///
/// # Safety
/// `ptr` must be null or a live pointer from [`malloc`].
pub unsafe fn usable_size(ptr: *mut u8) -> usize {
    init::allocator().usable_size(ptr)
}
