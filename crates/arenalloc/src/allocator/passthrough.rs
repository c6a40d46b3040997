//! Variant 4: delegate to the host allocator. Exists purely so benchmarks
//! can A/B the engine against the system malloc.
//!
//! This crate does not interpose the `malloc` symbol, so plain libc calls
//! reach the real host allocator directly; no dlsym(RTLD_NEXT) indirection
//! is needed.

use crate::allocator::VariantAlloc;
use core::ffi::c_void;

pub struct PassthroughAllocator;

impl VariantAlloc for PassthroughAllocator {
    fn init(&self) -> bool {
        true
    }

    unsafe fn malloc(&self, size: usize) -> *mut u8 {
        libc::malloc(size) as *mut u8
    }

    unsafe fn free(&self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }
        libc::free(ptr as *mut c_void);
    }

    unsafe fn usable_size(&self, ptr: *mut u8) -> usize {
        if ptr.is_null() {
            return 0;
        }
        #[cfg(target_os = "linux")]
        {
            libc::malloc_usable_size(ptr as *mut c_void)
        }
        #[cfg(target_os = "macos")]
        {
            libc::malloc_size(ptr as *const c_void)
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            0
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, size: usize) -> *mut u8 {
        libc::realloc(ptr as *mut c_void, size) as *mut u8
    }

    unsafe fn calloc(&self, nmemb: usize, size: usize) -> *mut u8 {
        libc::calloc(nmemb, size) as *mut u8
    }
}
