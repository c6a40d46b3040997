#![no_main]

use arenalloc::allocator::{CachedAllocator, VariantAlloc};
use libfuzzer_sys::fuzz_target;

/// Interprets a byte slice as a sequence of allocator operations.
///
/// Each operation is encoded as:
///   byte 0: opcode (0=malloc, 1=free, 2=realloc, 3=calloc)
///   byte 1-2: size (little-endian u16)
///   byte 3: slot index (which tracked pointer to operate on)
///
/// Up to 64 live pointers are tracked. Every live region carries a known
/// byte pattern that is re-checked before its free, so corruption of one
/// allocation by metadata writes for another becomes a crash.
const MAX_SLOTS: usize = 64;

/// Bytes of each allocation that are patterned and verified.
const CHECK_SPAN: usize = 256;

unsafe fn fill(ptr: *mut u8, size: usize, pattern: u8) {
    if !ptr.is_null() && size > 0 {
        std::ptr::write_bytes(ptr, pattern, size.min(CHECK_SPAN));
    }
}

unsafe fn verify(ptr: *mut u8, size: usize, pattern: u8) {
    if ptr.is_null() || size == 0 {
        return;
    }
    let slice = std::slice::from_raw_parts(ptr, size.min(CHECK_SPAN));
    assert!(
        slice.iter().all(|&b| b == pattern),
        "pattern {:#x} corrupted",
        pattern
    );
}

fuzz_target!(|data: &[u8]| {
    let a = CachedAllocator;
    assert!(a.init());

    let mut slots: [*mut u8; MAX_SLOTS] = [std::ptr::null_mut(); MAX_SLOTS];
    let mut sizes: [usize; MAX_SLOTS] = [0; MAX_SLOTS];
    let mut patterns: [u8; MAX_SLOTS] = [0; MAX_SLOTS];

    let mut i = 0;
    while i + 4 <= data.len() {
        let opcode = data[i] & 0x03;
        let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize;
        let slot = (data[i + 3] as usize) % MAX_SLOTS;
        i += 4;

        unsafe {
            match opcode {
                0 => {
                    verify(slots[slot], sizes[slot], patterns[slot]);
                    a.free(slots[slot]);
                    let ptr = a.malloc(size);
                    fill(ptr, size, 0xAA);
                    slots[slot] = ptr;
                    sizes[slot] = if ptr.is_null() { 0 } else { size };
                    patterns[slot] = 0xAA;
                }
                1 => {
                    verify(slots[slot], sizes[slot], patterns[slot]);
                    a.free(slots[slot]);
                    slots[slot] = std::ptr::null_mut();
                    sizes[slot] = 0;
                }
                2 => {
                    // realloc preserves the prefix; repaint afterwards.
                    let ptr = a.realloc(slots[slot], size);
                    fill(ptr, size, 0xBB);
                    slots[slot] = ptr;
                    sizes[slot] = if ptr.is_null() { 0 } else { size };
                    patterns[slot] = 0xBB;
                }
                3 => {
                    verify(slots[slot], sizes[slot], patterns[slot]);
                    a.free(slots[slot]);
                    let nmemb = (size & 0xFF).max(1);
                    let unit = size >> 8;
                    let ptr = a.calloc(nmemb, unit);
                    slots[slot] = ptr;
                    sizes[slot] = if ptr.is_null() { 0 } else { nmemb * unit };
                    patterns[slot] = 0; // calloc zero-fills
                }
                _ => unreachable!(),
            }
        }
    }

    for (index, slot) in slots.into_iter().enumerate() {
        unsafe {
            verify(slot, sizes[index], patterns[index]);
            a.free(slot);
        }
    }
});
