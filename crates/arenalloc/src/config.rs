use crate::platform;
use crate::util::MAX_ARENAS;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Cached arena count (resolved once at init, read lock-free afterwards).
static ARENA_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Read configuration from environment variables.
/// Must be called during init, before any allocations.
///
/// # Safety
/// Calls libc::getenv, which is not thread-safe; must run from the
/// single-threaded init path.
pub unsafe fn read_config() {
    let configured = match getenv_usize(b"ARENALLOC_ARENAS\0") {
        Some(n) if n > 0 => n,
        // Two arenas per logical CPU keeps dispatch collisions rare without
        // reserving address space nobody will touch.
        _ => 2 * platform::num_cpus(),
    };
    ARENA_COUNT.store(configured.min(MAX_ARENAS), Ordering::Relaxed);
}

pub fn arena_count() -> usize {
    ARENA_COUNT.load(Ordering::Relaxed)
}

/// Parse an environment variable as a usize.
///
/// # Safety
/// Calls libc::getenv.
unsafe fn getenv_usize(key: &[u8]) -> Option<usize> {
    let val = libc::getenv(key.as_ptr() as *const libc::c_char);
    if val.is_null() {
        return None;
    }

    // Parse manually (no std allocation)
    let mut result: usize = 0;
    let mut ptr = val as *const u8;
    loop {
        let byte = *ptr;
        if byte == 0 {
            break;
        }
        if !byte.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add((byte - b'0') as usize)?;
        ptr = ptr.add(1);
    }
    Some(result)
}
