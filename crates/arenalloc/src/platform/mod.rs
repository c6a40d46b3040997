#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub use linux as sys;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "macos")]
pub use macos as sys;

/// Map anonymous read-write memory. Returns null on failure.
/// The mappings back arena heaps and live for the rest of the process.
///
/// # Safety
/// Caller must ensure `size` is page-aligned and non-zero.
#[inline]
pub unsafe fn map_anonymous(size: usize) -> *mut u8 {
    sys::map_anonymous(size)
}

/// Get the number of online CPUs.
pub fn num_cpus() -> usize {
    sys::num_cpus()
}

/// Get a fast, non-cryptographic random u64.
/// Uses thread-local xorshift64* state to avoid global atomic contention.
pub fn fast_random_u64() -> u64 {
    use core::cell::Cell;

    thread_local! {
        static RNG_STATE: Cell<u64> = const { Cell::new(0) };
    }

    let result = RNG_STATE.try_with(|state| {
        let mut s = state.get();
        if s == 0 {
            // Seed from a stack address for per-thread uniqueness
            let stack_addr = &s as *const _ as u64;
            s = stack_addr.wrapping_mul(0x517cc1b727220a95) | 1;
        }
        // xorshift64*
        s ^= s >> 12;
        s ^= s << 25;
        s ^= s >> 27;
        state.set(s);
        s.wrapping_mul(0x2545F4914F6CDD1D)
    });

    match result {
        Ok(val) => val,
        Err(_) => {
            // TLS not available (early init or thread destruction) -- fallback
            static COUNTER: core::sync::atomic::AtomicU64 = core::sync::atomic::AtomicU64::new(0);
            let count = COUNTER.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
            splitmix64(count.wrapping_add(0x9E3779B97F4A7C15))
        }
    }
}

/// splitmix64 finalizer -- good hash for sequential inputs.
#[inline(always)]
fn splitmix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    x
}
