/// Align `value` up to the next multiple of `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Check if `value` is aligned to `align`.
#[inline(always)]
pub const fn is_aligned(value: usize, align: usize) -> bool {
    value & (align - 1) == 0
}

/// Round `size` up to a multiple of `n`, but never below `2 * n`.
/// The floor is what guarantees the minimum block size: a one-byte request
/// rounds to a full 32-byte block (header + two list links + footer).
#[inline(always)]
pub const fn round_up(size: usize, n: usize) -> usize {
    if size <= n {
        2 * n
    } else {
        n * ((size + (n - 1)) / n)
    }
}

/// Header/footer word size.
pub const WSIZE: usize = core::mem::size_of::<u64>();

/// Double word: the block alignment and size granularity.
pub const DSIZE: usize = 2 * WSIZE;

/// Minimum block size: header + two list links + footer.
pub const MIN_BLOCK_SIZE: usize = 2 * DSIZE;

/// Alignment of every payload pointer handed to callers.
pub const MIN_ALIGN: usize = 16;

/// Granularity of heap extension; an empty arena is seeded with one chunk.
pub const CHUNK_SIZE: usize = 1 << 12;

/// Capacity of one arena's mapping. Requests whose block cannot fit fail the
/// extension and surface as null.
pub const ARENA_MAX_SIZE: usize = CHUNK_SIZE << 15; // 128 MiB

/// Capacity of the static arena table; the live count is configured at init.
pub const MAX_ARENAS: usize = 32;

/// Number of segregated free lists per arena.
pub const MAX_LISTS: usize = 15;

/// Blocks visited per list before a search gives up.
pub const MAX_LIST_SEARCH: usize = 15;

/// Lists probed per fit attempt: the minimum feasible class and the next one.
pub const LIST_PROBE_DEPTH: usize = 2;

/// Maximum blocks held in one thread's cache.
pub const CACHE_MAX_ENTRIES: usize = 8;

/// Maximum bytes held in one thread's cache. Keeps a single thread from
/// hoarding memory the arenas could otherwise reuse.
pub const CACHE_MAX_SIZE: usize = 1 << 20;

/// Probability of evicting from a full cache instead of bypassing it.
/// Cached blocks may still serve future allocations, so neither never-evict
/// nor always-evict wins.
pub const CACHE_EVICT_PROBABILITY: f64 = 0.1;
