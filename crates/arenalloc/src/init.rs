//! Build-time variant selection and the process-wide allocator instance.
//!
//! Exactly one variant is active per build, chosen by cargo feature:
//! `naive` (one heap, one lock), `arena-only` (multi-arena), `passthrough`
//! (host allocator, for A/B benchmarking), or -- with no feature -- the
//! arena + thread-cache allocator.
//!
//! Each variant's `init` is idempotent and race-safe, so `ensure_initialized`
//! may be the first call on any thread.

use crate::allocator::VariantAlloc;

#[cfg(feature = "naive")]
pub use crate::allocator::naive::NaiveAllocator as ActiveAllocator;

#[cfg(all(feature = "arena-only", not(feature = "naive")))]
pub use crate::allocator::arena::ArenaAllocator as ActiveAllocator;

#[cfg(all(
    feature = "passthrough",
    not(any(feature = "naive", feature = "arena-only"))
))]
pub use crate::allocator::passthrough::PassthroughAllocator as ActiveAllocator;

#[cfg(not(any(feature = "naive", feature = "arena-only", feature = "passthrough")))]
pub use crate::allocator::cached::CachedAllocator as ActiveAllocator;

static ALLOCATOR: ActiveAllocator = ActiveAllocator;

/// The active allocator instance.
#[inline(always)]
pub fn allocator() -> &'static ActiveAllocator {
    &ALLOCATOR
}

/// Bring the active variant up if it is not already. Returns false when the
/// backing mappings could not be created; allocation then refuses to run.
#[inline]
pub fn ensure_initialized() -> bool {
    ALLOCATOR.init()
}
