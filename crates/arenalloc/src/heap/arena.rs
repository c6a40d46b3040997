//! One arena: a 128 MiB anonymous mapping managed as a boundary-tagged heap
//! with segregated free lists, guarded by a futex mutex.
//!
//! The heap begins with a prologue word (zero size, allocated) and ends with
//! an epilogue word (zero size, allocated, prev-alloc mirroring the last
//! block). The sentinels terminate boundary-tag traversal in both
//! directions without special cases.

use crate::heap::block::{self, BlockRef, Word};
use crate::heap::seglist::SegLists;
use crate::platform;
use crate::sync::RawMutex;
use crate::util::{
    is_aligned, round_up, ARENA_MAX_SIZE, CHUNK_SIZE, DSIZE, MIN_ALIGN, MIN_BLOCK_SIZE, WSIZE,
};
use core::cell::UnsafeCell;
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

struct ArenaInner {
    /// Start of the mapping. The prologue lives in its first word.
    base: *mut u8,
    /// First block boundary: the address where the initial epilogue was
    /// written, which became the first block's header on the first
    /// extension.
    heap_start: *mut u8,
    /// One past the usable heap; the epilogue sits one word below.
    heap_end: *mut u8,
    seglists: SegLists,
}

/// Cache-line aligned to keep neighboring arenas off each other's lines.
#[repr(C, align(128))]
pub struct Arena {
    /// Mapping start, zero until the heap is seeded. Written once under the
    /// lock; read lock-free by [`Arena::contains`]. The mapping range never
    /// changes afterwards, which is what makes the lock-free ownership test
    /// sound.
    base: AtomicUsize,
    lock: RawMutex,
    inner: UnsafeCell<ArenaInner>,
}

unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl Arena {
    pub const fn new() -> Self {
        Arena {
            base: AtomicUsize::new(0),
            lock: RawMutex::new(),
            inner: UnsafeCell::new(ArenaInner {
                base: ptr::null_mut(),
                heap_start: ptr::null_mut(),
                heap_end: ptr::null_mut(),
                seglists: SegLists::new(),
            }),
        }
    }

    /// Map and seed the heap if that has not happened yet. Returns false if
    /// the OS refused the mapping. Safe to race; the mutex serializes.
    pub fn ensure_heap(&self) -> bool {
        if self.base.load(Ordering::Acquire) != 0 {
            return true;
        }
        self.lock.lock();
        let ok = unsafe { self.ensure_heap_locked() };
        self.lock.unlock();
        ok
    }

    /// True when `ptr` falls inside this arena's mapping. Every payload this
    /// arena handed out satisfies this, and mappings are disjoint, so the
    /// test identifies the owning arena exactly.
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.base.load(Ordering::Acquire);
        base != 0 && (base..base + ARENA_MAX_SIZE).contains(&(ptr as usize))
    }

    /// Allocate `size` bytes from this arena. Null when `size` is zero or
    /// the mapping cannot fit the adjusted block.
    ///
    /// # Safety
    /// The returned pointer is owned by the caller until passed to
    /// [`Arena::free`].
    pub unsafe fn alloc(&self, size: usize) -> *mut u8 {
        self.lock.lock();
        let result = if self.ensure_heap_locked() {
            Self::alloc_inner(&mut *self.inner.get(), size)
        } else {
            ptr::null_mut()
        };
        self.lock.unlock();
        result
    }

    /// Free a payload pointer previously returned by [`Arena::alloc`].
    ///
    /// # Safety
    /// `payload` must belong to this arena and be live.
    pub unsafe fn free(&self, payload: *mut u8) {
        self.free_block(BlockRef::from_payload(payload));
    }

    /// Free by block reference. Used by the thread cache when it evicts a
    /// block whose header still says allocated.
    ///
    /// # Safety
    /// `block` must be a live allocated block of this arena.
    pub unsafe fn free_block(&self, block: BlockRef) {
        self.lock.lock();
        Self::free_inner(&mut *self.inner.get(), block);
        self.lock.unlock();
    }

    /// Walk the whole heap and the free lists, counting boundary-tag and
    /// list violations. Debug and test tooling; takes the lock.
    ///
    /// # Safety
    /// Caller must not hold this arena's lock.
    pub unsafe fn check(&self) -> HeapReport {
        self.lock.lock();
        let report = if self.base.load(Ordering::Relaxed) != 0 {
            Self::check_inner(&*self.inner.get())
        } else {
            HeapReport::default()
        };
        self.lock.unlock();
        report
    }

    unsafe fn ensure_heap_locked(&self) -> bool {
        if self.base.load(Ordering::Relaxed) != 0 {
            return true;
        }
        let base = platform::map_anonymous(ARENA_MAX_SIZE);
        if base.is_null() {
            return false;
        }

        let inner = &mut *self.inner.get();
        inner.base = base;

        // Prologue (a block footer) and epilogue (a block header); the
        // epilogue becomes the first real header once the heap grows.
        let start = base as *mut Word;
        start.write(block::pack(0, true, true));
        start.add(1).write(block::pack(0, true, true));
        inner.heap_start = base.add(WSIZE);
        inner.heap_end = base.add(2 * WSIZE);

        if Self::extend_heap(inner, CHUNK_SIZE, true).is_none() {
            return false;
        }

        self.base.store(base as usize, Ordering::Release);
        true
    }

    /// Grow the usable heap by at least `size` bytes (rounded to the block
    /// granularity). The old epilogue word becomes the new free block's
    /// header; a fresh epilogue is written at the new end. The new block is
    /// coalesced backward and inserted into its free list.
    unsafe fn extend_heap(
        inner: &mut ArenaInner,
        size: usize,
        prev_alloc: bool,
    ) -> Option<BlockRef> {
        let size = round_up(size, DSIZE);

        let end = inner.heap_end as usize;
        let new_end = end.checked_add(size)?;
        if new_end > inner.base as usize + ARENA_MAX_SIZE {
            return None; // out of address space for this arena
        }
        let payload = inner.heap_end;
        inner.heap_end = new_end as *mut u8;

        let block = BlockRef::from_payload(payload);
        block.write(size, false, prev_alloc);
        block.next().write_epilogue(false);

        let block = Self::coalesce(inner, block);
        inner.seglists.add(block);
        Some(block)
    }

    /// Merge `block` with free neighbors, keyed by the (prev, next)
    /// allocation bits. Afterwards the follower of the merged region has
    /// its prev-alloc bit cleared.
    unsafe fn coalesce(inner: &mut ArenaInner, block: BlockRef) -> BlockRef {
        debug_assert!(!block.is_alloc());

        let next = block.next();
        let prev_alloc = block.prev_alloc();
        let next_alloc = next.is_alloc();
        let curr_size = block.size();

        let merged = match (prev_alloc, next_alloc) {
            (true, true) => return block,
            (true, false) => {
                inner.seglists.remove(next);
                block.write(curr_size + next.size(), false, true);
                block
            }
            (false, true) => {
                let prev = block.prev();
                debug_assert!(prev != block);
                inner.seglists.remove(prev);
                prev.write(prev.size() + curr_size, false, prev.prev_alloc());
                prev
            }
            (false, false) => {
                let prev = block.prev();
                debug_assert!(prev != block);
                inner.seglists.remove(next);
                inner.seglists.remove(prev);
                prev.write(
                    prev.size() + curr_size + next.size(),
                    false,
                    prev.prev_alloc(),
                );
                prev
            }
        };

        merged.next().rewrite_prev_alloc(false);
        merged
    }

    /// Carve a free remainder off an allocated block when at least a
    /// minimum block is left over; otherwise the slack stays internal.
    unsafe fn split(inner: &mut ArenaInner, block: BlockRef, asize: usize) {
        debug_assert!(block.is_alloc());

        let block_size = block.size();
        if block_size - asize >= MIN_BLOCK_SIZE {
            block.write(asize, true, block.prev_alloc());
            let rest = block.next();
            rest.write(block_size - asize, false, true);
            inner.seglists.add(rest);
        }
    }

    unsafe fn alloc_inner(inner: &mut ArenaInner, size: usize) -> *mut u8 {
        if size == 0 || size > ARENA_MAX_SIZE {
            return ptr::null_mut();
        }

        // Header overhead, then the 16-byte granularity with a 32-byte floor.
        let asize = round_up(size + WSIZE, DSIZE);

        let block = match inner.seglists.find_fit(asize) {
            Some(block) => block,
            None => {
                // The epilogue's prev-alloc bit seeds the new block's header.
                let epilogue = BlockRef::from_payload(inner.heap_end);
                let prev_alloc = epilogue.prev_alloc();
                match Self::extend_heap(inner, asize.max(CHUNK_SIZE), prev_alloc) {
                    Some(block) => block,
                    None => return ptr::null_mut(),
                }
            }
        };

        debug_assert!(!block.is_alloc());
        let block_size = block.size();
        block.write(block_size, true, block.prev_alloc());
        inner.seglists.remove(block);
        Self::split(inner, block, asize);

        // The follower (split remainder, a neighbor, or the epilogue) now
        // has an allocated predecessor.
        block.next().rewrite_prev_alloc(true);
        block.payload()
    }

    unsafe fn free_inner(inner: &mut ArenaInner, block: BlockRef) {
        debug_assert!(block.is_alloc(), "freeing a block that is not allocated");

        let size = block.size();
        block.write(size, false, block.prev_alloc());
        block.next().rewrite_prev_alloc(false);

        let block = Self::coalesce(inner, block);
        inner.seglists.add(block);
    }

    unsafe fn check_inner(inner: &ArenaInner) -> HeapReport {
        let mut report = HeapReport::default();
        let heap_end = inner.heap_end as usize;

        let mut block = BlockRef::from_header(inner.heap_start);
        let mut prev_alloc_bit = true; // the prologue is allocated
        let mut prev_was_free = false;

        while block.size() != 0 {
            let size = block.size();
            report.blocks += 1;

            if size < MIN_BLOCK_SIZE || size % DSIZE != 0 {
                report.errors += 1;
            }
            if !is_aligned(block.payload() as usize, MIN_ALIGN) {
                report.errors += 1;
            }
            if block.prev_alloc() != prev_alloc_bit {
                report.errors += 1;
            }

            if block.is_alloc() {
                prev_was_free = false;
            } else {
                if prev_was_free {
                    report.errors += 1; // adjacent free blocks escaped coalescing
                }
                if block.header() != block.footer() {
                    report.errors += 1;
                }
                report.free_blocks += 1;
                report.free_bytes += size;
                if size > report.largest_free {
                    report.largest_free = size;
                }
                prev_was_free = true;
            }

            prev_alloc_bit = block.is_alloc();

            let next_addr = block.addr() as usize + size;
            if next_addr > heap_end - WSIZE {
                report.errors += 1; // walked past the epilogue slot
                return report;
            }
            block = block.next();
        }

        // Epilogue: allocated sentinel at heap_end - 8 mirroring the last
        // block's allocation.
        if !block.is_alloc() || block.prev_alloc() != prev_alloc_bit {
            report.errors += 1;
        }
        if block.addr() as usize != heap_end - WSIZE {
            report.errors += 1;
        }

        // Every listed block must be free and filed under its own class.
        for (index, head) in inner.seglists.heads().iter().enumerate() {
            let mut cursor = *head;
            while let Some(listed) = cursor {
                report.listed_blocks += 1;
                if listed.is_alloc() {
                    report.errors += 1;
                }
                if SegLists::class_for(listed.size()) != index {
                    report.errors += 1;
                }
                if report.listed_blocks > report.blocks {
                    report.errors += 1; // list cycle
                    return report;
                }
                cursor = listed.list_next();
            }
        }

        report
    }
}

/// Tallies from one full heap walk. `errors` counts boundary-tag, sentinel,
/// and list violations; a healthy heap reports zero and equal free/listed
/// block counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapReport {
    pub blocks: usize,
    pub free_blocks: usize,
    pub listed_blocks: usize,
    pub free_bytes: usize,
    pub largest_free: usize,
    pub errors: usize,
}

impl HeapReport {
    pub fn consistent(&self) -> bool {
        self.errors == 0 && self.free_blocks == self.listed_blocks
    }
}
