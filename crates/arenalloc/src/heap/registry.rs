//! Process-wide arena registry: a fixed table of arenas, a once-guarded
//! initializer, round-robin dispatch, and address-to-arena lookup for free.

use crate::config;
use crate::heap::arena::Arena;
use crate::util::MAX_ARENAS;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

const ARENA_INIT: Arena = Arena::new();
static ARENAS: [Arena; MAX_ARENAS] = [ARENA_INIT; MAX_ARENAS];

/// Number of live arenas; set once by `init`, read-only afterwards.
static COUNT: AtomicUsize = AtomicUsize::new(0);

/// Round-robin dispatch cursor. The fetch-add is the registry's only
/// lock-free coordination; serialization happens on each arena's mutex.
static NEXT: AtomicUsize = AtomicUsize::new(0);

const UNINIT: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const FAILED: u8 = 3;

static STATE: AtomicU8 = AtomicU8::new(UNINIT);

/// Read configuration, then map and seed every arena. Idempotent; safe to
/// call from racing threads -- losers wait for the winner's verdict.
pub fn init() -> bool {
    match STATE.compare_exchange(UNINIT, INITIALIZING, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {}
        Err(INITIALIZING) => {
            while STATE.load(Ordering::Acquire) == INITIALIZING {
                core::hint::spin_loop();
            }
            return STATE.load(Ordering::Acquire) == READY;
        }
        Err(state) => return state == READY,
    }

    unsafe { config::read_config() };
    let count = config::arena_count().clamp(1, MAX_ARENAS);

    let mut ok = true;
    for arena in &ARENAS[..count] {
        if !arena.ensure_heap() {
            ok = false;
            break;
        }
    }

    if ok {
        COUNT.store(count, Ordering::Release);
        STATE.store(READY, Ordering::Release);
    } else {
        STATE.store(FAILED, Ordering::Release);
    }
    ok
}

pub fn count() -> usize {
    COUNT.load(Ordering::Acquire)
}

/// The arena at `index`, for inspection by tests and debug tooling.
pub fn get(index: usize) -> Option<&'static Arena> {
    if index < count() {
        Some(&ARENAS[index])
    } else {
        None
    }
}

/// Round-robin dispatch. Every arena is eventually chosen; threads that
/// land on the same arena serialize on its mutex rather than retrying.
pub fn pick() -> &'static Arena {
    let count = count();
    debug_assert!(count > 0, "registry used before init");
    // Falling back to arena 0 keeps the path total; its heap seeds lazily.
    let count = count.max(1);
    let index = NEXT.fetch_add(1, Ordering::SeqCst) % count;
    &ARENAS[index]
}

/// The arena whose mapping contains `ptr`. Mappings are disjoint and fixed
/// once seeded, so the scan needs no locks. None means the pointer was not
/// produced by this allocator.
pub fn arena_for(ptr: *const u8) -> Option<&'static Arena> {
    ARENAS[..count()].iter().find(|arena| arena.contains(ptr))
}
