#![cfg(feature = "global-allocator")]

//! Runs the standard library's own allocations through the allocator.
//! Gated behind a feature because every allocation in this binary, test
//! harness included, goes through the engine.

use arenalloc::ArenaMalloc;

#[global_allocator]
static GLOBAL: ArenaMalloc = ArenaMalloc;

#[test]
fn basic_alloc_and_free() {
    let b = Box::new(42u64);
    assert_eq!(*b, 42);
    drop(b);

    let mut v: Vec<u32> = Vec::new();
    for i in 0..1000 {
        v.push(i);
    }
    assert_eq!(v.len(), 1000);
    assert_eq!(v[999], 999);
    drop(v);

    let s = String::from("hello, arenalloc global allocator!");
    assert_eq!(s, "hello, arenalloc global allocator!");
    drop(s);
}

#[test]
fn zero_size_alloc() {
    let mut v: Vec<()> = Vec::new();
    for _ in 0..100 {
        v.push(());
    }
    assert_eq!(v.len(), 100);
    drop(v);

    let v: Vec<u8> = Vec::new();
    assert_eq!(v.len(), 0);
    drop(v);
}

#[test]
fn grow_and_shrink() {
    let mut v: Vec<u64> = Vec::with_capacity(1);
    for i in 0..100_000u64 {
        v.push(i);
    }
    assert_eq!(v.iter().sum::<u64>(), 100_000 * 99_999 / 2);
    v.truncate(10);
    v.shrink_to_fit();
    assert_eq!(v.len(), 10);
    drop(v);
}

#[test]
fn many_small_boxes_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|tid| {
            std::thread::spawn(move || {
                let mut boxes = Vec::new();
                for i in 0..1000usize {
                    boxes.push(Box::new(i * tid));
                }
                boxes.iter().map(|b| **b).sum::<usize>()
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
