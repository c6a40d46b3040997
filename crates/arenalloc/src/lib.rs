//! A multithreaded dynamic memory allocator: per-arena segregated free-list
//! heaps over anonymous mappings, round-robin arena dispatch, and a
//! per-thread cache of recently freed blocks.
//!
//! Three interchangeable variants (plus a host-allocator passthrough) share
//! one public surface so they can be benchmarked against each other; see
//! [`init`] for the build-time selection.

extern crate libc;

pub mod allocator;
pub mod api;
pub mod config;
mod global_alloc;
pub mod heap;
pub mod init;
pub mod platform;
pub mod sync;
pub mod util;

pub use global_alloc::ArenaMalloc;
