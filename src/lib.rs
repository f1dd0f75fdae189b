//! # CART - Concurrent Adaptive Radix Tree
//!
//! An in-memory index keyed by byte strings, built for many concurrent
//! readers and writers over keys with shared prefixes.
//!
//! ## Overview
//!
//! The tree is an Adaptive Radix Tree (ART): a path-compressed trie whose
//! inner nodes adapt their fan-out representation (4, 16, 48 or 256
//! children) to how densely populated they are. Concurrency uses optimistic
//! lock coupling: every node carries a 64-bit version word, readers traverse
//! without locking and validate versions after the fact, and writers take
//! short per-node write locks via compare-and-swap. An operation that
//! observes a concurrent mutation restarts from the root; restarts are
//! counted but never surface to callers.
//!
//! - **Lock-free lookups**: `search` never takes a lock
//! - **Fine-grained writes**: `insert` locks at most two nodes at a time
//! - **Space efficient**: fan-out classes and compressed prefixes adapt to
//!   the key population
//! - **Linearizable per key**: a lookup sees the most recent completed
//!   insert for its key
//!
//! ## Quick Start
//!
//! ```rust
//! use cart::ConcurrentAdaptiveRadixTree;
//!
//! let tree = ConcurrentAdaptiveRadixTree::<String>::new();
//!
//! tree.insert("hello", "world".to_string());
//! tree.insert("foo", "bar".to_string());
//!
//! assert_eq!(tree.search("hello"), Some("world".to_string()));
//! assert_eq!(tree.search("missing"), None);
//! ```
//!
//! All operations take `&self` and the tree is `Send + Sync` for suitable
//! value types, so it can be shared across threads directly or behind an
//! `Arc`:
//!
//! ```rust
//! use cart::ConcurrentAdaptiveRadixTree;
//!
//! let tree = ConcurrentAdaptiveRadixTree::<u64>::new();
//! std::thread::scope(|s| {
//!     for t in 0..4u64 {
//!         let tree = &tree;
//!         s.spawn(move || {
//!             for i in 0..100 {
//!                 tree.insert(format!("thread{t}-key{i}"), t * 1000 + i);
//!             }
//!         });
//!     }
//! });
//! assert_eq!(tree.search("thread2-key42"), Some(2042));
//! ```
//!
//! ## Keys
//!
//! Keys are arbitrary byte sequences of any length, including empty, with
//! one restriction: the byte `0xFF` is reserved as the internal "key ends
//! here" edge marker and must not appear in user keys.

// Private implementation modules
mod mapping;
mod node;
mod partial;
mod utils;

// Public API modules
pub mod stats;
pub mod tree;

// Re-export main types for convenience
pub use stats::TreeStats;
pub use tree::ConcurrentAdaptiveRadixTree;
