#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`MixedPool`], a thread-safe ordered pool that stores values of any
//! type and hands them back only to callers that name the right type.
//!
//! It is useful when a component needs to hold a loosely-typed sequence of resources (plugins,
//! mixed test fixtures, heterogeneous configuration entries) without defining a closed enum of
//! all possible types up front.
//!
//! # Features
//!
//! - **Type erasure**: Accepts any `Send + Sync + 'static` type; different types share one pool.
//! - **Checked retrieval**: Every read performs an exact type check and fails with
//!   [`Error::TypeMismatch`] instead of reinterpreting memory.
//! - **Positional addressing**: Entries are addressed by a dense zero-based index.
//! - **Multi-reader, single-writer**: Lookups run in parallel; mutations are exclusive.
//! - **Lock-free length**: [`MixedPool::len()`] reads a shadow counter without locking.
//! - **All-or-nothing insertion**: A constructor that fails or panics leaves the pool untouched.
//! - **Optional leak detection**: The pool can be configured to panic on drop if entries remain.
//!
//! # Indexes are not identities
//!
//! Removing an entry shifts every later entry one position earlier. An index held by one thread
//! may point at a different entry after another thread removes something. Type checks keep this
//! memory-safe, but callers that need durable references across removals must coordinate
//! externally or use [`MixedPool::take()`] to move values out.
//!
//! # Example
//!
//! ```rust
//! use mixed_pool::{Error, MixedPool};
//!
//! struct Plugin {
//!     name: &'static str,
//! }
//!
//! let pool = MixedPool::new();
//!
//! pool.add(Plugin { name: "compressor" });
//! pool.add(vec![1_u32, 2, 3]);
//!
//! assert_eq!(pool.get::<Plugin>(0)?.name, "compressor");
//! assert_eq!(pool.get::<Vec<u32>>(1)?.len(), 3);
//!
//! // Asking for the wrong type is an error, not undefined behavior.
//! assert!(matches!(
//!     pool.get::<Vec<u64>>(1),
//!     Err(Error::TypeMismatch { .. })
//! ));
//! # Ok::<(), Error>(())
//! ```
//!
//! Sharing between threads:
//!
//! ```rust
//! use std::thread;
//!
//! use mixed_pool::MixedPool;
//!
//! let pool = MixedPool::new();
//! pool.add(42_u64);
//!
//! thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             assert_eq!(*pool.get::<u64>(0).unwrap(), 42);
//!         });
//!     }
//! });
//! ```

mod builder;
mod drop_policy;
mod error;
mod holder;
mod pool;

pub use builder::*;
pub use drop_policy::*;
pub use error::*;
pub(crate) use holder::*;
pub use pool::*;
