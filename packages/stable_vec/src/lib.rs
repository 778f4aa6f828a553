//! A growable sequence container whose elements never move in memory once
//! inserted - a stable-address vector.
//!
//! An ordinary `Vec<T>` relocates every element when it outgrows its capacity,
//! invalidating any previously obtained pointer. This crate provides
//! [`StableVec`], which decouples sequence growth from element storage: each
//! element lives in a fixed slot of a pooled allocator and the sequence holds
//! only small owning handles. Growth reallocates handles, never elements.
//!
//! # Key features
//!
//! - **Stable addresses**: a pointer to an element stays valid until that
//!   specific element is removed or overwritten, across `push`, `insert`,
//!   `reserve` and `shrink_to_fit`
//! - **Pooled slot allocation**: slots are carved from larger backing regions
//!   and recycled through a free list, so element churn does not hit the
//!   system allocator
//! - **Owning handles**: [`SlotBox`] pairs one slot with one value; cloning a
//!   handle duplicates the value into a fresh slot rather than aliasing it
//! - **Compile-time fast path**: for primitives and pointers, [`DirectVec`]
//!   skips the indirection entirely and behaves like a plain `Vec<T>`
//! - **No whole-container copying**: duplicating a sequence is always
//!   explicit, element by element
//!
//! # Examples
//!
//! ## Addresses survive growth
//!
//! ```rust
//! use stable_vec::StableVec;
//!
//! let mut items: StableVec<String> = StableVec::new();
//! items.push("anchored".to_string());
//!
//! let address: *const String = &items[0];
//!
//! for i in 0..10_000 {
//!     items.push(i.to_string());
//! }
//!
//! // The first element never moved.
//! assert_eq!(address, std::ptr::from_ref(&items[0]));
//! ```
//!
//! ## The pass-through fast path
//!
//! ```rust
//! use stable_vec::DirectVec;
//!
//! let mut numbers: DirectVec<u32> = DirectVec::new();
//! numbers.push(1);
//! numbers.push(2);
//! numbers.push(3);
//!
//! numbers.remove(1);
//! assert_eq!(numbers, [1, 3]);
//! ```
//!
//! ## Using the pool and handles directly
//!
//! ```rust
//! use stable_vec::SlotPool;
//!
//! let pool = SlotPool::<String>::new();
//!
//! let greeting = pool.insert("hello".to_string());
//! let duplicate = greeting.clone();
//!
//! // Equal values, distinct slots.
//! assert_eq!(*greeting, *duplicate);
//! assert_ne!(greeting.ptr(), duplicate.ptr());
//! ```
//!
//! # Thread safety
//!
//! The slotted types are single-threaded by construction (neither [`Send`]
//! nor [`Sync`]); this is a resource-ownership container, not a concurrent
//! data structure. [`DirectVec`] carries no pool and stays as thread-mobile
//! as the `Vec` it wraps.

mod builder;
mod direct;
mod error;
mod handle;
mod iter;
mod pool;
mod raw_pool;
mod slotted;
mod storage;
mod vec;

mod sealed {
    /// Restricts [`Storage`][crate::Storage] implementations to this crate.
    pub trait Sealed {}
}

pub use builder::SlotPoolBuilder;
pub use direct::{Direct, DirectElement};
pub use error::ReserveError;
pub use handle::SlotBox;
pub use iter::{IntoIter, Iter, IterMut};
pub use pool::SlotPool;
pub use slotted::Slotted;
pub use storage::Storage;
pub use vec::{DirectVec, StableVec};
