//! A chained hash dictionary that spreads the cost of resizing across ordinary operations.
//!
//! Most hash table implementations must occasionally "resize" the backing memory as the number
//! of elements grows. That means allocating a new table (usually twice the size) and moving all
//! the elements from the old table to the new one, all in one go. As the table gets larger, the
//! operation that happens to trigger the resize takes longer and longer.
//!
//! For many applications that is fine. Where it becomes a problem is in long-lived servers that
//! keep ever-growing state in a single table and care about tail latency: it is simply not okay
//! for one insert to take tens of milliseconds when most take a microsecond.
//!
//! [`Dict`] instead does what is known as _incremental rehashing_. When the table needs to grow
//! or shrink, a second table of the new size is allocated, and from then on every lookup, insert,
//! and delete moves the entries of one more bucket across. Once the old table is empty it is
//! freed. Callers that have time to spare (a server's idle loop, say) can speed things along
//! with [`Dict::rehash`] or [`Dict::rehash_for_duration`].
//!
//! While a rehash is going on, both tables are live. Lookups check both, new entries always go
//! into the new table, and memory for the old table is not reclaimed until it has drained.
//!
//! # Behavior
//!
//! Entries are stored in per-bucket chains, and every table has a power-of-two number of buckets
//! (at least 4 once anything has been stored). What a dictionary does with its keys and values is
//! decided by a [`DictType`]: how to hash and compare keys, how to transform keys and values on
//! the way in, and how to dispose of them on the way out. [`Hashed`] covers the common case of
//! any `K: Hash + Eq`.
//!
//! Beyond the usual map operations, a `Dict` supports:
//!
//!  - [`Dict::random_entry`] and [`Dict::sample_entries`] for cheap random sampling, as needed
//!    for things like eviction.
//!  - [`Dict::scan`], a stateless cursor that visits every entry at least once even if the table
//!    is resized between calls.
//!  - [`Dict::safe_iter`], an iterator that may remove the entry it is on. It holds rehashing
//!    paused while it lives, so that nothing moves underneath it.
//!
//! How eagerly the table resizes itself is controlled per dictionary with [`ResizePolicy`],
//! which lets a process temporarily discourage resizing (while a forked child shares its memory,
//! for example).
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "ahash")] {
//! use trickle::{Dict, Error};
//!
//! let mut d = Dict::new();
//! for i in 0..1000 {
//!     d.add(i, i * 2).unwrap();
//! }
//! assert_eq!(d.add(7, 0), Err(Error::KeyExists));
//! assert_eq!(d.fetch_value(&7), Some(&14));
//!
//! // Get the table into its final shape.
//! while d.rehash(100) {}
//! assert_eq!(d.buckets(), 1024);
//! # }
//! ```
//!
//! # Features
//!
//!  - `std` (default): enables [`Dict::rehash_for_duration`], which needs a clock.
//!  - `ahash` (default): uses [`ahash`](https://crates.io/crates/ahash) as the default hasher,
//!    and provides [`Dict::new`].
//!  - `stats`: enables [`Dict::stats`] for chain length statistics.
//!
//! # Logging
//!
//! The crate logs through the [`log`](https://crates.io/crates/log) facade: resizes and
//! completed rehashes at `debug`, refused or failed growth at `warn`, and timed rehashing
//! at `trace`. Nothing is logged on the lookup path.

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
#[cfg_attr(test, macro_use)]
extern crate std;

mod dict;
mod dict_type;
mod error;
mod iter;
mod random;
mod raw;
mod rehash;
mod scan;
#[cfg(feature = "stats")]
mod stats;

#[cfg(test)]
mod test_util;

pub use crate::dict::{Dict, ResizePolicy};
pub use crate::dict_type::{DefaultHashBuilder, DictType, Hashed};
pub use crate::error::Error;
pub use crate::iter::{Iter, SafeIter};
pub use crate::raw::Entry;
#[cfg(feature = "stats")]
pub use crate::stats::{Stats, TableStats, HISTOGRAM_LEN};
