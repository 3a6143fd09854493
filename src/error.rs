use thiserror::Error;

/// The ways an operation on a [`Dict`](crate::Dict) can fail.
///
/// A lookup miss is not an error: `find` and friends return `None`. Deleting a missing key is
/// reported as [`Error::KeyNotFound`] so the caller can tell whether anything happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// `add` was called with a key that is already present.
    #[error("key already exists")]
    KeyExists,

    /// `delete` was called with a key that is not present.
    #[error("key not found")]
    KeyNotFound,

    /// An explicit resize was requested while a rehash is still in progress.
    #[error("a rehash is already in progress")]
    Rehashing,

    /// An explicit resize was requested while rehashing is paused.
    #[error("rehashing is paused")]
    Paused,

    /// An explicit resize asked for a table that cannot hold the current entries, or that has the
    /// size the table already has.
    #[error("cannot resize to {requested} buckets with {used} entries")]
    InvalidSize {
        /// The number of buckets that was asked for.
        requested: usize,
        /// The number of entries in the dictionary at the time.
        used: usize,
    },

    /// The bucket array could not be allocated, or its size overflowed.
    #[error("failed to allocate a table of {buckets} buckets")]
    AllocationFailure {
        /// The number of buckets that were requested.
        buckets: usize,
    },
}
