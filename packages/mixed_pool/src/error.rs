use thiserror::Error;

/// Errors that can occur when addressing entries of a [`MixedPool`][crate::MixedPool].
///
/// Both variants are recoverable. A failed operation leaves the pool exactly as it was.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The caller provided an index that does not refer to an entry in the pool.
    ///
    /// Indexes are positions, not identities. An index that was valid a moment ago may have
    /// become invalid because another thread removed or cleared entries in the meantime.
    #[error("index {index} is out of range for a pool of {len} entries")]
    IndexOutOfRange {
        /// The index the caller asked for.
        index: usize,

        /// The number of entries in the pool at the time of the check.
        len: usize,
    },

    /// The entry exists but holds a value of a different type than the one requested.
    ///
    /// The check is an exact type comparison. No conversions are attempted.
    #[error("entry {index} holds a value of type `{stored}` but `{requested}` was requested")]
    TypeMismatch {
        /// The index of the entry that was accessed.
        index: usize,

        /// The name of the type the caller asked for.
        requested: &'static str,

        /// The name of the type actually stored in the entry.
        stored: &'static str,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
