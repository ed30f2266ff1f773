use std::any::type_name;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{fmt, mem, thread};

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use tracing::{debug, trace};

use crate::{DropPolicy, ErasedHolder, Error, Holder, MixedPoolBuilder, Result};

/// A thread-safe, ordered pool of values of any type, addressed by position.
///
/// Each entry owns exactly one value. The concrete type of the value is erased for storage and
/// recovered on every read through an exact type check: asking for the wrong type yields
/// [`Error::TypeMismatch`], never a reinterpretation of the stored bytes.
///
/// # Positional addressing
///
/// Entries are addressed by a zero-based index that is simply the number of entries before
/// them. An index is not an identity: [`remove()`][Self::remove] and [`take()`][Self::take]
/// shift every later entry one position earlier, and [`clear()`][Self::clear] invalidates
/// every index. When several threads mutate the same pool, an index observed by one thread may
/// refer to a different entry (or to no entry) by the time it is used. Type checks still hold,
/// so the worst outcome of a stale index is an error or a different value of the requested
/// type, never memory unsafety.
///
/// # Thread safety
///
/// The entry sequence is guarded by a reader/writer lock:
///
/// * [`get()`][Self::get] and the other read-only lookups take the lock in shared mode and may
///   run in parallel with each other. Shared access is recursive: a thread that already holds a
///   guard from [`get()`][Self::get] may perform further lookups even while a writer is queued.
/// * [`add()`][Self::add], [`remove()`][Self::remove], [`take()`][Self::take],
///   [`clear()`][Self::clear] and [`get_mut()`][Self::get_mut] take the lock in exclusive mode.
/// * [`len()`][Self::len] does not take the lock at all. See its documentation for the
///   consistency guarantees this implies.
///
/// All operations block until the lock is available. There are no timeouts.
///
/// Share the pool between threads by reference (e.g. with [`std::thread::scope`]) or by
/// wrapping it in an [`Arc`][std::sync::Arc].
///
/// # Example
///
/// ```rust
/// use mixed_pool::{Error, MixedPool};
///
/// let pool = MixedPool::new();
///
/// pool.add(42_i32);
/// pool.add("hi".to_string());
/// pool.add(2.5_f64);
///
/// assert_eq!(pool.len(), 3);
/// assert_eq!(*pool.get::<i32>(0)?, 42);
/// assert_eq!(*pool.get::<String>(1)?, "hi");
/// assert!(matches!(
///     pool.get::<i32>(1),
///     Err(Error::TypeMismatch { .. })
/// ));
///
/// pool.remove(0)?;
///
/// assert_eq!(pool.len(), 2);
/// assert_eq!(*pool.get::<String>(0)?, "hi");
/// assert_eq!(pool.get_cloned::<f64>(1)?.to_bits(), 2.5_f64.to_bits());
/// # Ok::<(), Error>(())
/// ```
pub struct MixedPool {
    entries: RwLock<Vec<Box<dyn ErasedHolder>>>,

    /// Shadow of `entries.len()`, written only while the exclusive lock is held.
    len: AtomicUsize,

    drop_policy: DropPolicy,
}

impl MixedPool {
    /// Creates a new, empty pool with default configuration.
    ///
    /// For custom configuration, use [`MixedPool::builder()`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    ///
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring and constructing a [`MixedPool`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{DropPolicy, MixedPool};
    ///
    /// let pool = MixedPool::builder()
    ///     .capacity(8)
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    pub fn builder() -> MixedPoolBuilder {
        MixedPoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            entries: RwLock::new(Vec::with_capacity(capacity)),
            len: AtomicUsize::new(0),
            drop_policy,
        }
    }

    /// Appends a value to the end of the pool and returns the index it was stored at.
    ///
    /// The returned index is only meaningful until the next removal from the pool, which may
    /// happen on another thread at any time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    ///
    /// assert_eq!(pool.add(1_u8), 0);
    /// assert_eq!(pool.add("two"), 1);
    /// assert_eq!(pool.len(), 2);
    /// ```
    pub fn add<T>(&self, value: T) -> usize
    where
        T: Send + Sync + 'static,
    {
        self.push(Holder::erased(value))
    }

    /// Constructs a value with the given function and appends it to the end of the pool.
    ///
    /// The value is constructed before the pool is locked. If the function panics, the panic
    /// propagates unchanged and the pool is not modified.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    ///
    /// let index = pool.add_with(|| Vec::from_iter(0_u32..100));
    ///
    /// assert_eq!(pool.get::<Vec<u32>>(index).unwrap().len(), 100);
    /// ```
    pub fn add_with<T, F>(&self, construct: F) -> usize
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.push(Holder::erased(construct()))
    }

    /// Constructs a value with a fallible function and, if construction succeeds, appends it
    /// to the end of the pool.
    ///
    /// Construction errors are returned unchanged and leave the pool untouched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    ///
    /// let added = pool.try_add_with(|| "42".parse::<u64>());
    /// assert_eq!(added, Ok(0));
    ///
    /// let failed = pool.try_add_with(|| "forty-two".parse::<u64>());
    /// assert!(failed.is_err());
    /// assert_eq!(pool.len(), 1);
    /// ```
    pub fn try_add_with<T, E, F>(&self, construct: F) -> std::result::Result<usize, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let value = construct()?;
        Ok(self.push(Holder::erased(value)))
    }

    fn push(&self, holder: Box<dyn ErasedHolder>) -> usize {
        let type_name = holder.held_type_name();

        let index = {
            let mut entries = self.entries.write();
            let index = entries.len();
            entries.push(holder);
            self.len.store(entries.len(), Ordering::Release);
            index
        };

        trace!(index, type_name, "added entry");

        index
    }

    /// Returns shared access to the value at `index`, provided it is of type `T`.
    ///
    /// The returned guard holds the pool's lock in shared mode. Other readers may proceed in
    /// parallel but every structural mutation ([`add()`][Self::add], [`remove()`][Self::remove],
    /// [`take()`][Self::take], [`clear()`][Self::clear]) waits until the guard is dropped.
    /// Further lookups on the same thread are fine while the guard is held, even if a writer is
    /// already waiting. Do not call a mutating method on the same thread while holding the
    /// guard, as that deadlocks.
    ///
    /// # Errors
    ///
    /// * [`Error::IndexOutOfRange`] if there is no entry at `index`.
    /// * [`Error::TypeMismatch`] if the entry does not hold exactly a `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add("hello".to_string());
    ///
    /// assert_eq!(pool.get::<String>(0)?.len(), 5);
    /// assert!(matches!(pool.get::<&str>(0), Err(Error::TypeMismatch { .. })));
    /// assert!(matches!(pool.get::<String>(1), Err(Error::IndexOutOfRange { .. })));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn get<T: 'static>(&self, index: usize) -> Result<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.entries.read_recursive(), |entries| {
            entries.get(index)?.downcast_ref::<T>()
        })
        .map_err(|entries| lookup_error::<T>(&entries, index))
    }

    /// Returns exclusive access to the value at `index`, provided it is of type `T`.
    ///
    /// This takes the pool's lock in exclusive mode for as long as the guard lives, blocking
    /// all other access except [`len()`][Self::len]. It is not a structural mutation: no entry
    /// is added, removed or renumbered.
    ///
    /// # Errors
    ///
    /// * [`Error::IndexOutOfRange`] if there is no entry at `index`.
    /// * [`Error::TypeMismatch`] if the entry does not hold exactly a `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add(vec![1, 2, 3]);
    ///
    /// pool.get_mut::<Vec<i32>>(0)?.push(4);
    ///
    /// assert_eq!(*pool.get::<Vec<i32>>(0)?, vec![1, 2, 3, 4]);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn get_mut<T: 'static>(&self, index: usize) -> Result<MappedRwLockWriteGuard<'_, T>> {
        RwLockWriteGuard::try_map(self.entries.write(), |entries| {
            entries.get_mut(index)?.downcast_mut::<T>()
        })
        .map_err(|entries| lookup_error::<T>(&entries, index))
    }

    /// Returns a clone of the value at `index`, provided it is of type `T`.
    ///
    /// Unlike [`get()`][Self::get], nothing is retained that keeps the pool locked.
    ///
    /// # Errors
    ///
    /// * [`Error::IndexOutOfRange`] if there is no entry at `index`.
    /// * [`Error::TypeMismatch`] if the entry does not hold exactly a `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add("snapshot".to_string());
    ///
    /// let copy: String = pool.get_cloned(0)?;
    /// pool.clear();
    ///
    /// assert_eq!(copy, "snapshot");
    /// # Ok::<(), Error>(())
    /// ```
    pub fn get_cloned<T>(&self, index: usize) -> Result<T>
    where
        T: Clone + 'static,
    {
        self.get::<T>(index).map(|value| T::clone(&value))
    }

    /// Checks whether the entry at `index` holds exactly a `T`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if there is no entry at `index`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add(42_u64);
    ///
    /// assert!(pool.is::<u64>(0)?);
    /// assert!(!pool.is::<u32>(0)?);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn is<T: 'static>(&self, index: usize) -> Result<bool> {
        let entries = self.entries.read_recursive();

        entries
            .get(index)
            .map(|holder| holder.type_matches::<T>())
            .ok_or_else(|| out_of_range(&entries, index))
    }

    /// Returns the name of the type stored at `index`.
    ///
    /// The name is meant for diagnostics. Its exact format is not stable across compiler
    /// versions and it must not be used to identify types.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if there is no entry at `index`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add(42_u64);
    ///
    /// assert_eq!(pool.type_name_at(0)?, "u64");
    /// # Ok::<(), Error>(())
    /// ```
    pub fn type_name_at(&self, index: usize) -> Result<&'static str> {
        let entries = self.entries.read_recursive();

        entries
            .get(index)
            .map(|holder| holder.held_type_name())
            .ok_or_else(|| out_of_range(&entries, index))
    }

    /// Returns the names of the stored types, in index order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    /// pool.add(1_u8);
    /// pool.add(2_i64);
    ///
    /// assert_eq!(pool.type_names(), ["u8", "i64"]);
    /// ```
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries
            .read_recursive()
            .iter()
            .map(|holder| holder.held_type_name())
            .collect()
    }

    /// Removes the entry at `index` and drops its value.
    ///
    /// Every entry after `index` moves one position earlier. The value is dropped after the
    /// pool's lock has been released, so its destructor may itself access the pool.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if there is no entry at `index`. The pool is not modified.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add('a');
    /// pool.add('b');
    ///
    /// pool.remove(0)?;
    ///
    /// // The entry that was at index 1 is now at index 0.
    /// assert_eq!(*pool.get::<char>(0)?, 'b');
    /// # Ok::<(), Error>(())
    /// ```
    pub fn remove(&self, index: usize) -> Result<()> {
        let removed = {
            let mut entries = self.entries.write();

            if index >= entries.len() {
                return Err(out_of_range(&entries, index));
            }

            let removed = entries.remove(index);
            self.len.store(entries.len(), Ordering::Release);
            removed
        };

        trace!(index, type_name = removed.held_type_name(), "removed entry");

        drop(removed);
        Ok(())
    }

    /// Removes the entry at `index` and returns its value, provided it is of type `T`.
    ///
    /// The type is checked before anything is removed. Every entry after `index` moves one
    /// position earlier.
    ///
    /// # Errors
    ///
    /// * [`Error::IndexOutOfRange`] if there is no entry at `index`.
    /// * [`Error::TypeMismatch`] if the entry does not hold exactly a `T`.
    ///
    /// In both cases the pool is not modified.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::{Error, MixedPool};
    ///
    /// let pool = MixedPool::new();
    /// pool.add("mine".to_string());
    ///
    /// assert!(pool.take::<u32>(0).is_err());
    ///
    /// let value: String = pool.take(0)?;
    /// assert_eq!(value, "mine");
    /// assert!(pool.is_empty());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn take<T: 'static>(&self, index: usize) -> Result<T> {
        let removed = {
            let mut entries = self.entries.write();

            match entries.get(index) {
                Some(holder) if holder.type_matches::<T>() => {}
                _ => return Err(lookup_error::<T>(&entries, index)),
            }

            let removed = entries.remove(index);
            self.len.store(entries.len(), Ordering::Release);
            removed
        };

        let stored = removed.held_type_name();
        trace!(index, type_name = stored, "took entry");

        removed
            .into_value::<T>()
            .ok_or_else(|| Error::TypeMismatch {
                index,
                requested: type_name::<T>(),
                stored,
            })
    }

    /// Removes every entry and drops all values.
    ///
    /// The entry index is released along with the entries, leaving the pool with no capacity.
    /// Values are dropped after the pool's lock has been released.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    /// pool.add(1_u8);
    /// pool.add("two");
    ///
    /// pool.clear();
    ///
    /// assert!(pool.is_empty());
    /// assert!(pool.get::<u8>(0).is_err());
    /// ```
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.entries.write();
            let removed = mem::take(&mut *entries);
            self.len.store(0, Ordering::Release);
            removed
        };

        trace!(count = removed.len(), "cleared pool");

        drop(removed);
    }

    /// Returns the number of entries in the pool.
    ///
    /// This does not take the pool's lock. It reads a counter that every structural mutation
    /// updates before releasing its exclusive lock. The relaxation is intentional, keeping
    /// length queries free of lock contention:
    ///
    /// * Once a mutation has returned, every later call observes its effect.
    /// * While a mutation is in flight on another thread, the result is either the count
    ///   before that mutation or the count after it.
    ///
    /// The result can therefore be stale by one in-flight mutation. Do not use it to validate
    /// an index ahead of a separate call; handle [`Error::IndexOutOfRange`] instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    ///
    /// assert_eq!(pool.len(), 0);
    ///
    /// pool.add(42_u32);
    /// pool.add("hello".to_string());
    ///
    /// assert_eq!(pool.len(), 2);
    /// ```
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Returns whether the pool has no entries.
    ///
    /// The same consistency rules as for [`len()`][Self::len] apply.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    ///
    /// assert!(pool.is_empty());
    ///
    /// pool.add(42_u32);
    /// assert!(!pool.is_empty());
    /// ```
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of entries the pool can hold without reallocating its index.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::builder().capacity(10).build();
    ///
    /// assert!(pool.capacity() >= 10);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.read_recursive().capacity()
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::new();
    /// pool.add(1_u8);
    ///
    /// pool.reserve(10);
    ///
    /// assert!(pool.capacity() >= 11);
    /// ```
    pub fn reserve(&self, additional: usize) {
        self.entries.write().reserve(additional);
    }

    /// Releases unused capacity.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::builder().capacity(100).build();
    /// pool.add(1_u8);
    ///
    /// pool.shrink_to_fit();
    ///
    /// assert!(pool.capacity() < 100);
    /// ```
    pub fn shrink_to_fit(&self) {
        self.entries.write().shrink_to_fit();
    }

    /// Returns the drop policy the pool was created with.
    #[must_use]
    pub fn drop_policy(&self) -> DropPolicy {
        self.drop_policy
    }
}

/// Explains why `entries` has no `T` at `index`.
fn lookup_error<T: 'static>(entries: &[Box<dyn ErasedHolder>], index: usize) -> Error {
    match entries.get(index) {
        Some(holder) => Error::TypeMismatch {
            index,
            requested: type_name::<T>(),
            stored: holder.held_type_name(),
        },
        None => out_of_range(entries, index),
    }
}

fn out_of_range(entries: &[Box<dyn ErasedHolder>], index: usize) -> Error {
    Error::IndexOutOfRange {
        index,
        len: entries.len(),
    }
}

impl Default for MixedPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MixedPool {
    fn drop(&mut self) {
        let entries = self.entries.get_mut();

        if !entries.is_empty() {
            debug!(count = entries.len(), "dropping pool with remaining entries");
        }

        if matches!(self.drop_policy, DropPolicy::MustNotDropItems) && !thread::panicking() {
            assert!(
                entries.is_empty(),
                "MixedPool dropped while still containing entries (drop policy is MustNotDropItems)"
            );
        }
    }
}

impl fmt::Debug for MixedPool {
    #[cfg_attr(test, mutants::skip)] // Debug output is not part of the contract.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixedPool")
            .field("entries", &self.entries)
            .field("len", &self.len)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}
