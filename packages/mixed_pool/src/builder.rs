use std::cell::Cell;
use std::marker::PhantomData;

use crate::{DropPolicy, MixedPool};

/// Builder for creating an instance of [`MixedPool`].
///
/// All settings are optional. [`MixedPool::new()`] is equivalent to building with defaults.
///
/// # Examples
///
/// ```
/// use mixed_pool::{DropPolicy, MixedPool};
///
/// // Default mixed pool.
/// let pool = MixedPool::builder().build();
///
/// // With room for 64 entries and a strict drop policy.
/// let pool = MixedPool::builder()
///     .capacity(64)
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// assert!(pool.capacity() >= 64);
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing pool configuration to happen on different threads than where the pool is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct MixedPoolBuilder {
    capacity: usize,
    drop_policy: DropPolicy,

    _not_sync: PhantomData<Cell<()>>,
}

impl MixedPoolBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            drop_policy: DropPolicy::default(),
            _not_sync: PhantomData,
        }
    }

    /// Reserves room for at least `capacity` entries before the first reallocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::builder().capacity(16).build();
    ///
    /// assert!(pool.capacity() >= 16);
    /// assert!(pool.is_empty());
    /// ```
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how
    /// to treat remaining entries in the pool when the pool is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use mixed_pool::{DropPolicy, MixedPool};
    ///
    /// let pool = MixedPool::builder()
    ///     .drop_policy(DropPolicy::MustNotDropItems)
    ///     .build();
    /// ```
    #[inline]
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the mixed pool with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use mixed_pool::MixedPool;
    ///
    /// let pool = MixedPool::builder().build();
    /// ```
    #[must_use]
    #[inline]
    pub fn build(self) -> MixedPool {
        MixedPool::new_inner(self.capacity, self.drop_policy)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(MixedPoolBuilder: Send);
    assert_not_impl_any!(MixedPoolBuilder: Sync);

    #[test]
    fn defaults_to_may_drop_items_and_no_capacity() {
        let builder = MixedPoolBuilder::new();

        assert_eq!(builder.capacity, 0);
        assert_eq!(builder.drop_policy, DropPolicy::MayDropItems);
    }

    #[test]
    fn settings_are_applied() {
        let builder = MixedPoolBuilder::new()
            .capacity(10)
            .drop_policy(DropPolicy::MustNotDropItems);

        assert_eq!(builder.capacity, 10);
        assert_eq!(builder.drop_policy, DropPolicy::MustNotDropItems);

        let pool = builder.build();
        assert!(pool.capacity() >= 10);
        assert_eq!(pool.drop_policy(), DropPolicy::MustNotDropItems);
    }
}
