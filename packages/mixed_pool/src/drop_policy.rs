/// Determines what happens to remaining entries when a [`MixedPool`][crate::MixedPool] is dropped.
///
/// By default, the pool drops its entries when it is dropped.
///
/// # Examples
///
/// ```
/// use mixed_pool::{DropPolicy, MixedPool};
///
/// // The drop policy is set at pool creation time.
/// let pool = MixedPool::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// pool.add(42_u32);
/// pool.clear();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool will drop its entries when the pool is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The pool will panic if it still contains entries when it is dropped.
    ///
    /// This may be valuable if entries must be explicitly removed or taken out before the pool
    /// goes away, for example because their owner expects to hand them back somewhere else.
    MustNotDropItems,
}
