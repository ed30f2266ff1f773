use std::any::{Any, TypeId, type_name};
use std::fmt;

/// The type-erased face of a [`Holder<T>`].
///
/// The pool only ever sees holders through this trait. The only things it can do with one are
/// drop it and ask which type it holds; getting the value back out requires naming the type and
/// passing the exact type check.
pub(crate) trait ErasedHolder: Send + Sync {
    /// The identity of the held value's type, fixed when the holder was created.
    fn held_type_id(&self) -> TypeId;

    /// The name of the held value's type, for diagnostics only.
    fn held_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Owns exactly one value of type `T`.
///
/// A holder never changes the type of the value it owns. Dropping the holder drops the value.
pub(crate) struct Holder<T> {
    value: T,
}

impl<T> Holder<T>
where
    T: Send + Sync + 'static,
{
    #[must_use]
    pub(crate) fn new(value: T) -> Self {
        Self { value }
    }

    /// Boxes a new holder behind the erased interface, ready to be stored in a pool.
    #[must_use]
    pub(crate) fn erased(value: T) -> Box<dyn ErasedHolder> {
        Box::new(Self::new(value))
    }
}

impl<T> ErasedHolder for Holder<T>
where
    T: Send + Sync + 'static,
{
    #[inline]
    fn held_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn held_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn ErasedHolder {
    /// Whether the held value is exactly of type `T`.
    ///
    /// This is an identity comparison. A newtype around `T` does not match `T` and `T` does not
    /// match a trait object that `T` implements.
    #[inline]
    #[must_use]
    pub(crate) fn type_matches<T: 'static>(&self) -> bool {
        self.held_type_id() == TypeId::of::<T>()
    }

    #[inline]
    #[must_use]
    pub(crate) fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any()
            .downcast_ref::<Holder<T>>()
            .map(|holder| &holder.value)
    }

    #[inline]
    #[must_use]
    pub(crate) fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut()
            .downcast_mut::<Holder<T>>()
            .map(|holder| &mut holder.value)
    }

    /// Unwraps the holder and returns the owned value if it is of type `T`.
    ///
    /// On a type mismatch the holder, and with it the value, is dropped. Callers that need to
    /// keep the value on mismatch must check [`type_matches()`][Self::type_matches] first.
    #[must_use]
    pub(crate) fn into_value<T: 'static>(self: Box<Self>) -> Option<T> {
        self.into_any()
            .downcast::<Holder<T>>()
            .ok()
            .map(|holder| holder.value)
    }
}

impl fmt::Debug for dyn ErasedHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holder")
            .field("type_name", &self.held_type_name())
            .finish_non_exhaustive()
    }
}
