//! Provides a [TypeRef],
//! a lazily resolved link to another [TypeDescriptor].
//!
//! Descriptors refer to each other constantly
//! (a pointer to its target, a type to its bases, a property to its value type).
//! Resolving those links eagerly would recurse while a descriptor is still
//! being built, so every cross-link is stored as a function pointer instead.
use std::fmt::{self, Debug, Display, Formatter};

use crate::registry;
use crate::types::TypeDescriptor;
use crate::Reflect;

/// A function returning the descriptor of a single type
pub type DescriptorFn = fn() -> &'static TypeDescriptor;

/// A lazy reference to the descriptor of some type
#[derive(Copy, Clone)]
pub struct TypeRef(DescriptorFn);
impl TypeRef {
    /// Refer to the descriptor of `T`
    ///
    /// This never builds the descriptor itself.
    #[inline]
    pub const fn of<T: Reflect>() -> TypeRef {
        TypeRef(registry::descriptor::<T>)
    }
    /// Resolve the reference,
    /// building the descriptor on first use.
    #[inline]
    pub fn get(self) -> &'static TypeDescriptor {
        (self.0)()
    }
}
impl PartialEq for TypeRef {
    fn eq(&self, other: &TypeRef) -> bool {
        self.get() == other.get()
    }
}
impl Eq for TypeRef {}
impl Debug for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Only the name: pointer twins refer to each other
        write!(f, "TypeRef({})", self.get().name())
    }
}
impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.get(), f)
    }
}
