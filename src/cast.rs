//! The casting engine.
//!
//! There are two levels of casts:
//! 1. Value casts, which view the payload of a [Value] as exactly its own type.
//! 2. Object casts, which move an object address through the graph of bases,
//!    upwards statically and downwards through the object's runtime type.
//!
//! Inheritance is expressed through composition:
//! a derived struct embeds its base as a field, and declares it with [Extends].
use std::any;
use std::fmt::{self, Debug, Formatter};

use crate::error::ReflectError;
use crate::refs::TypeRef;
use crate::registry::descriptor;
use crate::types::{Shape, TypeDescriptor};
use crate::value::Value;
use crate::Reflect;

/// Declares that `Self` embeds an instance of `B`,
/// and should be treated as deriving from it.
///
/// Prefer the [extends!](crate::extends) macro, which implements this safely.
///
/// ## Safety
/// There must be a field of type `B` at byte offset `OFFSET` within `Self`.
pub unsafe trait Extends<B: Reflect>: Reflect {
    /// The offset of the embedded base
    const OFFSET: usize;
}

/// A type whose objects know their own runtime type.
///
/// This is what allows downcasts:
/// given a pointer to a base, the casting engine asks the object
/// which (possibly more derived) type it really is.
///
/// ## Safety
/// The returned descriptor must be `Self`, or a type that derives from `Self`
/// (through [Extends]) and that actually contains this object at the registered offset.
///
/// When the runtime type embeds `Self` more than once (through several bases),
/// the object can't tell which one it is, so downcasts from it fail.
pub unsafe trait Polymorphic: Reflect {
    /// The descriptor of the runtime type of this object
    fn describe_self(&self) -> &'static TypeDescriptor;
}

/// An embeddable runtime type tag,
/// for implementing [Polymorphic].
///
/// A base stores one of these, and each derived type overwrites it on construction
/// with its own type (just like a vtable pointer).
/// The [Polymorphic] implementation that returns it is responsible for keeping it accurate.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct DynamicType(TypeRef);
impl DynamicType {
    /// The tag of `T`
    #[inline]
    pub const fn of<T: Reflect>() -> DynamicType {
        DynamicType(TypeRef::of::<T>())
    }
    /// The tagged type
    #[inline]
    pub fn get(self) -> &'static TypeDescriptor {
        self.0.get()
    }
}
impl Debug for DynamicType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DynamicType({})", self.get().name())
    }
}

/// View the payload of a value as a `T`
///
/// This only succeeds if the value holds exactly a `T`,
/// with a single exception: a mutable pointer (`*mut X`)
/// can be viewed as a shared one (`*const X`).
/// The reverse is never allowed.
///
/// References are never relaxed,
/// since viewing a `&mut X` as a `&X` would alias it.
pub fn value_cast<T: Reflect>(value: &Value) -> Option<&T> {
    let held = value.held()?;
    if held.is::<T>() || accepts_shared_view(descriptor::<T>(), held) {
        Some(unsafe { &*value.data().cast::<T>() })
    } else {
        None
    }
}

/// If `requested` is a shared pointer whose mutable twin is `held`
fn accepts_shared_view(requested: &TypeDescriptor, held: &TypeDescriptor) -> bool {
    matches!(
        requested.shape(),
        Shape::Pointer { mutable: false, counterpart, .. } if counterpart.get() == held
    )
}

/// Mutably view the payload of a value as a `T`
///
/// Unlike [value_cast], this requires an exact match.
pub fn value_cast_mut<T: Reflect>(value: &mut Value) -> Option<&mut T> {
    if value.is::<T>() {
        Some(unsafe { &mut *value.data_mut().cast::<T>() })
    } else {
        None
    }
}

/// Copy the payload out of a value,
/// or return `default` if it can't be viewed as a `T`.
pub fn value_cast_or<T: Reflect + Clone>(value: &Value, default: T) -> T {
    match value_cast::<T>(value) {
        Some(result) => result.clone(),
        None => default,
    }
}

/// Where an object lives, as seen through a value
struct ObjectLocation {
    address: *const (),
    /// The most derived type known for the object
    actual: &'static TypeDescriptor,
    mutable: bool,
}

/// Find the object a value holds, or points to
///
/// ## Safety
/// Any pointer the value holds must point to a live instance of its target type.
unsafe fn locate_object(value: &Value) -> Option<ObjectLocation> {
    let held = value.held()?;
    let (target, mutable) = match held.shape() {
        Shape::Pointer { target, mutable, .. } | Shape::Reference { target, mutable, .. } => {
            (target, mutable)
        }
        Shape::Owned { target } => (target, true),
        Shape::Value => {
            // Embedded objects are only ever exposed immutably, and through their static type
            return Some(ObjectLocation {
                address: value.data().cast(),
                actual: held,
                mutable: false,
            });
        }
        Shape::Array { .. } => return None,
    };
    let address = *value.data().cast::<*const ()>();
    if address.is_null() {
        return None;
    }
    let (address, actual) = most_derived(address, target.get());
    Some(ObjectLocation {
        address,
        actual,
        mutable,
    })
}

/// Find the complete object containing the object at `address`,
/// using its runtime type.
///
/// If the declared type is embedded at more than one offset in the runtime type,
/// the complete object can't be found, and the declared type is kept.
///
/// ## Safety
/// The address must point to a live instance of `declared`.
unsafe fn most_derived(
    address: *const (),
    declared: &'static TypeDescriptor,
) -> (*const (), &'static TypeDescriptor) {
    let dynamic = declared.dynamic_type(address);
    if dynamic == declared {
        return (address, declared);
    }
    let mut offsets = Vec::new();
    collect_base_offsets(declared, dynamic, 0, &mut offsets);
    match *offsets.as_slice() {
        [offset] => (address.cast::<u8>().wrapping_sub(offset).cast(), dynamic),
        [] => (address, declared),
        _ => {
            tracing::trace!(
                declared = declared.name(),
                dynamic = dynamic.name(),
                "ambiguous base, not downcasting"
            );
            (address, declared)
        }
    }
}

/// Every distinct offset of `base` within `derived`
fn collect_base_offsets(base: &TypeDescriptor, derived: &TypeDescriptor, start: usize, offsets: &mut Vec<usize>) {
    if base == derived {
        if !offsets.contains(&start) {
            offsets.push(start);
        }
        return;
    }
    for link in derived.base_links() {
        collect_base_offsets(base, link.base(), start + link.offset(), offsets);
    }
}

/// View the object held by a value as a `T`
///
/// If the value holds a pointer (or reference, or `Box`),
/// the object's runtime type is used, so this can downcast.
/// An embedded object is viewed through its own type.
///
/// ## Safety
/// Any pointer the value holds must point to a live instance of its target type.
pub unsafe fn value_cast_object<T: Reflect>(value: &Value) -> Option<*const T> {
    let location = locate_object(value)?;
    cast_address(location.address, location.actual, descriptor::<T>()).map(|address| address.cast::<T>())
}

/// Mutably view the object a value points to as a `T`
///
/// This requires a mutable pointer, mutable reference, or `Box`.
/// Objects embedded in the value are never exposed mutably.
///
/// ## Safety
/// Any pointer the value holds must point to a live instance of its target type.
pub unsafe fn value_cast_object_mut<T: Reflect>(value: &Value) -> Option<*mut T> {
    let location = locate_object(value)?;
    if !location.mutable {
        return None;
    }
    cast_address(location.address, location.actual, descriptor::<T>())
        .map(|address| address.cast::<T>().cast_mut())
}

/// Move the address of a `from` object to its `to` base.
///
/// Returns `None` unless `to` is a base of `from` (or the same type).
pub fn cast_address(address: *const (), from: &TypeDescriptor, to: &TypeDescriptor) -> Option<*const ()> {
    base_offset(to, from).map(|offset| address.cast::<u8>().wrapping_add(offset).cast())
}

/// If `derived` is `base`, or derives from it (directly or transitively).
///
/// This is a depth-first search through the bases.
pub fn is_base_of(base: &TypeDescriptor, derived: &TypeDescriptor) -> bool {
    base == derived || derived.bases().any(|direct| is_base_of(base, direct))
}

/// The offset of `base` within `derived`,
/// following the first path found by a depth-first search.
pub fn base_offset(base: &TypeDescriptor, derived: &TypeDescriptor) -> Option<usize> {
    if base == derived {
        return Some(0);
    }
    derived
        .base_links()
        .iter()
        .find_map(|link| base_offset(base, link.base()).map(|offset| link.offset() + offset))
}

/// Cast an object pointer to a related type
///
/// Upcasts are resolved statically.
/// Anything else asks the object for its runtime type,
/// and succeeds if that type is (or derives from) `To`.
///
/// ## Safety
/// The object must be live, and the pointer must be valid for the whole runtime object,
/// not just its `From` part.
pub unsafe fn object_cast<To: Reflect, From: Reflect>(object: *const From) -> Option<*const To> {
    if object.is_null() {
        return None;
    }
    let from = descriptor::<From>();
    let to = descriptor::<To>();
    if let Some(address) = cast_address(object.cast(), from, to) {
        return Some(address.cast());
    }
    let (address, actual) = most_derived(object.cast(), from);
    cast_address(address, actual, to).map(|address| address.cast())
}

/// Cast a mutable object pointer to a related type
///
/// See [object_cast].
///
/// ## Safety
/// Same as [object_cast].
pub unsafe fn object_cast_mut<To: Reflect, From: Reflect>(object: *mut From) -> Option<*mut To> {
    object_cast::<To, From>(object).map(<*const To>::cast_mut)
}

/// View a reference to an object as a reference to one of its bases
///
/// This never consults the runtime type.
pub fn upcast<To: Reflect, From: Reflect>(object: &From) -> Option<&To> {
    let offset = base_offset(descriptor::<To>(), descriptor::<From>())?;
    let address = (object as *const From).cast::<u8>().wrapping_add(offset);
    Some(unsafe { &*address.cast::<To>() })
}

/// Mutably view an object as one of its bases
///
/// See [upcast].
pub fn upcast_mut<To: Reflect, From: Reflect>(object: &mut From) -> Option<&mut To> {
    let offset = base_offset(descriptor::<To>(), descriptor::<From>())?;
    let address = (object as *mut From).cast::<u8>().wrapping_add(offset);
    Some(unsafe { &mut *address.cast::<To>() })
}

/// The object of a member access, viewed immutably
pub(crate) unsafe fn object_pointer<T: Reflect>(object: &Value) -> Result<*const T, ReflectError> {
    value_cast_object::<T>(object).ok_or_else(|| object_mismatch::<T>(object))
}

/// The object of a member access, viewed mutably
pub(crate) unsafe fn object_pointer_mut<T: Reflect>(object: &Value) -> Result<*mut T, ReflectError> {
    value_cast_object_mut::<T>(object).ok_or_else(|| object_mismatch::<T>(object))
}

fn object_mismatch<T: Reflect>(object: &Value) -> ReflectError {
    ReflectError::ObjectMismatch {
        expected: any::type_name::<T>(),
        found: object.type_descriptor().name(),
    }
}

/// Copy a value of exactly the type `V` out of an erased value
pub(crate) fn value_of<V: Reflect + Clone>(value: &Value) -> Result<V, ReflectError> {
    value_cast::<V>(value)
        .cloned()
        .ok_or_else(|| ReflectError::ValueMismatch {
            expected: any::type_name::<V>(),
            found: value.type_descriptor().name(),
        })
}
