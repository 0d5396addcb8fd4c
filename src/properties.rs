//! Property reflection.
//!
//! A [Property] reads and writes one member of an object through erased [Value]s.
//! There are four kinds of properties, but all of them support the same operations:
//! - `get`: copy the current value out
//! - `set`: store a new value (a silent no-op on failure)
//! - `get_ref` and `get_cref`: the address of the stored value, as `*mut V` or `*const V`
//!
//! Every operation takes an index with one component per array dimension,
//! which is empty for everything except array properties.
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use educe::Educe;

use crate::attributes::Attributes;
use crate::cast::{self, object_pointer, object_pointer_mut};
use crate::error::ReflectError;
use crate::refs::TypeRef;
use crate::registry::descriptor;
use crate::types::{Shape, TypeDescriptor};
use crate::value::Value;
use crate::Reflect;

/// How a property accesses its value
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum PropertyKind {
    /// A field of the object
    Member,
    /// An element of a (possibly multi-dimensional) array field
    Array,
    /// A getter and setter method
    Accessor,
    /// Arbitrary functions of the object
    Delegate,
}
impl PropertyKind {
    /// If the value has an address inside the object
    #[inline]
    pub fn is_stored(self) -> bool {
        matches!(self, PropertyKind::Member | PropertyKind::Array)
    }
}

/// The erased implementation of a property
pub(crate) trait PropertyAccess: Send + Sync + Debug {
    /// The number of index components
    fn rank(&self) -> usize {
        0
    }
    unsafe fn get(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError>;
    /// Only called on properties which aren't read-only
    unsafe fn set(&self, object: &Value, value: &Value, index: &[usize]) -> Result<(), ReflectError>;
    /// The address of the value,
    /// or `None` if it isn't stored.
    unsafe fn locate(&self, _object: &Value, _index: &[usize], _mutable: bool) -> Option<Result<Value, ReflectError>> {
        None
    }
}

/// Mutable access was requested from a read-only property
fn read_only<T>() -> ReflectError {
    ReflectError::ReadOnly(std::any::type_name::<T>())
}

fn scalar_index(index: &[usize]) -> Result<(), ReflectError> {
    if index.is_empty() {
        Ok(())
    } else {
        Err(ReflectError::IndexRank {
            expected: 0,
            found: index.len(),
        })
    }
}

/// A field of the object
#[derive(Educe)]
#[educe(Debug)]
pub(crate) struct MemberProperty<T, V> {
    #[educe(Debug(ignore))]
    get: fn(&T) -> &V,
    #[educe(Debug(ignore))]
    get_mut: Option<fn(&mut T) -> &mut V>,
    marker: PhantomData<fn(&T) -> V>,
}
impl<T, V> MemberProperty<T, V> {
    pub(crate) fn new(get: fn(&T) -> &V, get_mut: Option<fn(&mut T) -> &mut V>) -> Self {
        MemberProperty {
            get,
            get_mut,
            marker: PhantomData,
        }
    }
}
impl<T: Reflect, V: Reflect + Clone> PropertyAccess for MemberProperty<T, V> {
    unsafe fn get(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        scalar_index(index)?;
        let object = &*object_pointer::<T>(object)?;
        Ok(Value::new((self.get)(object).clone()))
    }
    unsafe fn set(&self, object: &Value, value: &Value, index: &[usize]) -> Result<(), ReflectError> {
        scalar_index(index)?;
        if let Some(get_mut) = self.get_mut {
            let object = &mut *object_pointer_mut::<T>(object)?;
            *get_mut(object) = cast::value_of::<V>(value)?;
        }
        Ok(())
    }
    unsafe fn locate(&self, object: &Value, index: &[usize], mutable: bool) -> Option<Result<Value, ReflectError>> {
        Some(scalar_index(index).and_then(|()| {
            if mutable {
                let get_mut = self.get_mut.ok_or_else(read_only::<T>)?;
                let object = &mut *object_pointer_mut::<T>(object)?;
                Ok(Value::new(get_mut(object) as *mut V))
            } else {
                let object = &*object_pointer::<T>(object)?;
                Ok(Value::new((self.get)(object) as *const V))
            }
        }))
    }
}

/// Walk the dimensions of the array `A` down to the element of type `S`
///
/// Fails if any index component is out of bounds,
/// or if the index doesn't have exactly one component per dimension.
pub(crate) fn array_element<A: Reflect, S: Reflect>(array: *mut A, index: &[usize]) -> Result<*mut S, ReflectError> {
    let rank = array_rank::<A, S>().ok_or(ReflectError::ValueMismatch {
        expected: std::any::type_name::<S>(),
        found: std::any::type_name::<A>(),
    })?;
    if index.len() != rank {
        return Err(ReflectError::IndexRank {
            expected: rank,
            found: index.len(),
        });
    }
    let mut current = descriptor::<A>();
    let mut address = array.cast::<u8>();
    for (dimension, &component) in index.iter().enumerate() {
        if let Shape::Array { element, extent, .. } = current.shape() {
            if component >= extent {
                return Err(ReflectError::IndexOutOfBounds {
                    dimension,
                    index: component,
                    extent,
                });
            }
            current = element.get();
            address = address.wrapping_add(component * current.size());
        }
    }
    Ok(address.cast::<S>())
}

/// The number of array dimensions between `A` and its scalar `S`
fn array_rank<A: Reflect, S: Reflect>() -> Option<usize> {
    let mut current: &'static TypeDescriptor = descriptor::<A>();
    let mut rank = 0;
    while !current.is::<S>() {
        current = current.element_type()?;
        rank += 1;
    }
    Some(rank)
}

/// An element of an array field
#[derive(Educe)]
#[educe(Debug)]
pub(crate) struct ArrayProperty<T, A, S> {
    #[educe(Debug(ignore))]
    get: fn(&T) -> &A,
    #[educe(Debug(ignore))]
    get_mut: Option<fn(&mut T) -> &mut A>,
    marker: PhantomData<fn(&A) -> S>,
}
impl<T, A, S> ArrayProperty<T, A, S> {
    pub(crate) fn new(get: fn(&T) -> &A, get_mut: Option<fn(&mut T) -> &mut A>) -> Self {
        ArrayProperty {
            get,
            get_mut,
            marker: PhantomData,
        }
    }
}
impl<T, A, S> ArrayProperty<T, A, S>
where
    T: Reflect,
    A: Reflect,
    S: Reflect + Clone,
{
    unsafe fn element(&self, object: &Value, index: &[usize]) -> Result<*const S, ReflectError> {
        let array = (self.get)(&*object_pointer::<T>(object)?) as *const A;
        array_element::<A, S>(array.cast_mut(), index).map(<*mut S>::cast_const)
    }
    unsafe fn element_mut(&self, object: &Value, index: &[usize]) -> Result<*mut S, ReflectError> {
        let get_mut = self.get_mut.ok_or_else(read_only::<T>)?;
        let array = get_mut(&mut *object_pointer_mut::<T>(object)?) as *mut A;
        array_element::<A, S>(array, index)
    }
}
impl<T, A, S> PropertyAccess for ArrayProperty<T, A, S>
where
    T: Reflect,
    A: Reflect,
    S: Reflect + Clone,
{
    fn rank(&self) -> usize {
        array_rank::<A, S>().unwrap_or(0)
    }
    unsafe fn get(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        let element = self.element(object, index)?;
        Ok(Value::new((*element).clone()))
    }
    unsafe fn set(&self, object: &Value, value: &Value, index: &[usize]) -> Result<(), ReflectError> {
        if self.get_mut.is_none() {
            return Ok(());
        }
        let element = self.element_mut(object, index)?;
        *element = cast::value_of::<S>(value)?;
        Ok(())
    }
    unsafe fn locate(&self, object: &Value, index: &[usize], mutable: bool) -> Option<Result<Value, ReflectError>> {
        Some(if mutable {
            self.element_mut(object, index).map(Value::new)
        } else {
            self.element(object, index).map(Value::new)
        })
    }
}

/// A getter and an optional setter
#[derive(Educe)]
#[educe(Debug)]
pub(crate) struct AccessorProperty<T, V> {
    #[educe(Debug(ignore))]
    get: fn(&T) -> V,
    #[educe(Debug(ignore))]
    set: Option<fn(&mut T, V)>,
    marker: PhantomData<fn(&T) -> V>,
}
impl<T, V> AccessorProperty<T, V> {
    pub(crate) fn new(get: fn(&T) -> V, set: Option<fn(&mut T, V)>) -> Self {
        AccessorProperty {
            get,
            set,
            marker: PhantomData,
        }
    }
}
impl<T: Reflect, V: Reflect + Clone> PropertyAccess for AccessorProperty<T, V> {
    unsafe fn get(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        scalar_index(index)?;
        let object = &*object_pointer::<T>(object)?;
        Ok(Value::new((self.get)(object)))
    }
    unsafe fn set(&self, object: &Value, value: &Value, index: &[usize]) -> Result<(), ReflectError> {
        scalar_index(index)?;
        if let Some(set) = self.set {
            let object = &mut *object_pointer_mut::<T>(object)?;
            set(object, cast::value_of::<V>(value)?);
        }
        Ok(())
    }
}

type DelegateGetter<T, V> = Box<dyn Fn(&T) -> V + Send + Sync>;
type DelegateSetter<T, V> = Box<dyn Fn(&mut T, V) + Send + Sync>;

/// Arbitrary functions of the object
#[derive(Educe)]
#[educe(Debug)]
pub(crate) struct DelegateProperty<T, V> {
    #[educe(Debug(ignore))]
    get: DelegateGetter<T, V>,
    #[educe(Debug(ignore))]
    set: Option<DelegateSetter<T, V>>,
    marker: PhantomData<fn(&T) -> V>,
}
impl<T, V> DelegateProperty<T, V> {
    pub(crate) fn new(get: DelegateGetter<T, V>, set: Option<DelegateSetter<T, V>>) -> Self {
        DelegateProperty {
            get,
            set,
            marker: PhantomData,
        }
    }
}
impl<T: Reflect, V: Reflect + Clone> PropertyAccess for DelegateProperty<T, V> {
    unsafe fn get(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        scalar_index(index)?;
        let object = &*object_pointer::<T>(object)?;
        Ok(Value::new((self.get)(object)))
    }
    unsafe fn set(&self, object: &Value, value: &Value, index: &[usize]) -> Result<(), ReflectError> {
        scalar_index(index)?;
        if let Some(ref set) = self.set {
            let object = &mut *object_pointer_mut::<T>(object)?;
            set(object, cast::value_of::<V>(value)?);
        }
        Ok(())
    }
}

/// A named member of a type, accessed through erased values.
///
/// ## Safety
/// The operations are `unsafe`, since they dereference any pointer held by the object value.
/// Such a pointer must point to a live instance of its target type (or of a type derived from it),
/// and the instance must not be aliased by a reference for the duration of a mutating call.
pub struct Property {
    pub(crate) name: &'static str,
    pub(crate) display_name: &'static str,
    pub(crate) attributes: Attributes,
    pub(crate) owner: TypeRef,
    pub(crate) value_type: TypeRef,
    pub(crate) kind: PropertyKind,
    pub(crate) readonly: bool,
    pub(crate) access: Box<dyn PropertyAccess>,
}
impl Property {
    /// The name of the property
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// The name to present to users
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }
    /// The attributes attached to this property
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
    /// The type declaring this property
    #[inline]
    pub fn owner_type(&self) -> &'static TypeDescriptor {
        self.owner.get()
    }
    /// The type of the value.
    ///
    /// For array properties this is the scalar element type.
    #[inline]
    pub fn value_type(&self) -> &'static TypeDescriptor {
        self.value_type.get()
    }
    /// How the property accesses its value
    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }
    /// If the property can't be written
    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }
    /// The number of index components the property expects
    #[inline]
    pub fn rank(&self) -> usize {
        self.access.rank()
    }

    /// Read the value
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn try_get(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        self.access.get(object, index)
    }
    /// Read the value, or return an empty value on failure
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn get(&self, object: &Value, index: &[usize]) -> Value {
        self.try_get(object, index)
            .unwrap_or_else(|error| self.missed("get", error))
    }
    /// Write the value
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn try_set(&self, object: &Value, value: &Value, index: &[usize]) -> Result<(), ReflectError> {
        if self.readonly {
            return Err(ReflectError::ReadOnly(self.name));
        }
        self.access.set(object, value, index)
    }
    /// Write the value, silently doing nothing on failure
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn set(&self, object: &Value, value: &Value, index: &[usize]) {
        if let Err(error) = self.try_set(object, value, index) {
            self.missed("set", error);
        }
    }
    /// The mutable address of the value, as a `*mut V`
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn try_get_ref(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        if self.readonly && self.kind.is_stored() {
            return Err(ReflectError::ReadOnly(self.name));
        }
        self.access
            .locate(object, index, true)
            .unwrap_or(Err(ReflectError::NotAddressable(self.name)))
    }
    /// The mutable address of the value,
    /// or an empty value on failure.
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn get_ref(&self, object: &Value, index: &[usize]) -> Value {
        self.try_get_ref(object, index)
            .unwrap_or_else(|error| self.missed("get_ref", error))
    }
    /// The shared address of the value, as a `*const V`
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn try_get_cref(&self, object: &Value, index: &[usize]) -> Result<Value, ReflectError> {
        self.access
            .locate(object, index, false)
            .unwrap_or(Err(ReflectError::NotAddressable(self.name)))
    }
    /// The shared address of the value,
    /// or an empty value on failure.
    ///
    /// ## Safety
    /// See [Property].
    pub unsafe fn get_cref(&self, object: &Value, index: &[usize]) -> Value {
        self.try_get_cref(object, index)
            .unwrap_or_else(|error| self.missed("get_cref", error))
    }
    fn missed(&self, operation: &'static str, error: ReflectError) -> Value {
        tracing::trace!(property = self.name, operation, %error, "property access failed");
        Value::empty()
    }
}
impl Debug for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value_type", &self.value_type)
            .field("readonly", &self.readonly)
            .field("access", &self.access)
            .finish()
    }
}

member_list! {
    /// The properties of a type, inherited ones included
    PropertyList => Property
}
