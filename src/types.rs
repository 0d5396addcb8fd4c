//! The runtime descriptions of types.
//!
//! Every [Reflect] type has exactly one [TypeDescriptor],
//! built on first use and never freed.
use std::any::TypeId;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::attributes::Attributes;
use crate::cast;
use crate::constructors::{self, Constructor};
use crate::error::ReflectError;
use crate::funcs::{Method, MethodList};
use crate::properties::{Property, PropertyList};
use crate::refs::TypeRef;
use crate::registry;
use crate::value::Value;
use crate::Reflect;

#[cfg(feature = "serde1")]
mod serialize;

/// The 64-bit identity of a type,
/// derived from its name.
///
/// This is a process-local identity, not a wire format.
/// The hash is not cryptographic and is assumed to be
/// collision-free among the types of a single program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHash(u64);
impl TypeHash {
    /// The initial value of the hash
    pub const SEED: u64 = 1125899906842597;
    /// Hash the specified type name
    pub const fn of(name: &str) -> TypeHash {
        let bytes = name.as_bytes();
        let mut hash = TypeHash::SEED;
        let mut index = 0;
        while index < bytes.len() {
            hash &= u64::MAX >> 5;
            hash = hash.wrapping_mul(31).wrapping_add(bytes[index] as u64);
            index += 1;
        }
        TypeHash(hash)
    }
    /// The raw value of the hash
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}
impl Display for TypeHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The representation of a type,
/// as far as the casting engine is concerned.
///
/// Rust has no `const` qualifier.
/// Shared access (`*const T`, `&T`) plays its role,
/// and each pointer or reference links to its twin of the opposite mutability.
#[derive(Copy, Clone, Debug)]
pub enum Shape {
    /// A plain value
    Value,
    /// A raw pointer
    Pointer {
        /// The pointed-to type
        target: TypeRef,
        /// If this is a `*mut` pointer
        mutable: bool,
        /// The pointer of the opposite mutability
        counterpart: TypeRef,
    },
    /// A `'static` reference
    Reference {
        /// The referenced type
        target: TypeRef,
        /// If this is a `&mut` reference
        mutable: bool,
        /// The reference of the opposite mutability
        counterpart: TypeRef,
    },
    /// An owning pointer (`Box<T>`)
    ///
    /// Its pointee is always mutable.
    Owned {
        /// The owned type
        target: TypeRef,
    },
    /// A fixed size array
    Array {
        /// The element type
        element: TypeRef,
        /// The number of elements
        extent: usize,
        /// The pointer type this array decays to
        decay: TypeRef,
    },
}

/// A link from a type to one of its direct bases
#[derive(Copy, Clone, Debug)]
pub struct BaseLink {
    pub(crate) base: TypeRef,
    pub(crate) offset: usize,
}
impl BaseLink {
    /// The base type
    #[inline]
    pub fn base(&self) -> &'static TypeDescriptor {
        self.base.get()
    }
    /// The offset of the base within the derived type
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Resolves the runtime type of a polymorphic object.
pub(crate) type DynamicTypeFn = unsafe fn(*const ()) -> &'static TypeDescriptor;

/// The immutable, process-lifetime description of a single type
pub struct TypeDescriptor {
    pub(crate) name: &'static str,
    pub(crate) display_name: &'static str,
    pub(crate) id: TypeHash,
    pub(crate) type_id: TypeId,
    pub(crate) size: usize,
    pub(crate) alignment: usize,
    pub(crate) shape: Shape,
    pub(crate) described: bool,
    pub(crate) bases: Vec<BaseLink>,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) properties: Vec<Property>,
    pub(crate) methods: Vec<Method>,
    pub(crate) attributes: Attributes,
    pub(crate) dynamic: Option<DynamicTypeFn>,
    pub(crate) all_properties: OnceLock<Vec<&'static Property>>,
    pub(crate) all_methods: OnceLock<Vec<&'static Method>>,
}
impl TypeDescriptor {
    /// The descriptor of `T`
    ///
    /// Equivalent to [descriptor](crate::descriptor).
    #[inline]
    pub fn of<T: Reflect>() -> &'static TypeDescriptor {
        registry::descriptor::<T>()
    }
    /// The full name of the type
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// The name to present to users.
    ///
    /// Defaults to the [name](TypeDescriptor::name).
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }
    /// The identity of the type
    #[inline]
    pub fn id(&self) -> TypeHash {
        self.id
    }
    /// The standard library's identity of this type
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
    /// If this describes `T`
    #[inline]
    pub fn is<T: Reflect>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
    /// The size of the type in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }
    /// The alignment of the type in bytes
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }
    /// The representation of the type
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }
    /// If the type was given a description,
    /// as opposed to only being named.
    #[inline]
    pub fn has_description(&self) -> bool {
        self.described
    }

    /// If this is a shared pointer or reference (`*const T`, `&T`)
    pub fn is_const(&self) -> bool {
        matches!(
            self.shape,
            Shape::Pointer { mutable: false, .. } | Shape::Reference { mutable: false, .. }
        )
    }
    /// Rust has no volatile types
    #[inline]
    pub fn is_volatile(&self) -> bool {
        false
    }
    /// If this is a raw or owning pointer
    pub fn is_pointer(&self) -> bool {
        matches!(self.shape, Shape::Pointer { .. } | Shape::Owned { .. })
    }
    /// If this is a reference
    pub fn is_reference(&self) -> bool {
        matches!(self.shape, Shape::Reference { .. })
    }
    /// If this is a fixed size array
    pub fn is_array(&self) -> bool {
        matches!(self.shape, Shape::Array { .. })
    }
    /// The number of array dimensions,
    /// or zero if this isn't an array.
    pub fn rank(&self) -> usize {
        match self.shape {
            Shape::Array { element, .. } => 1 + element.get().rank(),
            _ => 0,
        }
    }
    /// The number of elements in the outermost dimension,
    /// or zero if this isn't an array.
    pub fn extent(&self) -> usize {
        match self.shape {
            Shape::Array { extent, .. } => extent,
            _ => 0,
        }
    }
    /// The shared twin of a mutable pointer or reference.
    ///
    /// Every other type is returned unchanged.
    pub fn const_type(&'static self) -> &'static TypeDescriptor {
        match self.shape {
            Shape::Pointer { mutable: true, counterpart, .. }
            | Shape::Reference { mutable: true, counterpart, .. } => counterpart.get(),
            _ => self,
        }
    }
    /// The mutable twin of a shared pointer or reference.
    ///
    /// Every other type is returned unchanged.
    pub fn unconst_type(&'static self) -> &'static TypeDescriptor {
        match self.shape {
            Shape::Pointer { mutable: false, counterpart, .. }
            | Shape::Reference { mutable: false, counterpart, .. } => counterpart.get(),
            _ => self,
        }
    }
    /// The target of a pointer,
    /// or this type if it isn't one.
    pub fn unpointer_type(&'static self) -> &'static TypeDescriptor {
        match self.shape {
            Shape::Pointer { target, .. } | Shape::Owned { target } => target.get(),
            _ => self,
        }
    }
    /// The type after decay:
    /// arrays become pointers to their element,
    /// and references become their target.
    pub fn decay_type(&'static self) -> &'static TypeDescriptor {
        match self.shape {
            Shape::Array { decay, .. } => decay.get(),
            Shape::Reference { target, .. } => target.get(),
            _ => self,
        }
    }
    /// The element type of an array
    pub fn element_type(&self) -> Option<&'static TypeDescriptor> {
        match self.shape {
            Shape::Array { element, .. } => Some(element.get()),
            _ => None,
        }
    }
    /// The mutable pointer to this type.
    ///
    /// Pointer descriptors are only built when something names them,
    /// so this returns `None` until then.
    pub fn pointer_type(&'static self) -> Option<&'static TypeDescriptor> {
        registry::snapshot().into_iter().find(|candidate| {
            matches!(
                candidate.shape,
                Shape::Pointer { mutable: true, target, .. } if target.get() == self
            )
        })
    }

    /// The direct bases of this type, in declaration order
    pub fn bases(&self) -> impl ExactSizeIterator<Item = &'static TypeDescriptor> + '_ {
        self.bases.iter().map(BaseLink::base)
    }
    /// The links to the direct bases,
    /// including their offsets.
    #[inline]
    pub fn base_links(&self) -> &[BaseLink] {
        &self.bases
    }
    /// If `derived` is this type, or (transitively) derives from it
    #[inline]
    pub fn is_base_of(&self, derived: &TypeDescriptor) -> bool {
        cast::is_base_of(self, derived)
    }
    /// If this type is `base`, or (transitively) derives from it
    #[inline]
    pub fn derives_from(&self, base: &TypeDescriptor) -> bool {
        cast::is_base_of(base, self)
    }
    /// If objects of this type can report a more derived runtime type
    #[inline]
    pub fn is_polymorphic(&self) -> bool {
        self.dynamic.is_some()
    }
    /// The runtime type of the object at `address`.
    ///
    /// ## Safety
    /// If this type is polymorphic,
    /// the address must point to a live instance of it.
    pub(crate) unsafe fn dynamic_type(&'static self, address: *const ()) -> &'static TypeDescriptor {
        match self.dynamic {
            Some(resolve) => resolve(address),
            None => self,
        }
    }

    /// The constructors, in declaration order
    #[inline]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }
    /// Construct a new instance on the heap,
    /// using the first constructor that accepts the arguments.
    ///
    /// The result holds a `Box` of this type,
    /// or is empty if no constructor matches.
    pub fn instantiate(&self, args: &[Value]) -> Value {
        self.try_instantiate(args).unwrap_or_else(|error| {
            tracing::trace!(type_name = self.name, %error, "instantiate failed");
            Value::empty()
        })
    }
    /// Construct a new instance,
    /// reporting why no constructor matched.
    pub fn try_instantiate(&self, args: &[Value]) -> Result<Value, ReflectError> {
        constructors::resolve(&self.constructors, args)
            .ok_or(ReflectError::NoMatchingConstructor(self.name))
    }

    /// The properties of this type,
    /// including those inherited from its bases.
    ///
    /// Inherited properties come first.
    /// A property shadows any inherited property with the same name.
    pub fn properties(&'static self) -> PropertyList {
        let entries = self.all_properties.get_or_init(|| {
            flatten(
                &self.properties,
                self.bases().flat_map(|base| base.properties().iter()),
                Property::name,
            )
        });
        PropertyList::new(entries)
    }
    /// The properties declared directly on this type
    #[inline]
    pub fn own_properties(&self) -> &[Property] {
        &self.properties
    }
    /// The methods of this type,
    /// including those inherited from its bases.
    ///
    /// Inherited methods come first.
    /// A method shadows any inherited method with the same name.
    pub fn methods(&'static self) -> MethodList {
        let entries = self.all_methods.get_or_init(|| {
            flatten(
                &self.methods,
                self.bases().flat_map(|base| base.methods().iter()),
                Method::name,
            )
        });
        MethodList::new(entries)
    }
    /// The methods declared directly on this type
    #[inline]
    pub fn own_methods(&self) -> &[Method] {
        &self.methods
    }
    /// The attributes attached to this type
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Merge inherited members with the members declared on the type itself
fn flatten<M>(
    own: &'static [M],
    inherited: impl Iterator<Item = &'static M>,
    name: fn(&M) -> &'static str,
) -> Vec<&'static M> {
    let mut all: Vec<&'static M> = Vec::new();
    for member in inherited {
        if !all.iter().any(|existing| name(existing) == name(member)) {
            all.push(member);
        }
    }
    let inherited_count = all.len();
    for member in own {
        match all[..inherited_count].iter().position(|existing| name(existing) == name(member)) {
            Some(index) => all[index] = member,
            None => all.push(member),
        }
    }
    all
}

impl PartialEq for TypeDescriptor {
    #[inline]
    fn eq(&self, other: &TypeDescriptor) -> bool {
        self.id == other.id
    }
}
impl Eq for TypeDescriptor {}
impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name)
    }
}
impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("size", &self.size)
            .field("alignment", &self.alignment)
            .field("shape", &self.shape)
            .field("bases", &self.bases)
            .finish_non_exhaustive()
    }
}
