//! The builder used to describe a type.
//!
//! A [TypeBuilder] is handed to [Reflect::describe],
//! and everything registered on it ends up in the type's descriptor:
//!
//! ```
//! use erased_reflect::{Reflect, TypeBuilder};
//!
//! #[derive(Clone)]
//! struct Account {
//!     owner: String,
//!     balance: i64,
//! }
//! impl Account {
//!     fn deposit(&mut self, amount: i64) -> i64 {
//!         self.balance += amount;
//!         self.balance
//!     }
//! }
//! unsafe impl Reflect for Account {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.display_name("Account");
//!         ty.constructor(|owner: String| Account { owner, balance: 0 });
//!         ty.property("owner").readonly_member(|a| &a.owner);
//!         ty.property("balance").member(|a| &a.balance, |a| &mut a.balance);
//!         ty.method("deposit").invoker(Account::deposit);
//!     }
//! }
//! ```
use std::any::{self, TypeId};
use std::marker::PhantomData;
use std::mem;
use std::sync::OnceLock;

use educe::Educe;

use crate::attributes::{Attribute, Attributes};
use crate::cast::{Extends, Polymorphic};
use crate::constructors::{Constructor, IntoConstructor};
use crate::funcs::{IntoConstMethod, IntoFunction, IntoMethod, Method, Signature};
use crate::properties::{
    AccessorProperty, ArrayProperty, DelegateProperty, MemberProperty, Property, PropertyAccess,
    PropertyKind,
};
use crate::refs::TypeRef;
use crate::types::{BaseLink, DynamicTypeFn, TypeDescriptor, TypeHash};
use crate::Reflect;

/// Describes the type `T`.
#[derive(Educe)]
#[educe(Debug)]
pub struct TypeBuilder<T: Reflect> {
    display_name: Option<&'static str>,
    bases: Vec<BaseLink>,
    constructors: Vec<Constructor>,
    properties: Vec<Property>,
    methods: Vec<Method>,
    attributes: Attributes,
    #[educe(Debug(ignore))]
    dynamic: Option<DynamicTypeFn>,
    marker: PhantomData<fn() -> T>,
}
impl<T: Reflect> TypeBuilder<T> {
    pub(crate) fn new() -> TypeBuilder<T> {
        TypeBuilder {
            display_name: None,
            bases: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            attributes: Attributes::default(),
            dynamic: None,
            marker: PhantomData,
        }
    }
    /// Set the name presented to users
    pub fn display_name(&mut self, name: &'static str) -> &mut Self {
        self.display_name = Some(name);
        self
    }
    /// Add `B` as a direct base
    ///
    /// Bases are kept in the order they are added.
    pub fn base<B: Reflect>(&mut self) -> &mut Self
    where
        T: Extends<B>,
    {
        self.bases.push(BaseLink {
            base: TypeRef::of::<B>(),
            offset: <T as Extends<B>>::OFFSET,
        });
        self
    }
    /// Resolve the runtime type of objects through [Polymorphic],
    /// allowing them to be downcast.
    pub fn polymorphic(&mut self) -> &mut Self
    where
        T: Polymorphic,
    {
        self.dynamic = Some(dynamic_type_of::<T>);
        self
    }
    /// Attach an attribute to the type
    pub fn attribute<A: Attribute>(&mut self, attribute: A) -> &mut Self {
        self.attributes.push(attribute);
        self
    }
    /// Add a constructor
    ///
    /// Constructors are tried in the order they are added.
    pub fn constructor<Args, F>(&mut self, constructor: F) -> &mut Self
    where
        F: IntoConstructor<T, Args>,
    {
        self.constructors.push(constructor.into_constructor());
        self
    }
    /// Start describing a property
    pub fn property(&mut self, name: &'static str) -> PropertyBuilder<'_, T> {
        PropertyBuilder {
            target: &mut self.properties,
            name,
            display_name: None,
            attributes: Attributes::default(),
            marker: PhantomData,
        }
    }
    /// Start describing a method
    pub fn method(&mut self, name: &'static str) -> MethodBuilder<'_, T> {
        MethodBuilder {
            target: &mut self.methods,
            name,
            display_name: None,
            attributes: Attributes::default(),
            marker: PhantomData,
        }
    }
    pub(crate) fn finish(self) -> TypeDescriptor {
        let name = any::type_name::<T>();
        let described = self.display_name.is_some()
            || !self.bases.is_empty()
            || !self.constructors.is_empty()
            || !self.properties.is_empty()
            || !self.methods.is_empty()
            || !self.attributes.is_empty()
            || self.dynamic.is_some();
        TypeDescriptor {
            name,
            display_name: self.display_name.unwrap_or(name),
            id: TypeHash::of(name),
            type_id: TypeId::of::<T>(),
            size: mem::size_of::<T>(),
            alignment: mem::align_of::<T>(),
            shape: T::shape(),
            described,
            bases: self.bases,
            constructors: self.constructors,
            properties: self.properties,
            methods: self.methods,
            attributes: self.attributes,
            dynamic: self.dynamic,
            all_properties: OnceLock::new(),
            all_methods: OnceLock::new(),
        }
    }
}

unsafe fn dynamic_type_of<T: Polymorphic>(address: *const ()) -> &'static TypeDescriptor {
    (*address.cast::<T>()).describe_self()
}

/// Describes a single property of `T`.
///
/// The property is added once its kind is chosen
/// ([member](PropertyBuilder::member), [array](PropertyBuilder::array), ...).
#[must_use = "a property is only added once its kind is chosen"]
pub struct PropertyBuilder<'a, T: Reflect> {
    target: &'a mut Vec<Property>,
    name: &'static str,
    display_name: Option<&'static str>,
    attributes: Attributes,
    marker: PhantomData<fn() -> T>,
}
impl<'a, T: Reflect> PropertyBuilder<'a, T> {
    /// Set the name presented to users
    pub fn display_name(mut self, name: &'static str) -> Self {
        self.display_name = Some(name);
        self
    }
    /// Attach an attribute to the property
    pub fn attribute<A: Attribute>(mut self, attribute: A) -> Self {
        self.attributes.push(attribute);
        self
    }
    /// A field, read and written directly
    pub fn member<V: Reflect + Clone>(self, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) {
        self.add::<V>(PropertyKind::Member, false, MemberProperty::new(get, Some(get_mut)));
    }
    /// A field which can't be written
    pub fn readonly_member<V: Reflect + Clone>(self, get: fn(&T) -> &V) {
        self.add::<V>(PropertyKind::Member, true, MemberProperty::new(get, None));
    }
    /// A fixed size array field of `S`,
    /// indexed with one component per dimension.
    pub fn array<S: Reflect + Clone, A: Reflect>(self, get: fn(&T) -> &A, get_mut: fn(&mut T) -> &mut A) {
        self.add::<S>(PropertyKind::Array, false, ArrayProperty::<T, A, S>::new(get, Some(get_mut)));
    }
    /// A fixed size array field of `S`, which can't be written
    pub fn readonly_array<S: Reflect + Clone, A: Reflect>(self, get: fn(&T) -> &A) {
        self.add::<S>(PropertyKind::Array, true, ArrayProperty::<T, A, S>::new(get, None));
    }
    /// A property computed by a getter and stored by a setter
    pub fn accessor<V: Reflect + Clone>(self, get: fn(&T) -> V, set: fn(&mut T, V)) {
        self.add::<V>(PropertyKind::Accessor, false, AccessorProperty::new(get, Some(set)));
    }
    /// A property computed by a getter, which can't be written
    pub fn getter<V: Reflect + Clone>(self, get: fn(&T) -> V) {
        self.add::<V>(PropertyKind::Accessor, true, AccessorProperty::new(get, None));
    }
    /// A property computed by arbitrary functions of the object
    pub fn delegate<V, G, S>(self, get: G, set: S)
    where
        V: Reflect + Clone,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let access = DelegateProperty::new(Box::new(get), Some(Box::new(set)));
        self.add::<V>(PropertyKind::Delegate, false, access);
    }
    /// A property computed by an arbitrary function of the object,
    /// which can't be written.
    pub fn delegate_getter<V, G>(self, get: G)
    where
        V: Reflect + Clone,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        let access = DelegateProperty::new(Box::new(get), None);
        self.add::<V>(PropertyKind::Delegate, true, access);
    }
    fn add<V: Reflect>(self, kind: PropertyKind, readonly: bool, access: impl PropertyAccess + 'static) {
        self.target.push(Property {
            name: self.name,
            display_name: self.display_name.unwrap_or(self.name),
            attributes: self.attributes,
            owner: TypeRef::of::<T>(),
            value_type: TypeRef::of::<V>(),
            kind,
            readonly,
            access: Box::new(access),
        });
    }
}

/// Describes a single method of `T`.
///
/// The method is added once its invoker is given.
#[must_use = "a method is only added once its invoker is given"]
pub struct MethodBuilder<'a, T: Reflect> {
    target: &'a mut Vec<Method>,
    name: &'static str,
    display_name: Option<&'static str>,
    attributes: Attributes,
    marker: PhantomData<fn() -> T>,
}
impl<'a, T: Reflect> MethodBuilder<'a, T> {
    /// Set the name presented to users
    pub fn display_name(mut self, name: &'static str) -> Self {
        self.display_name = Some(name);
        self
    }
    /// Attach an attribute to the method
    pub fn attribute<A: Attribute>(mut self, attribute: A) -> Self {
        self.attributes.push(attribute);
        self
    }
    /// A method taking `&mut T`
    pub fn invoker<Args, R, F>(self, function: F)
    where
        F: IntoMethod<T, Args, R>,
    {
        self.add(function.into_signature());
    }
    /// A method taking `&T`
    pub fn const_invoker<Args, R, F>(self, function: F)
    where
        F: IntoConstMethod<T, Args, R>,
    {
        self.add(function.into_signature());
    }
    /// A function without a receiver
    pub fn static_invoker<Args, R, F>(self, function: F)
    where
        F: IntoFunction<Args, R>,
    {
        self.add(function.into_signature());
    }
    fn add(self, signature: Signature) {
        self.target.push(Method {
            name: self.name,
            display_name: self.display_name.unwrap_or(self.name),
            attributes: self.attributes,
            owner: TypeRef::of::<T>(),
            signature,
        });
    }
}
