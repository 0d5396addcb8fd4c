//! Runtime reflection through type-erased descriptors.
//!
//! Every type implementing [Reflect] gets a single, immutable [TypeDescriptor],
//! built the first time it is requested.
//! The descriptor lists the type's bases, constructors, properties, methods and attributes.
//! All of them can be used through erased [Value]s,
//! without knowing the concrete type at compile time.
//!
//! ```
//! use erased_reflect::{descriptor, value_cast, Reflect, TypeBuilder, Value};
//!
//! #[derive(Clone)]
//! struct Counter {
//!     count: i32,
//! }
//! unsafe impl Reflect for Counter {
//!     fn describe(ty: &mut TypeBuilder<Self>) {
//!         ty.constructor(|| Counter { count: 0 });
//!         ty.property("count").member(|c| &c.count, |c| &mut c.count);
//!     }
//! }
//!
//! let counter = descriptor::<Counter>().instantiate(&[]);
//! let count = descriptor::<Counter>().properties().get("count").unwrap();
//! unsafe {
//!     count.set(&counter, &Value::new(3), &[]);
//!     assert_eq!(value_cast::<i32>(&count.get(&counter, &[])), Some(&3));
//! }
//! ```
//!
//! Reflection is speculative by nature, so failures are silent:
//! a failed cast is `None`, and a failed call returns an empty [Value].
//! Every operation also has a `try_*` form reporting a [ReflectError].
#![deny(missing_docs)]

#[macro_use]
mod macros;
#[cfg(feature = "builtins")]
pub mod builtins;
pub mod attributes;
pub mod builder;
pub mod cast;
pub mod constructors;
pub mod error;
pub mod funcs;
pub mod properties;
pub mod refs;
pub mod registry;
pub mod types;
pub mod value;

mod core;

pub use crate::attributes::{Attribute, Attributes};
pub use crate::builder::TypeBuilder;
pub use crate::cast::{
    is_base_of, object_cast, object_cast_mut, upcast, upcast_mut, value_cast, value_cast_mut,
    value_cast_object, value_cast_object_mut, value_cast_or, DynamicType, Extends, Polymorphic,
};
pub use crate::core::Void;
pub use crate::error::ReflectError;
pub use crate::registry::{
    descriptor, find_descriptor, find_descriptor_by_id, registered_types, visit_all_types,
};
pub use crate::types::{Shape, TypeDescriptor, TypeHash};
pub use crate::value::Value;

#[cfg(feature = "derive")]
pub use erased_reflect_derive::Reflect;

#[doc(hidden)]
pub use inventory;

use std::any::Any;

/// The trait for types that can be described at runtime.
///
/// Most types only need to implement [describe](Reflect::describe),
/// or derive it with `#[derive(Reflect)]`.
/// Types that don't override it are still usable in [Value]s,
/// they just have an empty description.
///
/// ## Safety
/// The [shape](Reflect::shape) of the type must match its representation,
/// because the casting engine reinterprets pointers based on it.
/// The default shape (a plain value) is always correct,
/// and this crate already provides the pointer-like types.
///
/// Offsets registered through [Extends] are checked by that trait's own contract.
pub unsafe trait Reflect: Any + Sized {
    /// The representation of this type
    #[doc(hidden)]
    fn shape() -> Shape {
        Shape::Value
    }
    /// Describe the bases, constructors, properties, methods
    /// and attributes of this type.
    ///
    /// This is called exactly once, when the descriptor is first built.
    fn describe(_ty: &mut TypeBuilder<Self>) {}
}
