//! Implementations of [Reflect] for core types
//!
//! Primitives have empty descriptions.
//! Pointers, references, boxes and arrays describe their shape,
//! which is what the casting engine and array properties walk.
use crate::refs::TypeRef;
use crate::types::Shape;
use crate::{Reflect, TypeBuilder};

/// The type of an empty [Value](crate::Value).
///
/// It is uninhabited, so no value ever actually holds one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Void {}
unsafe impl Reflect for Void {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.display_name("void");
    }
}

macro_rules! impl_primitive {
    ($($target:ty),*) => {
        $(unsafe impl Reflect for $target {})*
    };
}
impl_primitive!(
    (), bool, char, f32, f64,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize
);

/// A mutable pointer
///
/// Dereferencing it is up to the user,
/// the reflection system only ever reads the address.
unsafe impl<T: Reflect> Reflect for *mut T {
    fn shape() -> Shape {
        Shape::Pointer {
            target: TypeRef::of::<T>(),
            mutable: true,
            counterpart: TypeRef::of::<*const T>(),
        }
    }
}
/// A shared pointer, which plays the role of a pointer to const
unsafe impl<T: Reflect> Reflect for *const T {
    fn shape() -> Shape {
        Shape::Pointer {
            target: TypeRef::of::<T>(),
            mutable: false,
            counterpart: TypeRef::of::<*mut T>(),
        }
    }
}
unsafe impl<T: Reflect> Reflect for &'static T {
    fn shape() -> Shape {
        Shape::Reference {
            target: TypeRef::of::<T>(),
            mutable: false,
            counterpart: TypeRef::of::<&'static mut T>(),
        }
    }
}
unsafe impl<T: Reflect> Reflect for &'static mut T {
    fn shape() -> Shape {
        Shape::Reference {
            target: TypeRef::of::<T>(),
            mutable: true,
            counterpart: TypeRef::of::<&'static T>(),
        }
    }
}
unsafe impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::Owned {
            target: TypeRef::of::<T>(),
        }
    }
}
/// A fixed size array, which decays to a pointer to its first element
unsafe impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::Array {
            element: TypeRef::of::<T>(),
            extent: N,
            decay: TypeRef::of::<*mut T>(),
        }
    }
}
