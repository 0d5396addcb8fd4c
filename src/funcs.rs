//! Method reflection.
//!
//! A [Method] invokes a function through erased [Value]s.
//! The object is cast to the owning type, then each argument is cast
//! to its declared parameter type, in order.
//! Only once every cast has succeeded is the function actually called.
use std::any;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use educe::Educe;

use crate::attributes::Attributes;
use crate::cast::{self, object_pointer, object_pointer_mut};
use crate::error::ReflectError;
use crate::refs::TypeRef;
use crate::types::TypeDescriptor;
use crate::value::Value;
use crate::Reflect;

/// How a method receives its object
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum Receiver {
    /// `&mut self`
    Mutable,
    /// `&self`
    Shared,
    /// No receiver at all
    Static,
}

/// The erased implementation of a method
pub(crate) trait Invoke: Send + Sync + Debug {
    /// Called with exactly as many arguments as there are parameters
    unsafe fn invoke(&self, object: &Value, args: &[Value]) -> Result<Value, ReflectError>;
}

/// The parameters, result and implementation of a method
#[doc(hidden)]
pub struct Signature {
    pub(crate) receiver: Receiver,
    pub(crate) parameters: Vec<TypeRef>,
    pub(crate) result: TypeRef,
    pub(crate) invoker: Box<dyn Invoke>,
}

/// A function usable as a method taking `&mut T`
pub trait IntoMethod<T, Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_signature(self) -> Signature;
}
/// A function usable as a method taking `&T`
pub trait IntoConstMethod<T, Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_signature(self) -> Signature;
}
/// A function usable as a method without a receiver
pub trait IntoFunction<Args, R>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_signature(self) -> Signature;
}

/// Copy the next argument out, if it has exactly the type `A`
pub(crate) fn argument<A: Reflect + Clone>(args: &[Value], position: &mut usize) -> Result<A, ReflectError> {
    let index = *position;
    *position += 1;
    let value = args.get(index).ok_or(ReflectError::ArityMismatch {
        expected: index + 1,
        found: args.len(),
    })?;
    cast::value_cast::<A>(value)
        .cloned()
        .ok_or_else(|| ReflectError::ArgumentMismatch {
            position: index,
            expected: any::type_name::<A>(),
            found: value.type_descriptor().name(),
        })
}

#[derive(Educe)]
#[educe(Debug)]
struct MutableInvoker<F, T, Args, R> {
    #[educe(Debug(ignore))]
    function: F,
    marker: PhantomData<fn(T, Args) -> R>,
}
#[derive(Educe)]
#[educe(Debug)]
struct SharedInvoker<F, T, Args, R> {
    #[educe(Debug(ignore))]
    function: F,
    marker: PhantomData<fn(T, Args) -> R>,
}
#[derive(Educe)]
#[educe(Debug)]
struct StaticInvoker<F, Args, R> {
    #[educe(Debug(ignore))]
    function: F,
    marker: PhantomData<fn(Args) -> R>,
}

macro_rules! impl_invokers {
    ($($arg:ident),*) => {
        impl<T, F, R, $($arg,)*> IntoMethod<T, ($($arg,)*), R> for F
        where
            T: Reflect,
            R: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
        {
            fn into_signature(self) -> Signature {
                Signature {
                    receiver: Receiver::Mutable,
                    parameters: vec![$(TypeRef::of::<$arg>()),*],
                    result: TypeRef::of::<R>(),
                    invoker: Box::new(MutableInvoker::<F, T, ($($arg,)*), R> {
                        function: self,
                        marker: PhantomData,
                    }),
                }
            }
        }
        impl<T, F, R, $($arg,)*> Invoke for MutableInvoker<F, T, ($($arg,)*), R>
        where
            T: Reflect,
            R: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
        {
            #[allow(non_snake_case, unused_variables, unused_mut)]
            unsafe fn invoke(&self, object: &Value, args: &[Value]) -> Result<Value, ReflectError> {
                let object = &mut *object_pointer_mut::<T>(object)?;
                let mut position = 0;
                $(let $arg = argument::<$arg>(args, &mut position)?;)*
                Ok(Value::new((self.function)(object, $($arg),*)))
            }
        }

        impl<T, F, R, $($arg,)*> IntoConstMethod<T, ($($arg,)*), R> for F
        where
            T: Reflect,
            R: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
        {
            fn into_signature(self) -> Signature {
                Signature {
                    receiver: Receiver::Shared,
                    parameters: vec![$(TypeRef::of::<$arg>()),*],
                    result: TypeRef::of::<R>(),
                    invoker: Box::new(SharedInvoker::<F, T, ($($arg,)*), R> {
                        function: self,
                        marker: PhantomData,
                    }),
                }
            }
        }
        impl<T, F, R, $($arg,)*> Invoke for SharedInvoker<F, T, ($($arg,)*), R>
        where
            T: Reflect,
            R: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
        {
            #[allow(non_snake_case, unused_variables, unused_mut)]
            unsafe fn invoke(&self, object: &Value, args: &[Value]) -> Result<Value, ReflectError> {
                let object = &*object_pointer::<T>(object)?;
                let mut position = 0;
                $(let $arg = argument::<$arg>(args, &mut position)?;)*
                Ok(Value::new((self.function)(object, $($arg),*)))
            }
        }

        impl<F, R, $($arg,)*> IntoFunction<($($arg,)*), R> for F
        where
            R: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
        {
            fn into_signature(self) -> Signature {
                Signature {
                    receiver: Receiver::Static,
                    parameters: vec![$(TypeRef::of::<$arg>()),*],
                    result: TypeRef::of::<R>(),
                    invoker: Box::new(StaticInvoker::<F, ($($arg,)*), R> {
                        function: self,
                        marker: PhantomData,
                    }),
                }
            }
        }
        impl<F, R, $($arg,)*> Invoke for StaticInvoker<F, ($($arg,)*), R>
        where
            R: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
        {
            #[allow(non_snake_case, unused_variables, unused_mut)]
            unsafe fn invoke(&self, _object: &Value, args: &[Value]) -> Result<Value, ReflectError> {
                let mut position = 0;
                $(let $arg = argument::<$arg>(args, &mut position)?;)*
                Ok(Value::new((self.function)($($arg),*)))
            }
        }
    };
}
impl_invokers!();
impl_invokers!(A1);
impl_invokers!(A1, A2);
impl_invokers!(A1, A2, A3);
impl_invokers!(A1, A2, A3, A4);
impl_invokers!(A1, A2, A3, A4, A5);
impl_invokers!(A1, A2, A3, A4, A5, A6);

/// A named operation of a type, invoked through erased values.
///
/// ## Safety
/// Invoking a method with a receiver dereferences any pointer held by the object value.
/// Such a pointer must point to a live instance of its target type (or of a type derived from it),
/// and the instance must not be aliased by a reference while a `&mut self` method runs.
pub struct Method {
    pub(crate) name: &'static str,
    pub(crate) display_name: &'static str,
    pub(crate) attributes: Attributes,
    pub(crate) owner: TypeRef,
    pub(crate) signature: Signature,
}
impl Method {
    /// The name of the method
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// The name to present to users
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }
    /// The attributes attached to this method
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
    /// The type declaring this method
    #[inline]
    pub fn owner_type(&self) -> &'static TypeDescriptor {
        self.owner.get()
    }
    /// How the method receives its object
    #[inline]
    pub fn receiver(&self) -> Receiver {
        self.signature.receiver
    }
    /// The type of the result
    #[inline]
    pub fn result_type(&self) -> &'static TypeDescriptor {
        self.signature.result.get()
    }
    /// The types of the parameters, in order
    pub fn argument_types(&self) -> impl ExactSizeIterator<Item = &'static TypeDescriptor> + '_ {
        self.signature.parameters.iter().map(|parameter| parameter.get())
    }

    /// Invoke the method, reporting why it couldn't be called
    ///
    /// ## Safety
    /// See [Method].
    pub unsafe fn try_invoke(&self, object: &Value, args: &[Value]) -> Result<Value, ReflectError> {
        let expected = self.signature.parameters.len();
        if args.len() != expected {
            return Err(ReflectError::ArityMismatch {
                expected,
                found: args.len(),
            });
        }
        self.signature.invoker.invoke(object, args)
    }
    /// Invoke the method,
    /// or return an empty value if it couldn't be called.
    ///
    /// ## Safety
    /// See [Method].
    pub unsafe fn invoke(&self, object: &Value, args: &[Value]) -> Value {
        self.try_invoke(object, args).unwrap_or_else(|error| {
            tracing::trace!(method = self.name, %error, "invoke failed");
            Value::empty()
        })
    }
    /// Invoke a method without a receiver
    pub fn try_invoke_static(&self, args: &[Value]) -> Result<Value, ReflectError> {
        if self.signature.receiver != Receiver::Static {
            return Err(ReflectError::NotStatic(self.name));
        }
        // Static invokers never look at the object
        unsafe { self.try_invoke(&Value::empty(), args) }
    }
    /// Invoke a method without a receiver,
    /// or return an empty value if it couldn't be called.
    pub fn invoke_static(&self, args: &[Value]) -> Value {
        self.try_invoke_static(args).unwrap_or_else(|error| {
            tracing::trace!(method = self.name, %error, "invoke failed");
            Value::empty()
        })
    }
}
impl Debug for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("receiver", &self.signature.receiver)
            .field("parameters", &self.signature.parameters)
            .field("result", &self.signature.result)
            .field("invoker", &self.signature.invoker)
            .finish()
    }
}

member_list! {
    /// The methods of a type, inherited ones included
    MethodList => Method
}
