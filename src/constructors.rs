//! Constructor resolution.
//!
//! A type may declare any number of constructors.
//! Instantiation tries them in declaration order,
//! and uses the first one whose parameters accept the arguments.
//! There is no ranking between candidates.
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use educe::Educe;

use crate::error::ReflectError;
use crate::funcs::argument;
use crate::refs::TypeRef;
use crate::types::TypeDescriptor;
use crate::value::Value;
use crate::Reflect;

/// The erased implementation of a constructor
trait Construct: Send + Sync + Debug {
    /// Called with exactly as many arguments as there are parameters
    fn construct(&self, args: &[Value]) -> Result<Value, ReflectError>;
}

/// A way to build a new instance of a type from erased arguments
pub struct Constructor {
    parameters: Vec<TypeRef>,
    constructor: Box<dyn Construct>,
}
impl Constructor {
    /// The types of the parameters, in order
    pub fn argument_types(&self) -> impl ExactSizeIterator<Item = &'static TypeDescriptor> + '_ {
        self.parameters.iter().map(|parameter| parameter.get())
    }
    /// Construct a new instance on the heap,
    /// reporting why the arguments were rejected.
    ///
    /// The result holds a `Box` of the constructed type.
    pub fn try_invoke(&self, args: &[Value]) -> Result<Value, ReflectError> {
        if args.len() != self.parameters.len() {
            return Err(ReflectError::ArityMismatch {
                expected: self.parameters.len(),
                found: args.len(),
            });
        }
        self.constructor.construct(args)
    }
    /// Construct a new instance on the heap,
    /// or return an empty value if the arguments were rejected.
    pub fn invoke(&self, args: &[Value]) -> Value {
        self.try_invoke(args).unwrap_or_else(|error| {
            tracing::trace!(%error, "constructor rejected its arguments");
            Value::empty()
        })
    }
}
impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .field("constructor", &self.constructor)
            .finish()
    }
}

/// A function usable as a constructor of `T`
pub trait IntoConstructor<T, Args>: Send + Sync + 'static {
    /// Erase the function
    fn into_constructor(self) -> Constructor;
}

#[derive(Educe)]
#[educe(Debug)]
struct NativeConstructor<F, T, Args> {
    #[educe(Debug(ignore))]
    function: F,
    marker: PhantomData<fn(Args) -> T>,
}

macro_rules! impl_constructors {
    ($($arg:ident),*) => {
        impl<T, F, $($arg,)*> IntoConstructor<T, ($($arg,)*)> for F
        where
            T: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn($($arg),*) -> T + Send + Sync + 'static,
        {
            fn into_constructor(self) -> Constructor {
                Constructor {
                    parameters: vec![$(TypeRef::of::<$arg>()),*],
                    constructor: Box::new(NativeConstructor::<F, T, ($($arg,)*)> {
                        function: self,
                        marker: PhantomData,
                    }),
                }
            }
        }
        impl<T, F, $($arg,)*> Construct for NativeConstructor<F, T, ($($arg,)*)>
        where
            T: Reflect,
            $($arg: Reflect + Clone,)*
            F: Fn($($arg),*) -> T + Send + Sync + 'static,
        {
            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn construct(&self, args: &[Value]) -> Result<Value, ReflectError> {
                let mut position = 0;
                $(let $arg = argument::<$arg>(args, &mut position)?;)*
                Ok(Value::new(Box::new((self.function)($($arg),*))))
            }
        }
    };
}
impl_constructors!();
impl_constructors!(A1);
impl_constructors!(A1, A2);
impl_constructors!(A1, A2, A3);
impl_constructors!(A1, A2, A3, A4);
impl_constructors!(A1, A2, A3, A4, A5);
impl_constructors!(A1, A2, A3, A4, A5, A6);

/// Use the first constructor accepting the arguments
///
/// Arguments are all cast before a constructor is called,
/// so rejected candidates have no side effects.
pub(crate) fn resolve(constructors: &[Constructor], args: &[Value]) -> Option<Value> {
    constructors
        .iter()
        .find_map(|constructor| constructor.try_invoke(args).ok())
}
