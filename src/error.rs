//! The reasons a reflective operation can fail.
//!
//! The fail-soft API (`get`, `set`, `invoke`, `instantiate`) swallows these,
//! returning an empty [Value](crate::Value) instead.
//! Every operation also has a `try_*` form which reports them.
use thiserror::Error;

/// An error from a reflective operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// The object could not be viewed as the owning type
    #[error("expected an object of type `{expected}`, found `{found}`")]
    ObjectMismatch {
        /// The owning type of the member
        expected: &'static str,
        /// The type held by the object value
        found: &'static str,
    },
    /// The value does not exactly match the declared value type
    #[error("expected a value of type `{expected}`, found `{found}`")]
    ValueMismatch {
        /// The declared value type
        expected: &'static str,
        /// The type held by the value
        found: &'static str,
    },
    /// An argument does not exactly match its declared parameter type
    #[error("argument {position}: expected `{expected}`, found `{found}`")]
    ArgumentMismatch {
        /// The zero-based position of the argument
        position: usize,
        /// The declared parameter type
        expected: &'static str,
        /// The type held by the argument
        found: &'static str,
    },
    /// The wrong number of arguments were given
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch {
        /// The declared parameter count
        expected: usize,
        /// The number of arguments given
        found: usize,
    },
    /// The property can't be written
    #[error("property `{0}` is read-only")]
    ReadOnly(&'static str),
    /// The property is computed, so it has no address
    #[error("property `{0}` has no addressable storage")]
    NotAddressable(&'static str),
    /// An index component exceeds the extent of its dimension
    #[error("index {index} is out of bounds for dimension {dimension} (extent {extent})")]
    IndexOutOfBounds {
        /// The zero-based dimension
        dimension: usize,
        /// The offending index component
        index: usize,
        /// The extent of the dimension
        extent: usize,
    },
    /// The index has the wrong number of components
    #[error("expected {expected} index components, found {found}")]
    IndexRank {
        /// The rank of the property
        expected: usize,
        /// The number of components given
        found: usize,
    },
    /// None of the type's constructors accept the arguments
    #[error("no constructor of `{0}` accepts the given arguments")]
    NoMatchingConstructor(&'static str),
    /// The method needs a receiver
    #[error("method `{0}` is not a static function")]
    NotStatic(&'static str),
}
