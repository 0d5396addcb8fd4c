//! The erased value container.
//!
//! A [Value] owns a single value of any [Reflect] type,
//! along with the descriptor of that type.
//! Small values without drop glue live inline,
//! everything else is boxed along with a function that drops it.
use std::fmt::{self, Debug, Formatter};
use std::mem::{self, MaybeUninit};
use std::ptr::NonNull;

use crate::cast;
use crate::core::Void;
use crate::registry;
use crate::types::TypeDescriptor;
use crate::Reflect;

/// The number of bytes a [Value] can hold without allocating
pub const INLINE_CAPACITY: usize = 16;

#[derive(Copy, Clone)]
#[repr(C, align(8))]
struct InlineBuffer([MaybeUninit<u8>; INLINE_CAPACITY]);
impl InlineBuffer {
    #[inline]
    const fn uninit() -> InlineBuffer {
        InlineBuffer([MaybeUninit::uninit(); INLINE_CAPACITY])
    }
}

enum Storage {
    Inline(InlineBuffer),
    Heap {
        data: NonNull<u8>,
        drop: unsafe fn(NonNull<u8>),
    },
}

/// If values of `T` are stored inline
const fn fits_inline<T>() -> bool {
    mem::size_of::<T>() <= INLINE_CAPACITY
        && mem::align_of::<T>() <= mem::align_of::<InlineBuffer>()
        && !mem::needs_drop::<T>()
}

unsafe fn drop_boxed<T>(data: NonNull<u8>) {
    drop(Box::from_raw(data.as_ptr().cast::<T>()));
}

/// An owned value of some erased type
///
/// Values can't be cloned, only moved.
/// Assigning a new value releases the old one first.
pub struct Value {
    /// The type of the held value, or `None` if empty
    descriptor: Option<&'static TypeDescriptor>,
    storage: Storage,
}
impl Value {
    /// A value holding nothing
    #[inline]
    pub const fn empty() -> Value {
        Value {
            descriptor: None,
            storage: Storage::Inline(InlineBuffer::uninit()),
        }
    }
    /// Erase the specified value
    pub fn new<T: Reflect>(value: T) -> Value {
        let mut result = Value::empty();
        result.assign(value);
        result
    }
    /// A value holding a mutable pointer to `target`
    ///
    /// The value doesn't borrow `target`,
    /// so it is up to the caller to keep it alive while the pointer is used.
    #[inline]
    pub fn pointer<T: Reflect>(target: &mut T) -> Value {
        Value::new(target as *mut T)
    }
    /// A value holding a shared pointer to `target`
    ///
    /// Like [pointer](Value::pointer), the value doesn't borrow `target`.
    #[inline]
    pub fn const_pointer<T: Reflect>(target: &T) -> Value {
        Value::new(target as *const T)
    }
    /// Replace the held value
    ///
    /// The previous value is released before the new one is stored.
    pub fn assign<T: Reflect>(&mut self, value: T) {
        self.reset();
        let descriptor = registry::descriptor::<T>();
        self.storage = if fits_inline::<T>() {
            let mut buffer = InlineBuffer::uninit();
            unsafe {
                buffer.0.as_mut_ptr().cast::<T>().write(value);
            }
            Storage::Inline(buffer)
        } else {
            Storage::Heap {
                data: NonNull::from(Box::leak(Box::new(value))).cast::<u8>(),
                drop: drop_boxed::<T>,
            }
        };
        self.descriptor = Some(descriptor);
    }
    /// Release the held value, leaving this empty.
    ///
    /// Resetting an empty value does nothing.
    pub fn reset(&mut self) {
        self.descriptor = None;
        let storage = mem::replace(&mut self.storage, Storage::Inline(InlineBuffer::uninit()));
        if let Storage::Heap { data, drop } = storage {
            unsafe { drop(data) }
        }
    }
    /// Move the held value into a new [Value],
    /// leaving this one empty.
    #[inline]
    pub fn take(&mut self) -> Value {
        mem::replace(self, Value::empty())
    }
    /// Move the held value out,
    /// if it has exactly the type `T`.
    ///
    /// Otherwise the value is given back unchanged.
    pub fn into_inner<T: Reflect>(mut self) -> Result<T, Value> {
        if !self.is::<T>() {
            return Err(self);
        }
        self.descriptor = None;
        let storage = mem::replace(&mut self.storage, Storage::Inline(InlineBuffer::uninit()));
        Ok(unsafe {
            match storage {
                Storage::Inline(buffer) => buffer.0.as_ptr().cast::<T>().read(),
                Storage::Heap { data, .. } => *Box::from_raw(data.as_ptr().cast::<T>()),
            }
        })
    }
    /// The type of the held value,
    /// or the descriptor of [Void] if this is empty.
    pub fn type_descriptor(&self) -> &'static TypeDescriptor {
        match self.descriptor {
            Some(descriptor) => descriptor,
            None => registry::descriptor::<Void>(),
        }
    }
    /// If nothing is held
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptor.is_none()
    }
    /// If the held value has exactly the type `T`
    #[inline]
    pub fn is<T: Reflect>(&self) -> bool {
        self.descriptor.is_some_and(|descriptor| descriptor.is::<T>())
    }
    /// If the held value is stored inline, without a heap allocation.
    ///
    /// Empty values count as inline.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }
    /// View the held value as a `T`.
    ///
    /// See [value_cast](crate::value_cast).
    #[inline]
    pub fn cast<T: Reflect>(&self) -> Option<&T> {
        cast::value_cast::<T>(self)
    }
    /// Mutably view the held value as a `T`.
    ///
    /// See [value_cast_mut](crate::value_cast_mut).
    #[inline]
    pub fn cast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        cast::value_cast_mut::<T>(self)
    }
    /// The held descriptor, without substituting [Void]
    #[inline]
    pub(crate) fn held(&self) -> Option<&'static TypeDescriptor> {
        self.descriptor
    }
    /// The address of the held value
    pub(crate) fn data(&self) -> *const u8 {
        match self.storage {
            Storage::Inline(ref buffer) => buffer.0.as_ptr().cast(),
            Storage::Heap { data, .. } => data.as_ptr(),
        }
    }
    /// The address of the held value, for writing
    pub(crate) fn data_mut(&mut self) -> *mut u8 {
        match self.storage {
            Storage::Inline(ref mut buffer) => buffer.0.as_mut_ptr().cast(),
            Storage::Heap { data, .. } => data.as_ptr(),
        }
    }
}
impl Drop for Value {
    #[inline]
    fn drop(&mut self) {
        self.reset();
    }
}
impl Default for Value {
    #[inline]
    fn default() -> Value {
        Value::empty()
    }
}
impl<T: Reflect> From<T> for Value {
    #[inline]
    fn from(value: T) -> Value {
        Value::new(value)
    }
}
impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.descriptor {
            Some(descriptor) => write!(f, "Value({})", descriptor.name()),
            None => f.write_str("Value(<empty>)"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<usize>>);
    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }
    unsafe impl Reflect for DropCounter {}

    #[test]
    fn storage_mode() {
        assert!(Value::new(7i32).is_inline());
        assert!(Value::new([1u64, 2u64]).is_inline());
        // Too large
        assert!(!Value::new([1u64, 2, 3]).is_inline());
        // Drop glue
        assert!(!Value::new(Box::new(1i32)).is_inline());
    }

    #[test]
    fn drops_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let mut value = Value::new(DropCounter(drops.clone()));
        assert_eq!(drops.get(), 0);
        value.assign(5i32);
        assert_eq!(drops.get(), 1);
        value.assign(DropCounter(drops.clone()));
        let moved = value.take();
        assert!(value.is_empty());
        value.reset();
        assert_eq!(drops.get(), 1);
        drop(moved);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut value = Value::new(Box::new(1i32));
        value.reset();
        value.reset();
        assert!(value.is_empty());
        assert!(value.is_inline());
    }

    #[test]
    fn into_inner() {
        let drops = Rc::new(Cell::new(0));
        let value = Value::new(DropCounter(drops.clone()));
        let value = value.into_inner::<i32>().unwrap_err();
        let counter = value.into_inner::<DropCounter>().ok().unwrap();
        assert_eq!(drops.get(), 0);
        drop(counter);
        assert_eq!(drops.get(), 1);
        assert_eq!(Value::new(12u8).into_inner::<u8>().ok(), Some(12));
    }

    #[test]
    fn empty_value_is_void() {
        let value = Value::empty();
        assert!(value.type_descriptor().is::<Void>());
        assert_eq!(format!("{:?}", value), "Value(<empty>)");
    }
}
