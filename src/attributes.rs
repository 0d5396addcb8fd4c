//! Attributes: user-defined tags attached to types, properties and methods.
//!
//! The reflection system never looks inside an attribute,
//! it only finds them again by type.
use std::any::{self, Any};
use std::fmt::{self, Debug, Formatter};

/// A tag that can be attached to a type or member.
pub trait Attribute: Any + Send + Sync {}

struct Entry {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// The attributes attached to a type, property or method
#[derive(Default)]
pub struct Attributes {
    entries: Vec<Entry>,
}
impl Attributes {
    pub(crate) fn push<A: Attribute>(&mut self, attribute: A) {
        self.entries.push(Entry {
            type_name: any::type_name::<A>(),
            value: Box::new(attribute),
        });
    }
    /// The first attribute of type `A`
    pub fn get<A: Attribute>(&self) -> Option<&A> {
        self.get_all::<A>().next()
    }
    /// Every attribute of type `A`, in the order they were attached
    pub fn get_all<A: Attribute>(&self) -> impl Iterator<Item = &A> + '_ {
        self.entries
            .iter()
            .filter_map(|entry| entry.value.downcast_ref::<A>())
    }
    /// If any attribute has type `A`
    #[inline]
    pub fn has<A: Attribute>(&self) -> bool {
        self.get::<A>().is_some()
    }
    /// The type names of the attributes
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.type_name)
    }
    /// The number of attributes
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    /// If there are no attributes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
impl Debug for Attributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}
