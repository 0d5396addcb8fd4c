//! The process-wide registry of type descriptors.
//!
//! Descriptors are built lazily, the first time something asks for them,
//! and are appended to a single enumeration chain in the order they were published.
//! Types named with [register_types!](crate::register_types) are published up front,
//! the first time the registry is enumerated or searched by name.
use std::any::{self, TypeId};
use std::cell::RefCell;
use std::sync::{LazyLock, Once, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builder::TypeBuilder;
use crate::refs::TypeRef;
use crate::types::{TypeDescriptor, TypeHash};
use crate::Reflect;

/// A static registration of a type,
/// submitted by [register_types!](crate::register_types)
#[doc(hidden)]
pub struct Registration(TypeRef);
impl Registration {
    #[doc(hidden)]
    pub const fn of<T: Reflect>() -> Registration {
        Registration(TypeRef::of::<T>())
    }
}
inventory::collect!(Registration);

/// Filled exactly once with the descriptor of one type
type Slot = OnceLock<&'static TypeDescriptor>;

#[derive(Default)]
struct RegistryState {
    slots: FxHashMap<TypeId, &'static Slot>,
    /// Every published descriptor, in publication order
    chain: Vec<&'static TypeDescriptor>,
}

static REGISTRY: LazyLock<RwLock<RegistryState>> = LazyLock::new(Default::default);

thread_local! {
    static UNDER_CONSTRUCTION: RefCell<Vec<TypeId>> = const { RefCell::new(Vec::new()) };
}

/// Marks a type as being built on the current thread
struct ConstructionGuard(TypeId);
impl ConstructionGuard {
    fn enter<T: Reflect>() -> ConstructionGuard {
        let key = TypeId::of::<T>();
        UNDER_CONSTRUCTION.with(|building| {
            let mut building = building.borrow_mut();
            if building.contains(&key) {
                panic!(
                    "Re-entrant construction of the descriptor for `{}`",
                    any::type_name::<T>()
                );
            }
            building.push(key);
        });
        ConstructionGuard(key)
    }
}
impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        UNDER_CONSTRUCTION.with(|building| {
            building.borrow_mut().retain(|key| *key != self.0);
        });
    }
}

/// The descriptor of `T`
///
/// The descriptor is built the first time it is requested,
/// exactly once even if several threads race to request it.
/// The other threads wait for it to be published,
/// and no thread ever observes a partially built descriptor.
pub fn descriptor<T: Reflect>() -> &'static TypeDescriptor {
    let slot = slot_of(TypeId::of::<T>());
    if let Some(&published) = slot.get() {
        return published;
    }
    // Re-entering the slot on the same thread would deadlock instead of panicking
    let _guard = ConstructionGuard::enter::<T>();
    *slot.get_or_init(|| {
        // The registry lock isn't held, so describe() may look up other descriptors
        let mut builder = TypeBuilder::<T>::new();
        T::describe(&mut builder);
        let published: &'static TypeDescriptor = Box::leak(Box::new(builder.finish()));
        REGISTRY.write().chain.push(published);
        tracing::debug!(type_name = published.name(), id = %published.id(), "published type descriptor");
        published
    })
}

/// The slot of a type, created on first use
fn slot_of(key: TypeId) -> &'static Slot {
    if let Some(&slot) = REGISTRY.read().slots.get(&key) {
        return slot;
    }
    let mut state = REGISTRY.write();
    let slot: &'static Slot = *state
        .slots
        .entry(key)
        .or_insert_with(|| &*Box::leak(Box::new(OnceLock::new())));
    slot
}

/// Publish every type submitted with [register_types!](crate::register_types)
fn ensure_registered() {
    static REGISTERED: Once = Once::new();
    REGISTERED.call_once(|| {
        let mut count = 0usize;
        for registration in inventory::iter::<Registration> {
            registration.0.get();
            count += 1;
        }
        tracing::debug!(count, "published statically registered types");
    });
}

/// A copy of the chain,
/// without forcing static registrations.
pub(crate) fn snapshot() -> Vec<&'static TypeDescriptor> {
    REGISTRY.read().chain.clone()
}

/// Every published descriptor, in publication order
pub fn registered_types() -> Vec<&'static TypeDescriptor> {
    ensure_registered();
    snapshot()
}

/// Visit every published descriptor in publication order,
/// stopping early if the visitor returns `false`.
///
/// The visitor may request other descriptors.
/// Any that are newly built are not visited by this call.
pub fn visit_all_types<F>(mut visitor: F)
where
    F: FnMut(&'static TypeDescriptor) -> bool,
{
    for descriptor in registered_types() {
        if !visitor(descriptor) {
            break;
        }
    }
}

/// Find a published descriptor by its full type name
pub fn find_descriptor(name: &str) -> Option<&'static TypeDescriptor> {
    find_descriptor_by_id(TypeHash::of(name))
}

/// Find a published descriptor by its identity
pub fn find_descriptor_by_id(id: TypeHash) -> Option<&'static TypeDescriptor> {
    registered_types()
        .into_iter()
        .find(|descriptor| descriptor.id() == id)
}

#[cfg(test)]
mod test {
    use super::*;

    struct Unregistered;
    unsafe impl Reflect for Unregistered {}

    struct Twice;
    unsafe impl Reflect for Twice {}

    struct SelfReferential;
    unsafe impl Reflect for SelfReferential {
        fn describe(_ty: &mut TypeBuilder<Self>) {
            descriptor::<SelfReferential>();
        }
    }

    #[test]
    #[should_panic(expected = "Re-entrant construction")]
    fn reentrant_construction_panics() {
        descriptor::<SelfReferential>();
    }

    #[test]
    fn lookup_is_memoized() {
        let first = descriptor::<Twice>();
        let second = descriptor::<Twice>();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn published_types_are_found_by_name() {
        let name = any::type_name::<Unregistered>();
        assert!(find_descriptor(name).is_none());
        let published = descriptor::<Unregistered>();
        assert_eq!(find_descriptor(name), Some(published));
        assert_eq!(find_descriptor_by_id(published.id()), Some(published));
    }
}
