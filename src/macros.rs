/// Implement [Reflect](crate::Reflect) for types without a description.
///
/// Their descriptors are empty, but they can still be held by a [Value](crate::Value)
/// and used as attributes, arguments or property values.
#[macro_export]
macro_rules! reflect_opaque {
    ($($target:ty),+ $(,)?) => {
        $(unsafe impl $crate::Reflect for $target {})+
    };
}

/// Register types with the global registry at startup.
///
/// Registered types can be enumerated by [visit_all_types](crate::visit_all_types)
/// and found by [find_descriptor](crate::find_descriptor)
/// before anything has requested their descriptors.
#[macro_export]
macro_rules! register_types {
    ($($target:ty),+ $(,)?) => {
        $($crate::inventory::submit! {
            $crate::registry::Registration::of::<$target>()
        })+
    };
}

/// Get the integer offset of the specified field
#[macro_export]
macro_rules! field_offset {
    ($target:ty, $($field:tt).+) => {
        ::core::mem::offset_of!($target, $($field).+)
    };
}

/// Declare that a struct derives from the type of one of its fields.
///
/// ```
/// # use erased_reflect::{extends, Reflect};
/// struct Shape { sides: u32 }
/// struct Square { shape: Shape, length: f32 }
/// # unsafe impl Reflect for Shape {}
/// # unsafe impl Reflect for Square {}
/// extends!(Square => Shape, shape);
/// ```
#[macro_export]
macro_rules! extends {
    ($derived:ty => $base:ty, $($field:tt).+) => {
        const _: () = {
            #[allow(dead_code)]
            fn base_field(derived: &$derived) -> &$base {
                &derived.$($field).+
            }
        };
        unsafe impl $crate::Extends<$base> for $derived {
            const OFFSET: usize = $crate::field_offset!($derived, $($field).+);
        }
    };
}

/// A list of named members of a type, inherited ones included
macro_rules! member_list {
    ($(#[$attr:meta])* $list:ident => $member:ty) => {
        $(#[$attr])*
        #[derive(Copy, Clone)]
        pub struct $list {
            entries: &'static [&'static $member],
        }
        impl $list {
            #[inline]
            pub(crate) fn new(entries: &'static [&'static $member]) -> $list {
                $list { entries }
            }
            /// Find a member by name
            pub fn get(&self, name: &str) -> Option<&'static $member> {
                self.entries.iter().copied().find(|member| member.name() == name)
            }
            /// The number of members
            #[inline]
            pub fn len(&self) -> usize {
                self.entries.len()
            }
            /// If there are no members
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }
            /// Iterate over the members, inherited ones first
            pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'static, &'static $member>> {
                self.entries.iter().copied()
            }
        }
        impl IntoIterator for $list {
            type Item = &'static $member;
            type IntoIter = std::iter::Copied<std::slice::Iter<'static, &'static $member>>;
            fn into_iter(self) -> Self::IntoIter {
                self.entries.iter().copied()
            }
        }
        impl std::fmt::Debug for $list {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_list().entries(self.entries.iter().map(|member| member.name())).finish()
            }
        }
    };
}
