//! A serializable summary of type descriptors.
//!
//! This only describes the metadata (names, layout and member signatures).
//! Descriptors can't be deserialized, since they are built from code.
use serde::{Serialize, Serializer};

use super::TypeDescriptor;
use crate::funcs::{Method, Receiver};
use crate::properties::{Property, PropertyKind};

#[derive(Serialize)]
#[serde(rename = "TypeDescriptor")]
struct DescriptorSummary {
    name: &'static str,
    display_name: &'static str,
    id: u64,
    size: usize,
    alignment: usize,
    bases: Vec<&'static str>,
    properties: Vec<PropertySummary>,
    methods: Vec<MethodSummary>,
}

#[derive(Serialize)]
#[serde(rename = "Property")]
struct PropertySummary {
    name: &'static str,
    display_name: &'static str,
    value_type: &'static str,
    kind: PropertyKind,
    readonly: bool,
}
impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        PropertySummary {
            name: property.name(),
            display_name: property.display_name(),
            value_type: property.value_type().name(),
            kind: property.kind(),
            readonly: property.is_readonly(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename = "Method")]
struct MethodSummary {
    name: &'static str,
    display_name: &'static str,
    receiver: Receiver,
    parameters: Vec<&'static str>,
    result: &'static str,
}
impl From<&Method> for MethodSummary {
    fn from(method: &Method) -> Self {
        MethodSummary {
            name: method.name(),
            display_name: method.display_name(),
            receiver: method.receiver(),
            parameters: method.argument_types().map(TypeDescriptor::name).collect(),
            result: method.result_type().name(),
        }
    }
}

/// Only the members declared on the type itself are included,
/// inherited ones are found through the bases.
impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DescriptorSummary {
            name: self.name,
            display_name: self.display_name,
            id: self.id.value(),
            size: self.size,
            alignment: self.alignment,
            bases: self.bases().map(TypeDescriptor::name).collect(),
            properties: self.properties.iter().map(PropertySummary::from).collect(),
            methods: self.methods.iter().map(MethodSummary::from).collect(),
        }
        .serialize(serializer)
    }
}
