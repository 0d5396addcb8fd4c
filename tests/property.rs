mod common;

use erased_reflect::properties::PropertyKind;
use erased_reflect::{descriptor, value_cast, value_cast_or, ReflectError, Value};
use pretty_assertions::assert_eq;

use common::{Base, MyClass, MyClass2};

#[test]
fn member() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let property = descriptor::<Base>().properties().get("b_v0").unwrap();
    assert_eq!(property.kind(), PropertyKind::Member);

    unsafe {
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 11);
        property.set(&target, &Value::new(101), &[]);
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 101);

        let p0 = value_cast::<*mut i32>(&property.get_ref(&target, &[])).copied().unwrap();
        assert_eq!(*p0, 101);
        let shared = Value::const_pointer(&*target.cast::<*mut Base>().copied().unwrap());
        let p1 = value_cast::<*const i32>(&property.get_cref(&shared, &[])).copied().unwrap();
        assert_eq!(*p1, 101);

        *p0 = 2020;
        assert_eq!(*p1, 2020);
    }
    assert_eq!(object.b_v0, 2020);
}

#[test]
fn set_mismatches_are_silent() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let property = descriptor::<Base>().properties().get("b_v0").unwrap();
    unsafe {
        // Wrong value type
        property.set(&target, &Value::new(5u8), &[]);
        assert_eq!(
            property.try_set(&target, &Value::new(5u8), &[]),
            Err(ReflectError::ValueMismatch {
                expected: "i32",
                found: "u8"
            })
        );
        // A shared pointer can't be written through
        let shared = Value::const_pointer(&*target.cast::<*mut Base>().copied().unwrap());
        property.set(&shared, &Value::new(5), &[]);
        assert!(property.get_ref(&shared, &[]).is_empty());
        // Not an object of the owning type
        assert!(property.get(&Value::new(3), &[]).is_empty());
        assert!(matches!(
            property.try_get(&Value::new(3), &[]),
            Err(ReflectError::ObjectMismatch { .. })
        ));
    }
    assert_eq!(object.b_v0, 11);
}

#[test]
fn array_member() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let property = descriptor::<Base>().properties().get("array").unwrap();
    assert_eq!(property.kind(), PropertyKind::Array);
    assert_eq!(property.rank(), 2);
    assert!(property.value_type().is::<i32>());

    unsafe {
        assert_eq!(value_cast_or(&property.get(&target, &[1, 1]), 0), 22);
        property.set(&target, &Value::new(99), &[1, 3]);
        assert_eq!(value_cast_or(&property.get(&target, &[1, 3]), 0), 99);

        let p0 = value_cast::<*mut i32>(&property.get_ref(&target, &[0, 2])).copied().unwrap();
        *p0 = 111;

        let shared = Value::const_pointer(&*target.cast::<*mut Base>().copied().unwrap());
        let value = property.get_cref(&shared, &[0, 2]);
        assert!(value_cast::<*mut i32>(&value).is_none());
        assert_eq!(value_cast::<*const i32>(&value).map(|p| **p), Some(111));
    }
    assert_eq!(object.array[0][2], 111);
    assert_eq!(object.array[1][3], 99);
}

#[test]
fn array_indices_are_checked() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let property = descriptor::<Base>().properties().get("array").unwrap();
    unsafe {
        assert!(property.get(&target, &[2, 0]).is_empty());
        assert_eq!(
            property.try_get(&target, &[0, 4]).err(),
            Some(ReflectError::IndexOutOfBounds {
                dimension: 1,
                index: 4,
                extent: 4
            })
        );
        assert_eq!(
            property.try_get(&target, &[1]).err(),
            Some(ReflectError::IndexRank { expected: 2, found: 1 })
        );
        property.set(&target, &Value::new(7), &[5, 5]);
    }
    assert_eq!(object.array, [[11, 12, 13, 14], [21, 22, 23, 24]]);

    // Scalars take no index
    let scalar = descriptor::<Base>().properties().get("b_v0").unwrap();
    unsafe {
        assert_eq!(
            scalar.try_get(&target, &[0]).err(),
            Some(ReflectError::IndexRank { expected: 0, found: 1 })
        );
    }
}

#[test]
fn object_member() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let string = descriptor::<Base>().properties().get("string").unwrap();
    let string_type = string.value_type();
    assert_eq!(string_type.display_name(), "String");

    let len = string_type.properties().get("len").unwrap();
    unsafe {
        let reference = string.get_ref(&target, &[]);
        assert_eq!(value_cast_or(&len.get(&reference, &[]), 0usize), 4);
    }
}

#[test]
fn accessor() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let property = descriptor::<Base>().properties().get("method").unwrap();
    assert_eq!(property.kind(), PropertyKind::Accessor);
    unsafe {
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 50);
        property.set(&target, &Value::new(150), &[]);
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 150);
        assert_eq!(
            property.try_get_ref(&target, &[]).err(),
            Some(ReflectError::NotAddressable("method"))
        );
        assert!(property.get_cref(&target, &[]).is_empty());
    }
    assert_eq!(object.modify_by_method, 150);
}

#[test]
fn delegate() {
    let mut object = Base::new();
    let target = Value::pointer(&mut object);
    let property = descriptor::<Base>().properties().get("delegate").unwrap();
    assert_eq!(property.kind(), PropertyKind::Delegate);
    unsafe {
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 110);
        property.set(&target, &Value::new(1010), &[]);
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 1010);
        assert!(property.get_ref(&target, &[]).is_empty());
    }
    assert_eq!(object.b_v0, 101);
}

#[test]
fn readonly_properties_ignore_writes() {
    let mut text = String::from("abc");
    let target = Value::pointer(&mut text);
    let len = descriptor::<String>().properties().get("len").unwrap();
    assert!(len.is_readonly());
    unsafe {
        len.set(&target, &Value::new(10usize), &[]);
        assert_eq!(
            len.try_set(&target, &Value::new(10usize), &[]),
            Err(ReflectError::ReadOnly("len"))
        );
        assert_eq!(value_cast_or(&len.get(&target, &[]), 0usize), 3);
    }
}

#[test]
fn derived_class_property() {
    let mut object = MyClass::new();
    let target = Value::pointer(&mut object);
    let properties = descriptor::<MyClass>().properties();
    let b_v0 = properties.get("b_v0").unwrap();
    let v0 = properties.get("v0").unwrap();
    unsafe {
        assert_eq!(value_cast_or(&b_v0.get(&target, &[]), 0), 11);
        b_v0.set(&target, &Value::new(101), &[]);
        assert_eq!(value_cast_or(&v0.get(&target, &[]), 0), 22);
        v0.set(&target, &Value::new(301), &[]);
    }
    assert_eq!(object.base.b_v0, 101);
    assert_eq!(object.v0, 301);
}

#[test]
fn base_pointer_reaches_derived_property() {
    let mut object = MyClass::new();
    // The object is seen through its base, but its runtime type is MyClass
    let target = Value::pointer(&mut object.base);
    let v0 = descriptor::<MyClass>().properties().get("v0").unwrap();
    unsafe {
        assert_eq!(value_cast_or(&v0.get(&target, &[]), 0), 22);
    }
}

#[test]
fn independent_class() {
    let mut object = MyClass2::default();
    let target = Value::pointer(&mut object);
    let property = descriptor::<MyClass2>().properties().get("value").unwrap();
    unsafe {
        assert_eq!(value_cast_or(&property.get(&target, &[]), 0), 33);
        property.set(&target, &Value::new(101), &[]);
    }
    assert_eq!(object.value, 101);
}

#[test]
fn embedded_objects_are_read_only() {
    let object = Value::new(MyClass2::default());
    let property = descriptor::<MyClass2>().properties().get("value").unwrap();
    unsafe {
        assert_eq!(value_cast_or(&property.get(&object, &[]), 0), 33);
        property.set(&object, &Value::new(5), &[]);
        assert_eq!(value_cast_or(&property.get(&object, &[]), 0), 33);
        assert!(!property.get_cref(&object, &[]).is_empty());
        assert!(property.get_ref(&object, &[]).is_empty());
    }
}
