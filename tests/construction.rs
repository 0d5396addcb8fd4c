mod common;

use erased_reflect::{descriptor, value_cast_object, ReflectError, Value};
use pretty_assertions::assert_eq;

use common::{Base, MyClass, MyClass2};

#[test]
fn construction() {
    let base_type = descriptor::<Base>();
    assert_eq!(base_type.constructors().len(), 2);

    let v0 = base_type.instantiate(&[]);
    assert!(v0.is::<Box<Base>>());
    let p0 = unsafe { value_cast_object::<Base>(&v0) }.unwrap();
    assert_eq!(unsafe { (*p0).b_v0 }, 11);

    let v1 = base_type.instantiate(&[Value::new(99)]);
    let p1 = unsafe { value_cast_object::<Base>(&v1) }.unwrap();
    assert_eq!(unsafe { (*p1).b_v0 }, 99);

    let v2 = base_type.instantiate(&[Value::new(std::ptr::null_mut::<i32>())]);
    assert!(v2.is_empty());
    assert_eq!(
        base_type.try_instantiate(&[Value::new(1), Value::new(2)]).err(),
        Some(ReflectError::NoMatchingConstructor(base_type.name()))
    );
}

#[test]
fn instances_are_owned() {
    let instance = descriptor::<MyClass>().instantiate(&[]);
    let object = instance.into_inner::<Box<MyClass>>().ok().unwrap();
    assert_eq!(object.v0, 22);
    // The runtime type was set by the constructor
    assert!(object.base.dynamic.get().is::<MyClass>());
}

#[test]
fn no_constructors() {
    assert!(descriptor::<MyClass2>().constructors().is_empty());
    assert!(descriptor::<MyClass2>().instantiate(&[]).is_empty());
}

#[test]
fn constructor_signatures() {
    let constructors = descriptor::<Base>().constructors();
    assert_eq!(constructors[0].argument_types().len(), 0);
    let parameters: Vec<_> = constructors[1].argument_types().collect();
    assert_eq!(parameters, vec![descriptor::<i32>()]);
    let direct = constructors[1].invoke(&[Value::new(5)]);
    assert_eq!(
        direct.into_inner::<Box<Base>>().ok().map(|base| base.b_v0),
        Some(5)
    );
    assert!(constructors[1].invoke(&[Value::new(5u64)]).is_empty());
}

#[test]
fn debug_shows_the_implementation() {
    let constructor = &descriptor::<Base>().constructors()[1];
    let debug = format!("{constructor:?}");
    assert!(debug.contains("NativeConstructor"), "{debug}");
}
