//! A small class hierarchy shared by the integration tests.
//!
//! `MyClass` embeds `Base` (at a non-zero offset), and both know their runtime type.
#![allow(dead_code)]

use erased_reflect::{extends, Attribute, DynamicType, Polymorphic, Reflect, TypeBuilder, TypeDescriptor};

#[derive(Clone, Debug)]
pub struct Base {
    pub dynamic: DynamicType,
    pub b_v0: i32,
    pub string: String,
    pub array: [[i32; 4]; 2],
    pub modify_by_method: i32,
}
impl Base {
    pub fn new() -> Base {
        Base::tagged(DynamicType::of::<Base>())
    }
    pub fn with_value(value: i32) -> Base {
        Base {
            b_v0: value,
            ..Base::new()
        }
    }
    fn tagged(dynamic: DynamicType) -> Base {
        Base {
            dynamic,
            b_v0: 11,
            string: String::from("abcd"),
            array: [[11, 12, 13, 14], [21, 22, 23, 24]],
            modify_by_method: 50,
        }
    }
    pub fn get(&self) -> i32 {
        self.modify_by_method
    }
    pub fn set(&mut self, value: i32) {
        self.modify_by_method = value;
    }
    pub fn method(&mut self, arg: i32) -> i32 {
        arg * 20
    }
    pub fn accumulate(&mut self, amount: i32, times: i32) -> i32 {
        self.b_v0 += amount * times;
        self.b_v0
    }
}
unsafe impl Reflect for Base {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.display_name("Base").polymorphic();
        ty.constructor(Base::new);
        ty.constructor(Base::with_value);
        ty.property("b_v0").member(|o| &o.b_v0, |o| &mut o.b_v0);
        ty.property("string").member(|o| &o.string, |o| &mut o.string);
        ty.property("array").array::<i32, [[i32; 4]; 2]>(|o| &o.array, |o| &mut o.array);
        ty.property("method").accessor(Base::get, Base::set);
        ty.property("delegate")
            .delegate(|o: &Base| o.b_v0 * 10, |o: &mut Base, value: i32| o.b_v0 = value / 10);
        ty.method("method").invoker(Base::method);
        ty.method("delegate").static_invoker(|value: i32| value * 30);
        ty.method("accumulate").invoker(Base::accumulate);
        ty.method("get").const_invoker(Base::get);
    }
}
unsafe impl Polymorphic for Base {
    fn describe_self(&self) -> &'static TypeDescriptor {
        self.dynamic.get()
    }
}

#[derive(Debug, PartialEq)]
pub struct MyAttribute {
    pub description: &'static str,
}
impl Attribute for MyAttribute {}

#[derive(Clone, Debug)]
#[repr(C)]
pub struct MyClass {
    pub v0: i32,
    pub base: Base,
}
impl MyClass {
    pub fn new() -> MyClass {
        MyClass {
            v0: 22,
            base: Base::tagged(DynamicType::of::<MyClass>()),
        }
    }
}
extends!(MyClass => Base, base);
unsafe impl Reflect for MyClass {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.base::<Base>()
            .display_name("MyClass")
            .polymorphic()
            .attribute(MyAttribute {
                description: "myattribute",
            });
        ty.constructor(MyClass::new);
        ty.property("v0").member(|o| &o.v0, |o| &mut o.v0);
    }
}
unsafe impl Polymorphic for MyClass {
    fn describe_self(&self) -> &'static TypeDescriptor {
        self.base.dynamic.get()
    }
}

#[derive(Clone, Debug)]
pub struct MyClass2 {
    pub value: i32,
}
impl Default for MyClass2 {
    fn default() -> Self {
        MyClass2 { value: 33 }
    }
}
unsafe impl Reflect for MyClass2 {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.display_name("MyClass2");
        ty.property("value").member(|o| &o.value, |o| &mut o.value);
    }
}
