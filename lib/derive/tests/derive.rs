use erased_reflect::properties::PropertyKind;
use erased_reflect::{descriptor, value_cast, DynamicType, Polymorphic, Reflect, TypeBuilder, TypeDescriptor, Value};
use pretty_assertions::assert_eq;

#[derive(Clone, Debug, PartialEq, Reflect)]
#[reflect(display_name = "Simple")]
pub struct SimpleStruct {
    number: u32,
    float: f64,
    #[reflect(readonly)]
    id: u64,
    #[reflect(name = "label", display_name = "Label")]
    text: String,
    #[reflect(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
    #[reflect(array = "i16")]
    grid: [[i16; 3]; 2],
}

fn simple() -> SimpleStruct {
    SimpleStruct {
        number: 7,
        float: 2.5,
        id: 99,
        text: String::from("hello"),
        cache: Vec::new(),
        grid: [[0; 3]; 2],
    }
}

fn property_names(descriptor: &'static TypeDescriptor) -> Vec<&'static str> {
    descriptor.properties().iter().map(|property| property.name()).collect()
}

#[test]
fn simple_struct() {
    let simple_type = descriptor::<SimpleStruct>();
    assert_eq!(simple_type.display_name(), "Simple");
    assert_eq!(property_names(simple_type), vec!["number", "float", "id", "label", "grid"]);
    let properties = simple_type.properties();
    assert!(properties.get("id").unwrap().is_readonly());
    assert!(!properties.get("number").unwrap().is_readonly());
    assert_eq!(properties.get("label").unwrap().display_name(), "Label");
    assert!(properties.get("cache").is_none());
    let grid = properties.get("grid").unwrap();
    assert_eq!(grid.kind(), PropertyKind::Array);
    assert_eq!(grid.rank(), 2);
    assert!(grid.value_type().is::<i16>());
}

#[test]
fn simple_access() {
    let mut target = simple();
    let object = Value::pointer(&mut target);
    let properties = descriptor::<SimpleStruct>().properties();
    unsafe {
        properties.get("number").unwrap().set(&object, &Value::new(12u32), &[]);
        properties.get("grid").unwrap().set(&object, &Value::new(-4i16), &[1, 2]);
        // Read-only, so unchanged
        properties.get("id").unwrap().set(&object, &Value::new(1u64), &[]);
        let label = properties.get("label").unwrap().get(&object, &[]);
        assert_eq!(value_cast::<String>(&label).map(String::as_str), Some("hello"));
    }
    assert_eq!(target.number, 12);
    assert_eq!(target.grid[1][2], -4);
    assert_eq!(target.id, 99);
}

#[derive(Clone, Reflect)]
pub struct Wrapper<T>(T, #[reflect(readonly)] u8);

#[test]
fn generic_tuple_struct() {
    let wrapper_type = descriptor::<Wrapper<bool>>();
    assert_eq!(property_names(wrapper_type), vec!["0", "1"]);
    assert!(wrapper_type.properties().get("0").unwrap().value_type().is::<bool>());
    // Each instantiation has its own descriptor
    assert_ne!(wrapper_type, descriptor::<Wrapper<i32>>());
}

#[derive(Clone, Reflect)]
#[reflect(polymorphic)]
pub struct Animal {
    #[reflect(skip)]
    dynamic: DynamicType,
    legs: u32,
}
unsafe impl Polymorphic for Animal {
    fn describe_self(&self) -> &'static TypeDescriptor {
        self.dynamic.get()
    }
}

#[derive(Clone, Reflect)]
#[reflect(describe_with = "describe_dog")]
pub struct Dog {
    #[reflect(base)]
    animal: Animal,
    name: String,
}
impl Dog {
    fn new(name: &'static str) -> Dog {
        Dog {
            animal: Animal {
                dynamic: DynamicType::of::<Dog>(),
                legs: 4,
            },
            name: name.into(),
        }
    }
}
fn describe_dog(ty: &mut TypeBuilder<Dog>) {
    ty.constructor(Dog::new);
    ty.method("bark")
        .const_invoker(|dog: &Dog| format!("{} says woof", dog.name));
}

#[test]
fn bases_and_extras() {
    let dog_type = descriptor::<Dog>();
    let animal_type = descriptor::<Animal>();
    assert!(animal_type.is_polymorphic());
    assert!(dog_type.derives_from(animal_type));
    assert_eq!(dog_type.base_links()[0].offset(), std::mem::offset_of!(Dog, animal));
    // Inherited properties come first, and the base field itself isn't a property
    assert_eq!(property_names(dog_type), vec!["legs", "name"]);

    let dog = dog_type.instantiate(&[Value::new("Rex")]);
    assert!(!dog.is_empty());
    let bark = dog_type.methods().get("bark").unwrap();
    let result = unsafe { bark.invoke(&dog, &[]) };
    assert_eq!(value_cast::<String>(&result).map(String::as_str), Some("Rex says woof"));
}

#[test]
fn downcast_through_derived_base() {
    let mut dog = Dog::new("Fido");
    let animal: *mut Animal = &mut dog.animal;
    let found = unsafe { erased_reflect::object_cast::<Dog, Animal>(animal) };
    assert_eq!(found, Some(&dog as *const Dog));
}
