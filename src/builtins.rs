//! Descriptions of standard library types
//!
//! These only expose the commonly used parts of each type,
//! enough to chain properties and methods through strings and collections.
use crate::{Reflect, TypeBuilder};

unsafe impl Reflect for String {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.display_name("String");
        ty.constructor(String::new);
        ty.constructor(|text: &'static str| text.to_owned());
        ty.property("len").getter(String::len);
        ty.property("is_empty").getter(String::is_empty);
        ty.property("capacity").getter(String::capacity);
        ty.method("push_str")
            .invoker(|text: &mut String, suffix: String| text.push_str(&suffix));
        ty.method("clear").invoker(String::clear);
        ty.method("to_uppercase")
            .const_invoker(|text: &String| text.to_uppercase());
        ty.method("contains")
            .const_invoker(|text: &String, pattern: String| text.contains(pattern.as_str()));
    }
}

unsafe impl Reflect for &'static str {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.display_name("&str");
        ty.property("len").getter(|text: &&'static str| text.len());
    }
}

unsafe impl<T: Reflect> Reflect for Vec<T> {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.constructor(Vec::<T>::new);
        ty.property("len").getter(Vec::<T>::len);
        ty.property("is_empty").getter(Vec::<T>::is_empty);
        ty.method("clear").invoker(Vec::<T>::clear);
    }
}

unsafe impl<T: Reflect> Reflect for Option<T> {
    fn describe(ty: &mut TypeBuilder<Self>) {
        ty.constructor(|| None::<T>);
        ty.property("is_some").getter(Option::<T>::is_some);
        ty.property("is_none").getter(Option::<T>::is_none);
    }
}

#[cfg(test)]
mod test {
    use crate::{descriptor, value_cast, Value};

    #[test]
    fn string_constructors() {
        let strings = descriptor::<String>();
        assert_eq!(strings.display_name(), "String");
        let empty = strings.instantiate(&[]);
        assert_eq!(value_cast::<Box<String>>(&empty).map(|s| s.as_str()), Some(""));
        let hello = strings.instantiate(&[Value::new("hello")]);
        assert_eq!(value_cast::<Box<String>>(&hello).map(|s| s.as_str()), Some("hello"));
        // No constructor takes an integer
        assert!(strings.instantiate(&[Value::new(3i32)]).is_empty());
    }

    #[test]
    fn string_methods() {
        let mut text = String::from("abc");
        let object = Value::pointer(&mut text);
        let methods = descriptor::<String>().methods();
        unsafe {
            methods
                .get("push_str")
                .unwrap()
                .invoke(&object, &[Value::new(String::from("def"))]);
            let upper = methods.get("to_uppercase").unwrap().invoke(&object, &[]);
            assert_eq!(value_cast::<String>(&upper).map(String::as_str), Some("ABCDEF"));
            let len = descriptor::<String>().properties().get("len").unwrap();
            assert_eq!(value_cast::<usize>(&len.get(&object, &[])), Some(&6));
        }
        assert_eq!(text, "abcdef");
    }

    #[test]
    fn collections() {
        let mut numbers = vec![1u8, 2, 3];
        let object = Value::pointer(&mut numbers);
        let vectors = descriptor::<Vec<u8>>();
        unsafe {
            let len = vectors.properties().get("len").unwrap();
            assert_eq!(value_cast::<usize>(&len.get(&object, &[])), Some(&3));
            vectors.methods().get("clear").unwrap().invoke(&object, &[]);
        }
        assert!(numbers.is_empty());

        let nothing = descriptor::<Option<i32>>().instantiate(&[]);
        assert_eq!(value_cast::<Box<Option<i32>>>(&nothing).map(|o| **o), Some(None));
    }
}
