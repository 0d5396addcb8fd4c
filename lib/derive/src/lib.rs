extern crate proc_macro;

mod internals;

use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(raw_input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: DeriveInput = parse_macro_input!(raw_input as DeriveInput);
    match internals::derive_reflect(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.into_compile_error().into(),
    }
}
