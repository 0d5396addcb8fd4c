use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Data, DeriveInput};

use self::fields::{FieldHandler, FieldOptions};

pub mod fields;
mod utils;

/// The options given to the container, as `#[reflect(...)]`
#[derive(Debug, Default)]
pub struct ContainerOptions {
    /// The name presented to users
    pub display_name: Option<syn::LitStr>,
    /// Resolve the runtime type through `Polymorphic`
    pub polymorphic: bool,
    /// A function called with the builder after the generated description,
    /// for anything the derive can't express (methods, constructors)
    pub describe_with: Option<syn::Path>,
}
impl ContainerOptions {
    pub fn parse_attrs(attrs: &[syn::Attribute]) -> Result<ContainerOptions, syn::Error> {
        let mut options = ContainerOptions::default();
        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("display_name") {
                    options.display_name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("polymorphic") {
                    options.polymorphic = true;
                } else if meta.path.is_ident("describe_with") {
                    let path: syn::LitStr = meta.value()?.parse()?;
                    options.describe_with = Some(path.parse()?);
                } else {
                    return Err(meta.error("Invalid flag for #[reflect(...)]"));
                }
                Ok(())
            })?;
        }
        Ok(options)
    }
}

pub fn derive_reflect(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let data = match input.data {
        Data::Struct(ref data) => data,
        Data::Enum(ref data) => {
            return Err(syn::Error::new(
                data.enum_token.span,
                "Reflect can only be derived for structs",
            ))
        }
        Data::Union(ref data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "Reflect can only be derived for structs",
            ))
        }
    };
    let options = ContainerOptions::parse_attrs(&input.attrs)?;

    let mut generics = utils::add_type_bounds(&input.generics, &[parse_quote!(::erased_reflect::Reflect)]);
    let mut handler = FieldHandler::default();
    for (index, field) in data.fields.iter().enumerate() {
        let field_options = FieldOptions::parse_attrs(&field.attrs)?;
        handler.handle_field(index, field, field_options)?;
    }
    if input.generics.type_params().next().is_some() {
        // Concrete field types are checked by the builder itself
        generics
            .make_where_clause()
            .predicates
            .extend(handler.bounds.drain(..));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let display_name = options.display_name.as_ref().map(|display_name| {
        quote!(ty.display_name(#display_name);)
    });
    let polymorphic = if options.polymorphic {
        Some(quote!(ty.polymorphic();))
    } else {
        None
    };
    let describe_with = options.describe_with.as_ref().map(|path| quote!(#path(ty);));
    let base_links = handler.bases.iter().map(|(base_type, _)| quote!(ty.base::<#base_type>();));
    let properties = &handler.properties;
    let base_impls = handler.bases.iter().map(|(base_type, member)| {
        quote! {
            unsafe impl #impl_generics ::erased_reflect::Extends<#base_type> for #name #ty_generics #where_clause {
                const OFFSET: usize = ::core::mem::offset_of!(Self, #member);
            }
        }
    });

    let r = quote! {
        unsafe impl #impl_generics ::erased_reflect::Reflect for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn describe(ty: &mut ::erased_reflect::TypeBuilder<Self>) {
                #display_name
                #(#base_links)*
                #(#properties)*
                #polymorphic
                #describe_with
            }
        }
        #(#base_impls)*
    };
    utils::dump_expansion(&input.ident, &r);
    Ok(r)
}
