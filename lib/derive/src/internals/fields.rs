use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Field, Member, Type, WherePredicate};

#[derive(Debug, Default)]
pub struct FieldOptions {
    /// Don't register the field at all
    pub skip: bool,
    /// Register a property that can't be written
    pub readonly: bool,
    /// Rename the property
    pub name: Option<syn::LitStr>,
    /// The name presented to users
    pub display_name: Option<syn::LitStr>,
    /// Register an array property, with elements of the specified scalar type.
    ///
    /// For example,
    /// ````ignore
    /// struct Board {
    ///     #[reflect(array = "u8")]
    ///     cells: [[u8; 8]; 8]
    /// }
    /// ````
    /// The property is indexed with one component per dimension.
    pub array: Option<Type>,
    /// The field is an embedded base.
    ///
    /// The field's type is registered as a base of the struct,
    /// and no property is added for it.
    pub base: bool,
}
impl FieldOptions {
    pub fn parse_attrs(attrs: &[syn::Attribute]) -> Result<FieldOptions, syn::Error> {
        let mut options = FieldOptions::default();
        for attr in attrs {
            if !attr.path().is_ident("reflect") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    options.skip = true;
                } else if meta.path.is_ident("readonly") {
                    options.readonly = true;
                } else if meta.path.is_ident("base") {
                    options.base = true;
                } else if meta.path.is_ident("name") {
                    options.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("display_name") {
                    options.display_name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("array") {
                    let type_str: syn::LitStr = meta.value()?.parse()?;
                    let scalar = type_str.parse::<Type>().map_err(|cause| {
                        syn::Error::new(type_str.span(), format_args!("Invalid type: {}", cause))
                    })?;
                    options.array = Some(scalar);
                } else {
                    return Err(meta.error("Invalid flag for #[reflect(...)]"));
                }
                Ok(())
            })?;
        }
        if options.base && (options.skip || options.array.is_some() || options.readonly) {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                "A base field can't be skipped, readonly or an array",
            ));
        }
        Ok(options)
    }
}

/// Accumulates the description of each field
#[derive(Default)]
pub struct FieldHandler {
    /// The embedded bases, with the fields holding them
    pub bases: Vec<(Type, Member)>,
    /// The statements registering each property
    pub properties: Vec<TokenStream>,
    /// The bounds required of property value types
    pub bounds: Vec<WherePredicate>,
}
impl FieldHandler {
    pub fn handle_field(&mut self, index: usize, field: &Field, options: FieldOptions) -> syn::Result<()> {
        if options.skip {
            return Ok(());
        }
        let member = match field.ident {
            Some(ref ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        };
        let field_type = &field.ty;
        if options.base {
            self.bases.push((field_type.clone(), member));
            return Ok(());
        }
        let name = match (options.name, &member) {
            (Some(name), _) => name,
            (None, Member::Named(ident)) => syn::LitStr::new(&ident.to_string(), ident.span()),
            (None, Member::Unnamed(index)) => syn::LitStr::new(&index.index.to_string(), index.span),
        };
        let display_name = options
            .display_name
            .map(|display_name| quote!(.display_name(#display_name)));
        let get = quote!(|this| &this.#member);
        let get_mut = quote!(|this| &mut this.#member);
        let kind = match (options.array, options.readonly) {
            (Some(scalar), readonly) => {
                self.bounds.push(parse_quote!(#scalar: ::erased_reflect::Reflect + ::core::clone::Clone));
                self.bounds.push(parse_quote!(#field_type: ::erased_reflect::Reflect));
                if readonly {
                    quote!(.readonly_array::<#scalar, #field_type>(#get))
                } else {
                    quote!(.array::<#scalar, #field_type>(#get, #get_mut))
                }
            }
            (None, true) => {
                self.bounds.push(parse_quote!(#field_type: ::erased_reflect::Reflect + ::core::clone::Clone));
                quote!(.readonly_member(#get))
            }
            (None, false) => {
                self.bounds.push(parse_quote!(#field_type: ::erased_reflect::Reflect + ::core::clone::Clone));
                quote!(.member(#get, #get_mut))
            }
        };
        self.properties.push(quote! {
            ty.property(#name) #display_name #kind;
        });
        Ok(())
    }
}
