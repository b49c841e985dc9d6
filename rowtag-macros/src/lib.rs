mod decode_field;

use decode_field::{FieldMetadata, decode_field, field_name, non_struct_error};
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input, spanned::Spanned};

/// Implement `rowtag::Entity` for a struct with named fields.
///
/// Fields are annotated with `#[db = "name,id,pk,fk1,fk2,fk3,fk4,-"]`. Fields
/// that are not `pub` or that carry a `-` are not mapped and must implement
/// `Default`, mapped fields must implement `AsValue` and `Clone`.
#[proc_macro_derive(Entity, attributes(db))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive(&input) {
        Ok(v) => v.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &input.data else {
        return Err(non_struct_error(input.ident.span()));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(non_struct_error(data.fields.span()));
    };
    let fields = named
        .named
        .iter()
        .map(decode_field)
        .collect::<syn::Result<Vec<FieldMetadata>>>()?;
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields_count = fields.len();
    let field_defs = fields.iter().enumerate().map(|(i, f)| {
        let name = field_name(&f.ident);
        let tag = &f.tag;
        let column_type = &f.column_type;
        let public = f.public;
        quote! {
            ::rowtag::FieldDef {
                position: #i,
                name: #name,
                tag: #tag,
                column_type: #column_type,
                public: #public,
            }
        }
    });
    let mapped = || fields.iter().enumerate().filter(|(_, f)| f.mapped);
    let field_value = mapped().map(|(i, f)| {
        let ident = &f.ident;
        quote! {
            #i => Ok(::rowtag::AsValue::as_value(::std::clone::Clone::clone(&self.#ident))),
        }
    });
    let set_field = mapped().map(|(i, f)| {
        let ident = &f.ident;
        let ty = &f.ty;
        let field = field_name(ident);
        quote! {
            #i => {
                self.#ident = ::rowtag::Context::with_context(
                    <#ty as ::rowtag::AsValue>::try_from_value(value),
                    || format!("While setting field `{}::{}`", #type_name, #field),
                )?;
                Ok(())
            }
        }
    });
    let create = fields.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        if f.mapped {
            quote!(#ident: values.take(#i)?)
        } else {
            quote!(#ident: ::std::default::Default::default())
        }
    });
    Ok(quote! {
        impl #impl_generics ::rowtag::Entity for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn fields() -> &'static [::rowtag::FieldDef] {
                static FIELDS: [::rowtag::FieldDef; #fields_count] = [#(#field_defs),*];
                &FIELDS
            }

            fn field_value(&self, position: usize) -> ::rowtag::Result<::rowtag::Value> {
                match position {
                    #(#field_value)*
                    _ => Err(::rowtag::Error::msg(format!(
                        "Field position {} of `{}` is not mapped to a column",
                        position, #type_name,
                    ))),
                }
            }

            fn set_field(
                &mut self,
                position: usize,
                #[allow(unused_variables)] value: ::rowtag::Value,
            ) -> ::rowtag::Result<()> {
                match position {
                    #(#set_field)*
                    _ => Err(::rowtag::Error::msg(format!(
                        "Field position {} of `{}` is not mapped to a column",
                        position, #type_name,
                    ))),
                }
            }

            fn from_fields(
                #[allow(unused_mut, unused_variables)] mut values: ::rowtag::FieldValues,
            ) -> ::rowtag::Result<Self> {
                Ok(Self {
                    #(#create,)*
                })
            }
        }
    })
}
