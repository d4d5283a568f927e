use super::attribute_parser::{parse_field, parse_model_meta};
use super::structs::{BaseField, FieldDecl, OwnField};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{Data, DeriveInput, Fields};

pub(crate) fn expand_api_model(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ApiModel cannot be derived for generic structs",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "ApiModel can only be derived for structs"));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "ApiModel only supports structs with named fields",
        ));
    };

    let meta = parse_model_meta(&input.attrs)?;
    let model_name = meta.model_name(name);

    let mut own: Vec<OwnField> = Vec::new();
    let mut bases: Vec<BaseField> = Vec::new();
    let mut seen = HashSet::new();
    for field in &named.named {
        match parse_field(field, &meta)? {
            FieldDecl::Own(decl) => {
                if !seen.insert(decl.registry_name.clone()) {
                    return Err(syn::Error::new_spanned(
                        field,
                        format!("field name `{}` is declared twice", decl.registry_name),
                    ));
                }
                own.push(decl);
            }
            FieldDecl::Base(decl) => bases.push(decl),
        }
    }

    let field_source = generate_field_source(name, &own, &bases);
    let api_model = generate_api_model(name, &model_name, &own, &bases);

    Ok(quote! {
        #field_source
        #api_model
    })
}

/// Own slots first, then each embedded base in declaration order
fn generate_field_source(name: &syn::Ident, own: &[OwnField], bases: &[BaseField]) -> TokenStream {
    let own_names = own.iter().map(|f| &f.registry_name);
    let own_idents = own.iter().map(|f| &f.ident);
    let base_idents = bases.iter().map(|b| &b.ident);

    quote! {
        impl ::modelkit::FieldSource for #name {
            #[allow(unused_variables)]
            fn lookup(&self, name: &str) -> ::core::option::Option<&::modelkit::__private::serde_json::Value> {
                #(
                    if name == #own_names {
                        return ::core::option::Option::Some(&self.#own_idents);
                    }
                )*
                #(
                    if let ::core::option::Option::Some(value) =
                        ::modelkit::FieldSource::lookup(&self.#base_idents, name)
                    {
                        return ::core::option::Option::Some(value);
                    }
                )*
                ::core::option::Option::None
            }
        }
    }
}

fn generate_api_model(
    name: &syn::Ident,
    model_name: &str,
    own: &[OwnField],
    bases: &[BaseField],
) -> TokenStream {
    let base_types: Vec<&syn::Type> = bases.iter().map(|b| &b.ty).collect();
    let base_idents: Vec<&syn::Ident> = bases.iter().map(|b| &b.ident).collect();
    let own_names: Vec<&String> = own.iter().map(|f| &f.registry_name).collect();
    let own_idents: Vec<&syn::Ident> = own.iter().map(|f| &f.ident).collect();
    let field_exprs = own.iter().map(generate_field_expr);

    quote! {
        impl ::modelkit::ApiModel for #name {
            fn schema() -> &'static ::modelkit::ModelSchema {
                static SCHEMA: ::std::sync::LazyLock<::modelkit::ModelSchema> =
                    ::std::sync::LazyLock::new(|| {
                        ::modelkit::ModelSchema::builder(#model_name)
                            #( .extends(<#base_types as ::modelkit::ApiModel>::schema()) )*
                            #( .field(#own_names, #field_exprs) )*
                            .build()
                    });
                &SCHEMA
            }

            #[allow(unused_variables)]
            fn from_source(source: &dyn ::modelkit::FieldSource) -> Self {
                Self {
                    #(
                        #own_idents: ::modelkit::FieldSource::get(
                            source,
                            #own_names,
                            ::modelkit::__private::serde_json::Value::Null,
                        ),
                    )*
                    #( #base_idents: <#base_types as ::modelkit::ApiModel>::from_source(source), )*
                }
            }

            #[allow(unused_variables)]
            fn set_slot(&mut self, name: &str, value: &::modelkit::__private::serde_json::Value) -> bool {
                false
                #(
                    | if name == #own_names {
                        self.#own_idents = ::core::clone::Clone::clone(value);
                        true
                    } else {
                        false
                    }
                )*
                #( | <#base_types as ::modelkit::ApiModel>::set_slot(&mut self.#base_idents, name, value) )*
            }
        }
    }
}

/// `Field::new(<data type>)` followed by one builder call per given option
fn generate_field_expr(field: &OwnField) -> TokenStream {
    let data_type = &field.data_type;
    let mut expr = quote! { ::modelkit::Field::new(#data_type) };

    if let Some(nullable) = &field.nullable {
        expr = quote! { #expr.nullable(#nullable) };
    }
    if let Some(comment) = &field.comment {
        expr = quote! { #expr.with_comment(#comment) };
    }
    if let Some(values) = &field.enum_values {
        expr = quote! {
            #expr.with_enum_values([
                #( ::modelkit::__private::serde_json::Value::from(#values) ),*
            ])
        };
    }
    if let Some(mock) = &field.mock {
        expr = quote! { #expr.with_mock(#mock) };
    }
    if let Some(marshal) = &field.marshal {
        expr = quote! { #expr.with_marshal(#marshal) };
    }
    expr
}
