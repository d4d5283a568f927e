mod attribute_parser;
mod codegen;
mod structs;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive a fixed-shape model.
///
/// Every field of the struct is either a `serde_json::Value` slot declared
/// with `#[field(<data type>, ...)]` or an embedded base model marked
/// `#[model(base)]`. The registry lists the bases' fields first, in the order
/// the bases are declared, followed by the struct's own fields; own fields
/// override inherited ones of the same name.
///
/// Struct options: `#[model(name = "...", rename_all = "camelCase")]`.
///
/// Field options: `nullable = bool`, `comment = "..."`, `enum_values = [..]`,
/// `mock = fn() -> Value`, `marshal = fn(&Value) -> Value`, `rename = "..."`.
#[proc_macro_derive(ApiModel, attributes(model, field))]
pub fn api_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    codegen::expand_api_model(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
