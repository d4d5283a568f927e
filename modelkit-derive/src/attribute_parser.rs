use super::structs::{BaseField, FieldDecl, ModelMeta, OwnField, RenameRule};
use syn::parse::Parser;
use syn::{Expr, Lit, Meta, punctuated::Punctuated, token::Comma};

/// Parses struct-level `#[model(name = "...", rename_all = "...")]`.
pub(crate) fn parse_model_meta(attrs: &[syn::Attribute]) -> syn::Result<ModelMeta> {
    let mut meta = ModelMeta::default();

    for attr in attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        let Meta::List(meta_list) = &attr.meta else {
            return Err(syn::Error::new_spanned(attr, "expected #[model(...)]"));
        };
        let items = Punctuated::<Meta, Comma>::parse_terminated.parse2(meta_list.tokens.clone())?;
        for item in items {
            match &item {
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    meta.name = Some(lit_str(&nv.value)?.value());
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let lit = lit_str(&nv.value)?;
                    let rule = RenameRule::parse(&lit.value()).ok_or_else(|| {
                        syn::Error::new_spanned(
                            &lit,
                            format!("unknown rename rule, expected one of {}", RenameRule::ACCEPTED),
                        )
                    })?;
                    meta.rename_all = Some(rule);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unsupported model option, expected `name` or `rename_all`",
                    ));
                }
            }
        }
    }

    Ok(meta)
}

/// Classifies a struct field as an own `#[field(...)]` slot or an embedded
/// `#[model(base)]`.
pub(crate) fn parse_field(field: &syn::Field, meta: &ModelMeta) -> syn::Result<FieldDecl> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "ApiModel fields must be named"));
    };

    let mut is_base = false;
    let mut own: Option<OwnField> = None;

    for attr in &field.attrs {
        if attr.path().is_ident("model") {
            let Meta::List(meta_list) = &attr.meta else {
                return Err(syn::Error::new_spanned(attr, "expected #[model(base)]"));
            };
            let items = Punctuated::<Meta, Comma>::parse_terminated.parse2(meta_list.tokens.clone())?;
            for item in items {
                if matches!(&item, Meta::Path(path) if path.is_ident("base")) {
                    is_base = true;
                } else {
                    return Err(syn::Error::new_spanned(item, "unsupported option, expected `base`"));
                }
            }
        } else if attr.path().is_ident("field") {
            if own.is_some() {
                return Err(syn::Error::new_spanned(attr, "duplicate #[field] attribute"));
            }
            own = Some(parse_field_attr(attr, &ident, meta)?);
        }
    }

    match (is_base, own) {
        (true, None) => Ok(FieldDecl::Base(BaseField {
            ident,
            ty: field.ty.clone(),
        })),
        (false, Some(own)) => Ok(FieldDecl::Own(own)),
        (true, Some(_)) => Err(syn::Error::new_spanned(
            field,
            "a #[model(base)] field cannot also be a #[field]",
        )),
        (false, None) => Err(syn::Error::new_spanned(
            field,
            "every field needs #[field(<data type>, ...)] or #[model(base)]",
        )),
    }
}

/// `#[field(DataTypeExpr, nullable = .., comment = .., enum_values = [..],
/// mock = .., marshal = .., rename = "..")]`
fn parse_field_attr(attr: &syn::Attribute, ident: &syn::Ident, meta: &ModelMeta) -> syn::Result<OwnField> {
    let Meta::List(meta_list) = &attr.meta else {
        return Err(syn::Error::new_spanned(attr, "expected #[field(<data type>, ...)]"));
    };
    let items = Punctuated::<Expr, Comma>::parse_terminated.parse2(meta_list.tokens.clone())?;

    let mut data_type = None;
    let mut nullable = None;
    let mut comment = None;
    let mut enum_values = None;
    let mut mock = None;
    let mut marshal = None;
    let mut rename = None;

    for item in items {
        match item {
            Expr::Assign(assign) => {
                let key = option_key(&assign.left)?;
                let value = *assign.right;
                match key.as_str() {
                    "nullable" => nullable = Some(value),
                    "comment" => comment = Some(value),
                    "mock" => mock = Some(value),
                    "marshal" => marshal = Some(value),
                    "rename" => rename = Some(lit_str(&value)?.value()),
                    "enum_values" => {
                        let Expr::Array(array) = value else {
                            return Err(syn::Error::new_spanned(value, "expected an array, e.g. [1, 2, 3]"));
                        };
                        enum_values = Some(array.elems.into_iter().collect());
                    }
                    _ => {
                        return Err(syn::Error::new_spanned(
                            &assign.left,
                            format!("unknown field option `{key}`"),
                        ));
                    }
                }
            }
            expr if data_type.is_none() => data_type = Some(expr),
            expr => {
                return Err(syn::Error::new_spanned(
                    expr,
                    "the data type must be given once, as the first argument",
                ));
            }
        }
    }

    let Some(data_type) = data_type else {
        return Err(syn::Error::new_spanned(attr, "missing data type, e.g. #[field(IntType)]"));
    };

    Ok(OwnField {
        ident: ident.clone(),
        registry_name: rename.unwrap_or_else(|| meta.field_name(ident)),
        data_type,
        nullable,
        comment,
        enum_values,
        mock,
        marshal,
    })
}

fn option_key(expr: &Expr) -> syn::Result<String> {
    if let Expr::Path(path) = expr
        && let Some(ident) = path.path.get_ident()
    {
        return Ok(ident.to_string());
    }
    Err(syn::Error::new_spanned(expr, "expected an option name"))
}

fn lit_str(expr: &Expr) -> syn::Result<syn::LitStr> {
    if let Expr::Lit(expr_lit) = expr
        && let Lit::Str(s) = &expr_lit.lit
    {
        return Ok(s.clone());
    }
    Err(syn::Error::new_spanned(expr, "expected a string literal"))
}
