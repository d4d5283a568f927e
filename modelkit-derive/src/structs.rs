use heck::{ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::ext::IdentExt;

/// Struct-level `#[model(...)]` options
#[derive(Default)]
pub(super) struct ModelMeta {
    pub(super) name: Option<String>,
    pub(super) rename_all: Option<RenameRule>,
}

impl ModelMeta {
    /// Registry name of the model; the struct name unless overridden
    pub(super) fn model_name(&self, ident: &syn::Ident) -> String {
        self.name.clone().unwrap_or_else(|| ident.unraw().to_string())
    }

    /// Registry name of a field declared without `rename`
    pub(super) fn field_name(&self, ident: &syn::Ident) -> String {
        let raw = ident.unraw().to_string();
        match self.rename_all {
            Some(rule) => rule.apply(&raw),
            None => raw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RenameRule {
    CamelCase,
    PascalCase,
    SnakeCase,
    KebabCase,
    ScreamingSnakeCase,
}

impl RenameRule {
    pub(super) const ACCEPTED: &'static str =
        "\"camelCase\", \"PascalCase\", \"snake_case\", \"kebab-case\", \"SCREAMING_SNAKE_CASE\"";

    pub(super) fn parse(rule: &str) -> Option<Self> {
        match rule {
            "camelCase" => Some(Self::CamelCase),
            "PascalCase" => Some(Self::PascalCase),
            "snake_case" => Some(Self::SnakeCase),
            "kebab-case" => Some(Self::KebabCase),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnakeCase),
            _ => None,
        }
    }

    pub(super) fn apply(self, name: &str) -> String {
        match self {
            Self::CamelCase => name.to_lower_camel_case(),
            Self::PascalCase => name.to_upper_camel_case(),
            Self::SnakeCase => name.to_snake_case(),
            Self::KebabCase => name.to_kebab_case(),
            Self::ScreamingSnakeCase => name.to_shouty_snake_case(),
        }
    }
}

/// One struct field after attribute parsing
pub(super) enum FieldDecl {
    Own(OwnField),
    Base(BaseField),
}

/// A `#[field(...)]` slot holding a `serde_json::Value`
pub(super) struct OwnField {
    pub(super) ident: syn::Ident,
    pub(super) registry_name: String,
    pub(super) data_type: syn::Expr,
    pub(super) nullable: Option<syn::Expr>,
    pub(super) comment: Option<syn::Expr>,
    pub(super) enum_values: Option<Vec<syn::Expr>>,
    pub(super) mock: Option<syn::Expr>,
    pub(super) marshal: Option<syn::Expr>,
}

/// An embedded `#[model(base)]` model
pub(super) struct BaseField {
    pub(super) ident: syn::Ident,
    pub(super) ty: syn::Type,
}
