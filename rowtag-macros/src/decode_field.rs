use proc_macro2::Span;
use rowtag_core::{ColumnTag, ColumnType, decode_type, parse_tag};
use syn::{Expr, ExprLit, Field, Ident, Lit, Type, Visibility, spanned::Spanned};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) tag: String,
    pub(crate) column_type: ColumnType,
    pub(crate) public: bool,
    /// Public and not excluded by a `-` token, the field becomes a column.
    pub(crate) mapped: bool,
}

fn decode_tag(field: &Field) -> syn::Result<String> {
    let mut result: Option<String> = None;
    for attr in field.attrs.iter().filter(|v| v.path().is_ident("db")) {
        if result.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "The `db` attribute can be specified only once per field",
            ));
        }
        let Ok(Expr::Lit(ExprLit {
            lit: Lit::Str(value),
            ..
        })) = attr.meta.require_name_value().map(|v| &v.value)
        else {
            return Err(syn::Error::new(
                attr.span(),
                "Error while parsing `db`, use it like #[db = \"name,pk\"]",
            ));
        };
        result = Some(value.value());
    }
    Ok(result.unwrap_or_default())
}

pub(crate) fn decode_field(field: &Field) -> syn::Result<FieldMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new(field.span(), "Field is expected to have a name"));
    };
    let tag = decode_tag(field)?;
    let name = field_name(&ident);
    let ColumnTag { ignored, .. } = parse_tag(&tag, &name).map_err(|e| {
        syn::Error::new(
            field.span(),
            format!("Invalid `db` annotation on field `{name}`: {e:#}"),
        )
    })?;
    let public = !matches!(field.vis, Visibility::Inherited);
    Ok(FieldMetadata {
        column_type: decode_type(&field.ty),
        ty: field.ty.clone(),
        tag,
        public,
        mapped: public && !ignored,
        ident,
    })
}

pub(crate) fn field_name(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(ToString::to_string).unwrap_or(name)
}

pub(crate) fn non_struct_error(span: Span) -> syn::Error {
    syn::Error::new(
        span,
        "`Entity` cannot be derived for a non-struct type, use a struct with named fields",
    )
}
