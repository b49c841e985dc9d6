use crate::{AsValue, Result, Value, matches_path};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, TokenStreamExt, quote};
use std::fmt::{self, Display};
use syn::{GenericArgument, PathArguments, Type, TypePath, TypeReference, TypeSlice};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Backend column type tag of a mapped field.
///
/// The backend receives the tag of every selected column when preparing a
/// query, so it knows how to decode each value. `Default` lets the backend
/// decide, it is what every unrecognized field type maps to.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    #[default]
    Default,
    Bool,
    String,
    Binary,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Timestamp,
    NullableBool,
    NullableString,
    NullableBinary,
    NullableInt8,
    NullableInt16,
    NullableInt32,
    NullableInt64,
    NullableUInt8,
    NullableUInt16,
    NullableUInt32,
    NullableUInt64,
    NullableFloat32,
    NullableFloat64,
    NullableTimestamp,
}

impl ColumnType {
    pub fn variant_name(&self) -> &'static str {
        use ColumnType::*;
        match self {
            Default => "Default",
            Bool => "Bool",
            String => "String",
            Binary => "Binary",
            Int8 => "Int8",
            Int16 => "Int16",
            Int32 => "Int32",
            Int64 => "Int64",
            UInt8 => "UInt8",
            UInt16 => "UInt16",
            UInt32 => "UInt32",
            UInt64 => "UInt64",
            Float32 => "Float32",
            Float64 => "Float64",
            Timestamp => "Timestamp",
            NullableBool => "NullableBool",
            NullableString => "NullableString",
            NullableBinary => "NullableBinary",
            NullableInt8 => "NullableInt8",
            NullableInt16 => "NullableInt16",
            NullableInt32 => "NullableInt32",
            NullableInt64 => "NullableInt64",
            NullableUInt8 => "NullableUInt8",
            NullableUInt16 => "NullableUInt16",
            NullableUInt32 => "NullableUInt32",
            NullableUInt64 => "NullableUInt64",
            NullableFloat32 => "NullableFloat32",
            NullableFloat64 => "NullableFloat64",
            NullableTimestamp => "NullableTimestamp",
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.variant_name().starts_with("Nullable")
    }

    /// The nullable counterpart of this tag. `Default` stays `Default`.
    pub fn nullable(self) -> Self {
        use ColumnType::*;
        match self {
            Bool => NullableBool,
            String => NullableString,
            Binary => NullableBinary,
            Int8 => NullableInt8,
            Int16 => NullableInt16,
            Int32 => NullableInt32,
            Int64 => NullableInt64,
            UInt8 => NullableUInt8,
            UInt16 => NullableUInt16,
            UInt32 => NullableUInt32,
            UInt64 => NullableUInt64,
            Float32 => NullableFloat32,
            Float64 => NullableFloat64,
            Timestamp => NullableTimestamp,
            other => other,
        }
    }

    /// Typed NULL matching this tag.
    pub fn empty_value(&self) -> Value {
        use ColumnType::*;
        match self {
            Default => Value::Null,
            Bool | NullableBool => Value::Boolean(None),
            String | NullableString => Value::Varchar(None),
            Binary | NullableBinary => Value::Blob(None),
            Int8 | NullableInt8 => Value::Int8(None),
            Int16 | NullableInt16 => Value::Int16(None),
            Int32 | NullableInt32 => Value::Int32(None),
            Int64 | NullableInt64 => Value::Int64(None),
            UInt8 | NullableUInt8 => Value::UInt8(None),
            UInt16 | NullableUInt16 => Value::UInt16(None),
            UInt32 | NullableUInt32 => Value::UInt32(None),
            UInt64 | NullableUInt64 => Value::UInt64(None),
            Float32 | NullableFloat32 => Value::Float32(None),
            Float64 | NullableFloat64 => Value::Float64(None),
            Timestamp | NullableTimestamp => Value::Timestamp(None),
        }
    }

    /// Convert a value coming from storage into the canonical variant of this
    /// tag. Non nullable tags reject NULL, `Default` passes the value through.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        use ColumnType::*;
        macro_rules! coerce {
            ($ty:ty) => {
                <$ty as AsValue>::try_from_value(value)?.as_value()
            };
        }
        Ok(match self {
            Default => value,
            Bool => coerce!(bool),
            String => coerce!(std::string::String),
            Binary => coerce!(Box<[u8]>),
            Int8 => coerce!(i8),
            Int16 => coerce!(i16),
            Int32 => coerce!(i32),
            Int64 => coerce!(i64),
            UInt8 => coerce!(u8),
            UInt16 => coerce!(u16),
            UInt32 => coerce!(u32),
            UInt64 => coerce!(u64),
            Float32 => coerce!(f32),
            Float64 => coerce!(f64),
            Timestamp => match value {
                Value::TimestampWithTimezone(Some(v)) => OffsetDateTime::as_value(v),
                _ => coerce!(PrimitiveDateTime),
            },
            NullableBool => coerce!(Option<bool>),
            NullableString => coerce!(Option<std::string::String>),
            NullableBinary => coerce!(Option<Box<[u8]>>),
            NullableInt8 => coerce!(Option<i8>),
            NullableInt16 => coerce!(Option<i16>),
            NullableInt32 => coerce!(Option<i32>),
            NullableInt64 => coerce!(Option<i64>),
            NullableUInt8 => coerce!(Option<u8>),
            NullableUInt16 => coerce!(Option<u16>),
            NullableUInt32 => coerce!(Option<u32>),
            NullableUInt64 => coerce!(Option<u64>),
            NullableFloat32 => coerce!(Option<f32>),
            NullableFloat64 => coerce!(Option<f64>),
            NullableTimestamp => match value {
                Value::TimestampWithTimezone(Some(v)) => OffsetDateTime::as_value(v),
                _ => coerce!(Option<PrimitiveDateTime>),
            },
        })
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.variant_name())
    }
}

impl ToTokens for ColumnType {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let variant = Ident::new(self.variant_name(), Span::call_site());
        tokens.append_all(quote!(::rowtag::ColumnType::#variant));
    }
}

/// Map a field type to its column type tag.
///
/// Transparent wrappers (`Box`, `Rc`, `Arc`, references) are looked through,
/// `Option<T>` selects the nullable family. Unknown types map to
/// [`ColumnType::Default`].
pub fn decode_type(ty: &Type) -> ColumnType {
    match ty {
        Type::Path(TypePath { path, qself: None }) => {
            if let Some(ident) = path.get_ident() {
                let column_type = if ident == "bool" {
                    ColumnType::Bool
                } else if ident == "i8" {
                    ColumnType::Int8
                } else if ident == "i16" {
                    ColumnType::Int16
                } else if ident == "i32" {
                    ColumnType::Int32
                } else if ident == "i64" {
                    ColumnType::Int64
                } else if ident == "u8" {
                    ColumnType::UInt8
                } else if ident == "u16" {
                    ColumnType::UInt16
                } else if ident == "u32" {
                    ColumnType::UInt32
                } else if ident == "u64" {
                    ColumnType::UInt64
                } else if ident == "f32" {
                    ColumnType::Float32
                } else if ident == "f64" {
                    ColumnType::Float64
                } else if ident == "str" {
                    ColumnType::String
                } else {
                    ColumnType::Default
                };
                if column_type != ColumnType::Default {
                    return column_type;
                }
            }
            if matches_path(path, &["std", "string", "String"])
                || matches_path(path, &["std", "borrow", "Cow"])
            {
                return ColumnType::String;
            } else if matches_path(path, &["time", "PrimitiveDateTime"])
                || matches_path(path, &["time", "OffsetDateTime"])
            {
                return ColumnType::Timestamp;
            }
            let is_option = matches_path(path, &["std", "option", "Option"]);
            let is_vec = matches_path(path, &["std", "vec", "Vec"]);
            let is_wrapper = matches_path(path, &["std", "boxed", "Box"])
                || matches_path(path, &["std", "rc", "Rc"])
                || matches_path(path, &["std", "sync", "Arc"]);
            if !(is_option || is_vec || is_wrapper) {
                return ColumnType::Default;
            }
            let Some(inner) = path.segments.last().and_then(|v| match &v.arguments {
                PathArguments::AngleBracketed(bracketed) => {
                    bracketed.args.iter().find_map(|arg| match arg {
                        GenericArgument::Type(ty) => Some(ty),
                        _ => None,
                    })
                }
                _ => None,
            }) else {
                return ColumnType::Default;
            };
            let inner = decode_type(inner);
            if is_option {
                inner.nullable()
            } else if is_vec {
                if inner == ColumnType::UInt8 {
                    ColumnType::Binary
                } else {
                    ColumnType::Default
                }
            } else {
                inner
            }
        }
        Type::Slice(TypeSlice { elem, .. }) if decode_type(elem) == ColumnType::UInt8 => {
            ColumnType::Binary
        }
        Type::Reference(TypeReference { elem, .. }) => decode_type(elem),
        Type::Paren(paren) => decode_type(&paren.elem),
        Type::Group(group) => decode_type(&group.elem),
        _ => ColumnType::Default,
    }
}
