//! Attribute macro deriving a record schema from a struct definition.
//!
//! `#[record(table_name = "invoices")]` adds a `record_schema()`
//! constructor mapping each field's Rust type to its semantic field kind
//! at compile time, so an unsupported type is a build error rather than a
//! runtime surprise.

extern crate proc_macro;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Expr, ExprLit, Fields, Lit, Meta, Type, parse_macro_input};

#[proc_macro_attribute]
pub fn record(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_name = &input.ident;

    let mut table_name = struct_name.to_string().to_lowercase(); // default table name
    if !attr.is_empty() {
        let meta = parse_macro_input!(attr as Meta);
        match meta {
            Meta::NameValue(nv) if nv.path.is_ident("table_name") => {
                if let Expr::Lit(ExprLit { lit: Lit::Str(litstr), .. }) = nv.value {
                    table_name = litstr.value();
                } else {
                    return error(&input, "table_name must be a string literal");
                }
            }
            _ => return error(&input, r#"expected #[record(table_name = "...")]"#),
        }
    }
    if !is_identifier(&table_name) {
        return error(&input, "table_name must be a plain SQL identifier");
    }

    let fields = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(named) => &named.named,
            _ => return error(&input, "record structs need named fields"),
        },
        _ => return error(&input, "#[record] only applies to structs"),
    };
    if fields.is_empty() {
        return error(&input, "record structs need at least one field");
    }

    let mut field_tokens = Vec::new();
    for f in fields {
        let ident = f.ident.as_ref().expect("named field");
        let col_name = ident.to_string().trim_start_matches("r#").to_string();
        let kind = match field_kind(&f.ty) {
            Some(kind) => kind,
            None => {
                return syn::Error::new_spanned(
                    &f.ty,
                    "unsupported field type; use an integer, String, \
                     f32/f64/Decimal, bool, or DateTime<Utc>",
                )
                .to_compile_error()
                .into();
            }
        };
        field_tokens.push(quote! {
            .field(#col_name, ::structable::FieldKind::#kind)
        });
    }

    let expanded = quote! {
        #input

        impl #struct_name {
            /// Record schema derived from this struct's fields, in
            /// declaration order.
            pub fn record_schema() -> ::structable::RecordSchema {
                ::structable::RecordSchema::builder(#table_name)
                    #(#field_tokens)*
                    .build()
                    .expect("derived record schema is well-formed")
            }
        }
    };

    TokenStream::from(expanded)
}

/// Map a Rust field type to its semantic kind by the type path's last
/// segment. Closed set; anything else is a compile error at the call site.
fn field_kind(ty: &Type) -> Option<proc_macro2::TokenStream> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    let kind = match segment.ident.to_string().as_str() {
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => quote!(Integer),
        "String" => quote!(Text),
        "f32" | "f64" | "Decimal" => quote!(Number),
        "bool" => quote!(Boolean),
        "DateTime" => quote!(Timestamp),
        _ => return None,
    };
    Some(kind)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn error(input: &DeriveInput, message: &str) -> TokenStream {
    let err = syn::Error::new_spanned(&input.ident, message).to_compile_error();
    TokenStream::from(quote! {
        #input
        #err
    })
}
