//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates field name constants, a `Record` implementation reading each
//! annotated field through `ToValue`, and a `Model` implementation listing
//! the fields' descriptors.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::parse_field_attrs;

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut descriptors: Vec<TokenStream> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let kind = match attrs.kind {
            Some(kind) => kind,
            None => continue,
        };
        let is_relation = matches!(
            kind.to_string().as_str(),
            "ForeignKey" | "OneToOne" | "ManyToMany"
        );
        if is_relation && attrs.relation.is_none() {
            return Err(Error::new(
                attrs.span,
                format!("{} fields need relation = \"path::to::fn\"", kind),
            ));
        }

        let query_name = attrs.rename.unwrap_or_else(|| field_name.to_string());
        let const_name = format_ident!("{}", to_screaming_snake_case(&query_name));

        field_constants.push(quote! {
            /// Field name constant for building predicates.
            pub const #const_name: &'static str = #query_name;
        });

        field_matches.push(quote! {
            #query_name => ::qfilters_store::ToValue::to_value(&self.#field_name),
        });

        let mut descriptor = quote! {
            ::qfilters_store::FieldDescriptor::new(
                #query_name,
                ::qfilters_store::FieldKind::#kind,
            )
        };
        if let Some(verbose_name) = attrs.verbose_name {
            descriptor = quote! { #descriptor.verbose_name(#verbose_name) };
        }
        if let Some(choices) = attrs.choices {
            descriptor = quote! { #descriptor.choices(#choices()) };
        }
        if let Some(relation) = attrs.relation {
            descriptor = quote! { #descriptor.relation(#relation()) };
        }
        descriptors.push(descriptor);
    }

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::qfilters_store::Record for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::qfilters_store::Value<'_> {
                match field {
                    #(#field_matches)*
                    _ => ::qfilters_store::Value::None,
                }
            }
        }

        impl #impl_generics ::qfilters_store::Model for #struct_name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::qfilters_store::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(tokens: TokenStream) -> Result<String> {
        let input: DeriveInput = syn::parse2(tokens)?;
        record_derive_impl(input).map(|ts| ts.to_string())
    }

    #[test]
    fn test_screaming_snake_case() {
        assert_eq!(to_screaming_snake_case("name"), "NAME");
        assert_eq!(to_screaming_snake_case("hire_date"), "HIRE_DATE");
        assert_eq!(to_screaming_snake_case("hireDate"), "HIRE_DATE");
        assert_eq!(to_screaming_snake_case("pay-grade"), "PAY_GRADE");
    }

    #[test]
    fn test_expands_annotated_fields_only() {
        let out = expand(quote! {
            struct Employee {
                #[field(Char)]
                name: String,
                #[field(skip)]
                cache: u64,
                notes: String,
            }
        })
        .unwrap();
        assert!(out.contains("pub const NAME"));
        assert!(!out.contains("CACHE"));
        assert!(!out.contains("NOTES"));
        assert!(out.contains("FieldKind :: Char"));
    }

    #[test]
    fn test_expands_descriptor_builders() {
        let out = expand(quote! {
            struct Employee {
                #[field(
                    Integer,
                    rename = "grade",
                    verbose_name = "pay grade",
                    choices = "grades"
                )]
                pay: u8,
                #[field(ForeignKey, relation = "depts::relation")]
                dept: i64,
            }
        })
        .unwrap();
        assert!(out.contains("pub const GRADE"));
        assert!(out.contains("verbose_name (\"pay grade\")"));
        assert!(out.contains("choices (grades ())"));
        assert!(out.contains("relation (depts :: relation ())"));
    }

    #[test]
    fn test_relation_kinds_need_a_relation() {
        let err = expand(quote! {
            struct Employee {
                #[field(ManyToMany)]
                teams: Vec<i64>,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("ManyToMany fields need relation"));
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let err = expand(quote! { struct Pair(u8, u8); }).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_enums() {
        let err = expand(quote! { enum Kind { A, B } }).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }
}
