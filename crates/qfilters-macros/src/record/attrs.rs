//! Attribute parsing for the Record derive macro.
//!
//! Parses the `#[field(...)]` attributes: a field kind, plus optional
//! `rename`, `verbose_name`, `choices`, `relation` and `skip`.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Expr, ExprLit, Ident, Lit, LitStr, Meta, Path, Result, Token,
};

/// Field kinds accepted in `#[field(...)]`, mirroring `qfilters_store::FieldKind`.
pub const FIELD_KINDS: &[&str] = &[
    "Char",
    "Text",
    "Slug",
    "Email",
    "FilePath",
    "Url",
    "IpAddress",
    "CommaSeparatedInteger",
    "Boolean",
    "NullBoolean",
    "Date",
    "DateTime",
    "Time",
    "Decimal",
    "SmallInteger",
    "Integer",
    "PositiveInteger",
    "PositiveSmallInteger",
    "Float",
    "ForeignKey",
    "OneToOne",
    "ManyToMany",
    "File",
    "Binary",
];

/// Validates a kind identifier against [`FIELD_KINDS`].
pub fn parse_kind(ident: &Ident) -> Result<Ident> {
    let name = ident.to_string();
    if FIELD_KINDS.contains(&name.as_str()) {
        Ok(ident.clone())
    } else {
        Err(Error::new(
            ident.span(),
            format!(
                "unknown field kind: '{}'. Expected one of: {}",
                name,
                FIELD_KINDS.join(", ")
            ),
        ))
    }
}

/// Field-level attributes from `#[field(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    /// The stored kind, a `FieldKind` variant name.
    pub kind: Option<Ident>,
    /// Leave this field out of the record entirely.
    pub skip: bool,
    /// Query name (default: the Rust field name).
    pub rename: Option<String>,
    /// Display name (default: the query name with `_` as spaces).
    pub verbose_name: Option<String>,
    /// Path to a `fn() -> Vec<Choice>` listing legal values.
    pub choices: Option<Path>,
    /// Path to a `fn() -> RelationDescriptor` for relation kinds.
    pub relation: Option<Path>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            kind: None,
            skip: false,
            rename: None,
            verbose_name: None,
            choices: None,
            relation: None,
            span: Span::call_site(),
        }
    }
}

fn string_value(expr: &Expr, key: &str) -> Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", key),
        )),
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                // Kind identifier or the skip flag
                Meta::Path(p) => {
                    if p.is_ident("skip") {
                        attr.skip = true;
                    } else if let Some(ident) = p.get_ident() {
                        attr.kind = Some(parse_kind(ident)?);
                        attr.span = ident.span();
                    } else {
                        return Err(Error::new(p.span(), "expected a field kind or skip"));
                    }
                }

                Meta::NameValue(nv) => {
                    let key = nv
                        .path
                        .get_ident()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    match key.as_str() {
                        "rename" => {
                            attr.rename = Some(string_value(&nv.value, "rename")?.value())
                        }
                        "verbose_name" => {
                            attr.verbose_name =
                                Some(string_value(&nv.value, "verbose_name")?.value())
                        }
                        "choices" => {
                            attr.choices = Some(string_value(&nv.value, "choices")?.parse()?)
                        }
                        "relation" => {
                            attr.relation = Some(string_value(&nv.value, "relation")?.parse()?)
                        }
                        _ => {
                            return Err(Error::new(
                                nv.path.span(),
                                "unknown attribute. Expected: rename, verbose_name, choices \
                                 or relation",
                            ))
                        }
                    }
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown field attribute. Expected a field kind, skip, rename = \"...\", \
                         verbose_name = \"...\", choices = \"...\" or relation = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Extract `#[field(...)]` attributes from a struct field.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("field") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_field(tokens: &str) -> Result<FieldAttr> {
        syn::parse_str::<FieldAttr>(tokens)
    }

    #[test]
    fn test_kind_only() {
        let attr = parse_field("Char").unwrap();
        assert_eq!(attr.kind.unwrap().to_string(), "Char");
        assert!(!attr.skip);
        assert!(attr.rename.is_none());
    }

    #[test]
    fn test_relation_kinds() {
        for kind in ["ForeignKey", "OneToOne", "ManyToMany"] {
            let attr = parse_field(kind).unwrap();
            assert_eq!(attr.kind.unwrap().to_string(), kind);
        }
    }

    #[test]
    fn test_skip() {
        let attr = parse_field("skip").unwrap();
        assert!(attr.skip);
        assert!(attr.kind.is_none());
    }

    #[test]
    fn test_rename_and_verbose_name() {
        let attr = parse_field(r#"Date, rename = "hired", verbose_name = "hire date""#).unwrap();
        assert_eq!(attr.kind.unwrap().to_string(), "Date");
        assert_eq!(attr.rename.as_deref(), Some("hired"));
        assert_eq!(attr.verbose_name.as_deref(), Some("hire date"));
    }

    #[test]
    fn test_choices_path() {
        let attr = parse_field(r#"Char, choices = "crate::grades::all""#).unwrap();
        let path = attr.choices.unwrap();
        assert_eq!(path.segments.len(), 3);
        assert_eq!(path.segments[2].ident.to_string(), "all");
    }

    #[test]
    fn test_relation_path() {
        let attr = parse_field(r#"ForeignKey, relation = "dept_relation""#).unwrap();
        assert!(attr.relation.unwrap().is_ident("dept_relation"));
    }

    #[test]
    fn test_invalid_kind() {
        let err = parse_field("Varchar").unwrap_err();
        assert!(err.to_string().contains("unknown field kind"));
    }

    #[test]
    fn test_invalid_key() {
        let err = parse_field(r#"Char, label = "x""#).unwrap_err();
        assert!(err.to_string().contains("unknown attribute"));
    }

    #[test]
    fn test_non_string_value() {
        let err = parse_field("Char, rename = 3").unwrap_err();
        assert!(err.to_string().contains("rename must be a string literal"));
    }

    #[test]
    fn test_invalid_path() {
        assert!(parse_field(r#"Char, choices = "not a path""#).is_err());
    }
}
