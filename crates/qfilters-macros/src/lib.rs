//! Derive macros for qfilters.
//!
//! - [`Record`] - Implement `Record` and `Model` from struct field annotations
//!
//! Generated code refers to `::qfilters_store`, so crates using the derive
//! depend on `qfilters-store` directly.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod record;

/// Derives `Record` and `Model` for a struct with named fields.
///
/// Each field annotated with `#[field(Kind)]` becomes queryable under its
/// name, where `Kind` is a `qfilters_store::FieldKind` variant. The field's
/// type must implement `qfilters_store::ToValue`. Unannotated fields and
/// fields marked `#[field(skip)]` are invisible to queries.
///
/// # Generated Code
///
/// 1. A `SCREAMING_SNAKE_CASE` constant per field holding its query name
/// 2. `Record::field_value()` matching on those names
/// 3. `Model::fields()` returning one `FieldDescriptor` per field
///
/// # Field Attributes
///
/// | Attribute | Effect |
/// |-----------|--------|
/// | `Kind` | The stored kind, e.g. `Char`, `Boolean`, `Date`, `ForeignKey` |
/// | `skip` | Leave the field out |
/// | `rename = "..."` | Query under a different name |
/// | `verbose_name = "..."` | Display name used for filter labels |
/// | `choices = "path"` | `fn() -> Vec<Choice>` listing the legal values |
/// | `relation = "path"` | `fn() -> RelationDescriptor`; required for relation kinds |
///
/// # Example
///
/// ```ignore
/// use qfilters_macros::Record;
/// use qfilters_store::{Choice, Model};
///
/// fn grades() -> Vec<Choice> {
///     vec![Choice::new(1, "Junior"), Choice::new(2, "Senior")]
/// }
///
/// #[derive(Record)]
/// struct Employee {
///     #[field(Char)]
///     name: String,
///
///     #[field(Integer, choices = "grades")]
///     grade: i32,
///
///     #[field(Date, verbose_name = "hired on")]
///     hire_date: chrono::NaiveDate,
///
///     #[field(skip)]
///     cache_key: u64,
/// }
///
/// assert_eq!(Employee::HIRE_DATE, "hire_date");
/// assert_eq!(Employee::fields().len(), 3);
/// ```
#[proc_macro_derive(Record, attributes(field))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
