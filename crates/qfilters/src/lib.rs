//! qfilters - Per-field filter criteria to record-store predicates.
//!
//! A filter set turns user-submitted values, one per field, into a single
//! predicate and runs it against a record store. Each field has a
//! [`Filter`] deciding what its value means:
//!
//! - [`LookupFilter`]: `field <lookup> value`, optionally with the lookup
//!   chosen by the user
//! - [`BooleanFilter`]: `field == value`, where `false` is a real selection
//! - [`MultipleChoiceFilter`]: any of the selected values
//! - [`RangeFilter`]: an inclusive range
//! - [`DateRangeFilter`]: presets such as "Today" or "Past 7 days"
//! - [`AllValuesFilter`]: one of the values present in the data
//!
//! Filters are usually derived from a record type's stored fields by the
//! [`FieldSchemaResolver`] and collected in a [`FilterSetDefinition`].
//! Binding the definition to input and a store yields a [`FilterSet`] whose
//! result is computed once, on first access. A field whose input fails
//! validation is ignored and reported in
//! [`field_errors`](FilterSet::field_errors); it never fails the query.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use qfilters::chrono::NaiveDate;
//! use qfilters::{DateRangeFilter, FilterSetDefinition, FixedClock, FormData, InputBinding};
//! use qfilters::{MemoryStore, Record};
//!
//! #[derive(Debug, Record)]
//! struct Employee {
//!     #[field(Char)]
//!     name: String,
//!     #[field(Boolean)]
//!     active: bool,
//!     #[field(Date)]
//!     hire_date: NaiveDate,
//! }
//!
//! let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
//! let store = MemoryStore::new(vec![
//!     Employee { name: "Ann".into(), active: true, hire_date: today },
//!     Employee { name: "Bo".into(), active: false, hire_date: today },
//!     Employee { name: "Cy".into(), active: false, hire_date: NaiveDate::MIN },
//! ]);
//!
//! let definition = FilterSetDefinition::builder()
//!     .fields::<Employee>()
//!     .filter(Box::new(
//!         DateRangeFilter::new("hire_date").with_clock(Arc::new(FixedClock(today))),
//!     ))
//!     .build()?;
//!
//! let input = FormData::from_pairs([("name", ""), ("active", "false"), ("hire_date", "1")]);
//! let filterset = definition.bind(InputBinding::bound(input), &store);
//!
//! let names: Vec<_> = filterset.result()?.iter().map(|e| e.name.as_str()).collect();
//! assert_eq!(names, vec!["Bo"]);
//! # Ok::<(), qfilters::FilterError>(())
//! ```
//!
//! # Input
//!
//! Raw input is a [`FormData`] map of field names to [`RawValue`]s, built
//! from key/value pairs or a JSON object. Range and lookup-pair fields
//! read either a two-element list or `name_0` / `name_1` keys. An unbound
//! filter set ([`InputBinding::Unbound`]) reads initial values instead.
//!
//! # Logging
//!
//! Evaluation emits [`tracing`] events: skipped fields at `debug`, each
//! applied predicate at `trace`, and a per-evaluation summary at `debug`.

mod binding;
mod clock;
mod error;
mod fields;
mod filters;
mod filterset;
mod resolver;
mod value;

pub use binding::{FormData, InputBinding};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CleanError, FieldError, FilterError, Result, ValidationError};
pub use fields::{ChoiceSet, FieldType, FormField};
pub use filters::{
    AllValuesFilter, BooleanFilter, DatePreset, DateRangeFilter, Filter, LookupFilter,
    MultipleChoiceFilter, PresetBuilder, RangeFilter, DATE_PRESETS,
};
pub use filterset::{FilterSet, FilterSetBuilder, FilterSetDefinition};
pub use resolver::{
    build_filter, default_for, ExtraBuilder, FieldSchemaResolver, FilterClass, FilterDefaults,
    FilterParams,
};
pub use value::{CleanedValue, RawValue};

pub use qfilters_store::{
    Choice, FieldDescriptor, FieldKind, Lookup, MemoryStore, Model, Predicate, Record, RecordStore,
    RelationDescriptor, Scalar, ToValue, Value, ValueSource,
};

// Derive macro
pub use qfilters_macros::Record;

pub use chrono;
pub use qfilters_store;
