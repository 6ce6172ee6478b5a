//! qfilters-store - Records, predicates and an in-memory store.
//!
//! This crate is the record-store side of qfilters. It provides:
//!
//! - Borrowed field values ([`Value`]) and owned operands ([`Scalar`])
//! - A closed set of lookups: equality, comparison, text matching, regex,
//!   membership, inclusive ranges, date parts and null checks
//! - Composable predicate trees with AND, OR and NOT
//! - Queries with distinct, multi-field ordering and pagination
//! - The [`RecordStore`] and [`ValueSource`] traits plus [`MemoryStore`]
//! - Stored-field schema descriptors used to derive default filters
//!
//! # Quick Start
//!
//! ```rust
//! use qfilters_store::{
//!     Dir, Lookup, MemoryStore, Number, Predicate, Query, Record, RecordStore, Value,
//! };
//!
//! #[derive(Debug)]
//! struct Employee {
//!     name: String,
//!     grade: i32,
//!     active: bool,
//! }
//!
//! impl Record for Employee {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "name" => Value::String(&self.name),
//!             "grade" => Value::Number(Number::from(self.grade)),
//!             "active" => Value::Bool(self.active),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let store = MemoryStore::new(vec![
//!     Employee { name: "Ann".into(), grade: 3, active: true },
//!     Employee { name: "Bo".into(), grade: 5, active: true },
//!     Employee { name: "Cy".into(), grade: 1, active: false },
//! ]);
//!
//! let predicate = Predicate::leaf("grade", Lookup::Gte, 3i64)?
//!     & Predicate::leaf("active", Lookup::Exact, true)?;
//! let query = Query::all().filter(predicate).distinct().order_by("grade", Dir::Desc);
//!
//! let results = store.fetch(&query)?;
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].name, "Bo");
//! # Ok::<(), qfilters_store::StoreError>(())
//! ```
//!
//! # Lookups
//!
//! | Lookup | Operand | Applies to |
//! |--------|---------|------------|
//! | `exact`, `gt`, `gte`, `lt`, `lte` | single value | any comparable value |
//! | `iexact`, `contains`, `icontains` | text | strings |
//! | `startswith`, `istartswith`, `endswith`, `iendswith` | text | strings |
//! | `regex`, `iregex` | pattern | strings |
//! | `in` | list | any comparable value |
//! | `range` | (start, stop), inclusive | any comparable value |
//! | `year`, `month`, `day` | number | dates, datetimes |
//! | `isnull` | bool | any field |

mod clause;
mod error;
mod lookup;
mod ordering;
mod predicate;
mod query;
mod record;
pub mod schema;
mod store;
mod value;

pub use clause::{Clause, ClauseValue};
pub use error::{Result, StoreError};
pub use lookup::Lookup;
pub use ordering::{compare_scalars, compare_values, Dir, OrderBy};
pub use predicate::Predicate;
pub use query::Query;
pub use record::{Model, Record, ToValue};
pub use schema::{Choice, FieldDescriptor, FieldKind, RelationDescriptor};
pub use store::{MemoryStore, RecordStore, ValueSource};
pub use value::{Number, Scalar, Value};

// Re-exported for generated code and callers building date operands.
pub use chrono;
