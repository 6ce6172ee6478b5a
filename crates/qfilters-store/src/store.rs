//! Record store traits and the in-memory store.
//!
//! [`RecordStore`] runs a [`Query`] and hands back borrowed records.
//! [`ValueSource`] lists the distinct values of a field; it is object safe
//! so filters can hold one behind an `Arc` without knowing the record type.

use std::fmt;

use crate::error::Result;
use crate::ordering::compare_scalars;
use crate::predicate::Predicate;
use crate::query::Query;
use crate::record::Record;
use crate::value::{Scalar, Value};

/// A collection of records that can execute queries.
///
/// Stores are read-only from the query engine's point of view. Returned
/// references borrow from the store.
pub trait RecordStore {
    /// The stored record type.
    type Record: Record;

    /// Executes a query, returning the matching records in result order.
    fn fetch(&self, query: &Query) -> Result<Vec<&Self::Record>>;
}

/// A source of distinct field values.
///
/// Backs choice lists that reflect live data: every call reads the current
/// contents, nothing is cached.
pub trait ValueSource: Send + Sync + fmt::Debug {
    /// Distinct values of `field` among records matching `restrict`, sorted
    /// ascending. Records where the field is missing contribute nothing;
    /// multi-valued fields contribute each element.
    fn distinct_values(&self, field: &str, restrict: &Predicate) -> Result<Vec<Scalar>>;
}

/// An in-memory store over a vector of records.
///
/// # Example
///
/// ```
/// use qfilters_store::{Lookup, MemoryStore, Predicate, Query, Record, RecordStore, Value};
///
/// #[derive(Debug)]
/// struct City(&'static str);
///
/// impl Record for City {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(self.0),
///             _ => Value::None,
///         }
///     }
/// }
///
/// let store = MemoryStore::new(vec![City("Oslo"), City("Lima"), City("Rome")]);
/// let query = Query::all().filter(Predicate::leaf("name", Lookup::Contains, "o")?);
/// let found: Vec<_> = store.fetch(&query)?.iter().map(|city| city.0).collect();
/// assert_eq!(found, vec!["Oslo", "Rome"]);
/// # Ok::<(), qfilters_store::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore<R> {
    records: Vec<R>,
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        MemoryStore {
            records: Vec::new(),
        }
    }
}

impl<R> MemoryStore<R> {
    pub fn new(records: Vec<R>) -> Self {
        MemoryStore { records }
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> FromIterator<R> for MemoryStore<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        MemoryStore::new(iter.into_iter().collect())
    }
}

impl<R: Record> RecordStore for MemoryStore<R> {
    type Record = R;

    fn fetch(&self, query: &Query) -> Result<Vec<&R>> {
        Ok(query.execute(&self.records))
    }
}

impl<R> ValueSource for MemoryStore<R>
where
    R: Record + Send + Sync + fmt::Debug,
{
    fn distinct_values(&self, field: &str, restrict: &Predicate) -> Result<Vec<Scalar>> {
        let mut values = Vec::new();
        for record in self.records.iter().filter(|r| restrict.matches(*r)) {
            collect_scalars(&record.field_value(field), &mut values);
        }
        values.sort_by(compare_scalars);
        values.dedup();
        Ok(values)
    }
}

fn collect_scalars(value: &Value<'_>, out: &mut Vec<Scalar>) {
    match value {
        Value::Many(items) => items.iter().for_each(|item| collect_scalars(item, out)),
        single => out.extend(single.to_scalar()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::Lookup;
    use crate::ordering::Dir;
    use crate::value::Number;

    #[derive(Debug)]
    struct Employee {
        name: &'static str,
        dept: Option<&'static str>,
        teams: Vec<i64>,
    }

    impl Record for Employee {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "name" => Value::String(self.name),
                "dept" => self.dept.map(Value::String).unwrap_or(Value::None),
                "teams" => Value::Many(
                    self.teams
                        .iter()
                        .map(|t| Value::Number(Number::I64(*t)))
                        .collect(),
                ),
                _ => Value::None,
            }
        }
    }

    fn store() -> MemoryStore<Employee> {
        MemoryStore::new(vec![
            Employee {
                name: "cy",
                dept: Some("ops"),
                teams: vec![2],
            },
            Employee {
                name: "ann",
                dept: Some("eng"),
                teams: vec![1, 2],
            },
            Employee {
                name: "bo",
                dept: None,
                teams: vec![],
            },
            Employee {
                name: "di",
                dept: Some("eng"),
                teams: vec![3],
            },
        ])
    }

    #[test]
    fn fetch_runs_the_query() {
        let store = store();
        let query = Query::all()
            .filter(Predicate::leaf("dept", Lookup::Exact, "eng").unwrap())
            .order_by("name", Dir::Desc);
        let names: Vec<_> = store.fetch(&query).unwrap().iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["di", "ann"]);
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let store = store();
        let depts = store.distinct_values("dept", &Predicate::Empty).unwrap();
        assert_eq!(depts, vec![Scalar::from("eng"), Scalar::from("ops")]);
    }

    #[test]
    fn distinct_values_flatten_many() {
        let store = store();
        let teams = store.distinct_values("teams", &Predicate::Empty).unwrap();
        assert_eq!(
            teams,
            vec![Scalar::from(1i64), Scalar::from(2i64), Scalar::from(3i64)]
        );
    }

    #[test]
    fn distinct_values_respect_restriction() {
        let store = store();
        let restrict = Predicate::leaf("dept", Lookup::Exact, "eng").unwrap();
        let names = store.distinct_values("name", &restrict).unwrap();
        assert_eq!(names, vec![Scalar::from("ann"), Scalar::from("di")]);
    }

    #[test]
    fn collects_from_iterator() {
        let store: MemoryStore<Employee> = store().records.into_iter().take(2).collect();
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
