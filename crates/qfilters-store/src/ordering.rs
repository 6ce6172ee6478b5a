//! Result ordering.
//!
//! [`compare_values`] is the one comparison in the crate: sorting uses it,
//! and so do the lookups that compare (`exact`, `gt`, `gte`, `lt`, `lte`,
//! `range`). Missing values sort after everything else.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::record::Record;
use crate::value::{Scalar, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }
}

/// One sort key of a query.
///
/// Written as `"field"` for ascending and `"-field"` for descending, both
/// by [`OrderBy::parse`] and by `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub dir: Dir,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Desc)
    }

    pub fn parse(key: &str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => OrderBy::desc(field),
            None => OrderBy::asc(key),
        }
    }

    /// Orders two records by this key alone. `None` when the field values
    /// cannot be compared.
    pub fn cmp_records<R>(&self, a: &R, b: &R) -> Option<Ordering>
    where
        R: Record + ?Sized,
    {
        let a = a.field_value(&self.field);
        let b = b.field_value(&self.field);
        compare_values(&a, &b).map(|ordering| self.dir.apply(ordering))
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            Dir::Asc => f.write_str(&self.field),
            Dir::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Compares two field values.
///
/// A `Date` against a `DateTime` is read as midnight of that day. Returns
/// `None` for mismatched types, multi-valued fields and NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::Date(b)) => Some(a.cmp(&midnight(*b))),
        (Value::Date(a), Value::DateTime(b)) => Some(midnight(*a).cmp(b)),
        _ => None,
    }
}

/// Total order over scalars for sorting choice lists. Incomparable pairs
/// count as equal.
pub fn compare_scalars(a: &Scalar, b: &Scalar) -> Ordering {
    compare_values(&a.as_value(), &b.as_value()).unwrap_or(Ordering::Equal)
}

/// Orders two records by each key in turn. A key whose values are equal or
/// incomparable defers to the next one.
pub(crate) fn compare_records<R>(a: &R, b: &R, keys: &[OrderBy]) -> Ordering
where
    R: Record + ?Sized,
{
    keys.iter()
        .filter_map(|key| key.cmp_records(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
