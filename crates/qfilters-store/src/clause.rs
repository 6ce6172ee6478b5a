//! Clause types for query predicates.
//!
//! A [`Clause`] is a single leaf predicate: a field name, a lookup, and an
//! operand. Construction checks that the operand has the shape the lookup
//! needs, so a malformed leaf fails when it is built rather than silently
//! matching nothing.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Regex, RegexBuilder};

use crate::error::{Result, StoreError};
use crate::lookup::Lookup;
use crate::ordering::compare_values;
use crate::value::{Number, Scalar, Value};

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use qfilters_store::{Clause, Lookup, Value};
///
/// let clause = Clause::new("name", Lookup::IContains, "ann").unwrap();
/// assert!(clause.matches(&Value::String("Joanna")));
/// ```
#[derive(Debug, Clone)]
pub struct Clause {
    field: String,
    lookup: Lookup,
    value: ClauseValue,
}

impl Clause {
    /// Creates a new clause, validating the operand against the lookup.
    ///
    /// `regex`/`iregex` compile a text operand here.
    pub fn new(
        field: impl Into<String>,
        lookup: Lookup,
        value: impl Into<ClauseValue>,
    ) -> Result<Self> {
        let field = field.into();
        let value = value.into();

        let invalid = |expected: &'static str| StoreError::InvalidOperand {
            field: field.clone(),
            lookup: lookup.as_str(),
            expected,
        };

        let value = match (lookup, value) {
            (Lookup::Regex | Lookup::IRegex, value @ ClauseValue::Regex(_)) => value,
            (Lookup::Regex | Lookup::IRegex, ClauseValue::Scalar(Scalar::Text(pattern))) => {
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(lookup == Lookup::IRegex)
                    .build()?;
                ClauseValue::Regex(regex)
            }
            (Lookup::Regex | Lookup::IRegex, _) => return Err(invalid("a text pattern")),

            (Lookup::In, value @ ClauseValue::List(_)) => value,
            (Lookup::In, _) => return Err(invalid("a list of values")),

            (Lookup::Range, value @ ClauseValue::Range(_, _)) => value,
            (Lookup::Range, _) => return Err(invalid("a (start, stop) pair")),

            (Lookup::IsNull, value @ ClauseValue::Scalar(Scalar::Bool(_))) => value,
            (Lookup::IsNull, _) => return Err(invalid("a boolean")),

            (lookup, value @ ClauseValue::Scalar(Scalar::Number(_))) if lookup.is_date_part() => {
                value
            }
            (lookup, _) if lookup.is_date_part() => return Err(invalid("a number")),

            (lookup, value @ ClauseValue::Scalar(Scalar::Text(_))) if lookup.is_text_match() => {
                value
            }
            (lookup, _) if lookup.is_text_match() => return Err(invalid("text")),

            (_, value @ ClauseValue::Scalar(_)) => value,
            (_, _) => return Err(invalid("a single value")),
        };

        Ok(Clause {
            field,
            lookup,
            value,
        })
    }

    /// Creates a clause from a lookup name such as `"gte"`.
    pub fn parse(
        field: impl Into<String>,
        lookup: &str,
        value: impl Into<ClauseValue>,
    ) -> Result<Self> {
        Clause::new(field, lookup.parse()?, value)
    }

    /// The field this clause reads.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison applied to the field.
    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    /// The operand.
    pub fn value(&self) -> &ClauseValue {
        &self.value
    }

    /// Evaluates this clause against a field value.
    ///
    /// Missing fields only satisfy `isnull=true`. Multi-valued fields match
    /// when any element matches. Type mismatches never match.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match field_value {
            Value::None => self.match_null(true),
            Value::Many(items) if self.lookup == Lookup::IsNull => {
                self.match_null(items.is_empty())
            }
            Value::Many(items) => items.iter().any(|item| self.matches(item)),
            value => self.match_present(value),
        }
    }

    fn match_null(&self, is_null: bool) -> bool {
        match (&self.lookup, &self.value) {
            (Lookup::IsNull, ClauseValue::Scalar(Scalar::Bool(expected))) => *expected == is_null,
            _ => false,
        }
    }

    fn match_present(&self, value: &Value<'_>) -> bool {
        match (&self.lookup, &self.value) {
            (Lookup::IsNull, _) => self.match_null(false),
            (_, ClauseValue::Regex(regex)) => value.as_str().is_some_and(|s| regex.is_match(s)),
            (_, ClauseValue::List(items)) => items
                .iter()
                .any(|item| compare_values(value, &item.as_value()) == Some(Ordering::Equal)),
            (_, ClauseValue::Range(start, stop)) => {
                let above = compare_values(value, &start.as_value());
                let below = compare_values(value, &stop.as_value());
                matches!(above, Some(Ordering::Greater | Ordering::Equal))
                    && matches!(below, Some(Ordering::Less | Ordering::Equal))
            }
            (lookup, ClauseValue::Scalar(Scalar::Number(part))) if lookup.is_date_part() => {
                date_part(value, *lookup).is_some_and(|actual| {
                    Number::I64(actual).compare(*part) == Some(Ordering::Equal)
                })
            }
            (lookup, ClauseValue::Scalar(Scalar::Text(pattern))) if lookup.is_text_match() => value
                .as_str()
                .is_some_and(|s| match_text(*lookup, s, pattern)),
            (lookup, ClauseValue::Scalar(operand)) => compare_values(value, &operand.as_value())
                .is_some_and(|ordering| lookup.eval_ordering(ordering)),
        }
    }
}

fn date_part(value: &Value<'_>, lookup: Lookup) -> Option<i64> {
    let date = match value {
        Value::Date(d) => *d,
        Value::DateTime(dt) => dt.date(),
        _ => return None,
    };
    match lookup {
        Lookup::Year => Some(date.year() as i64),
        Lookup::Month => Some(date.month() as i64),
        Lookup::Day => Some(date.day() as i64),
        _ => None,
    }
}

fn match_text(lookup: Lookup, field: &str, pattern: &str) -> bool {
    match lookup {
        Lookup::Contains => field.contains(pattern),
        Lookup::StartsWith => field.starts_with(pattern),
        Lookup::EndsWith => field.ends_with(pattern),
        Lookup::IExact => field.to_lowercase() == pattern.to_lowercase(),
        Lookup::IContains => field.to_lowercase().contains(&pattern.to_lowercase()),
        Lookup::IStartsWith => field.to_lowercase().starts_with(&pattern.to_lowercase()),
        Lookup::IEndsWith => field.to_lowercase().ends_with(&pattern.to_lowercase()),
        _ => false,
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}={}", self.field, self.lookup, self.value)
    }
}

/// Owned operand stored in a clause.
#[derive(Debug, Clone)]
pub enum ClauseValue {
    /// Single value.
    Scalar(Scalar),
    /// Candidate set for `in`.
    List(Vec<Scalar>),
    /// Inclusive bounds for `range`.
    Range(Scalar, Scalar),
    /// Compiled regular expression.
    Regex(Regex),
}

impl fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseValue::Scalar(s) => write_operand(f, s),
            ClauseValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_operand(f, item)?;
                }
                f.write_str("]")
            }
            ClauseValue::Range(start, stop) => {
                f.write_str("(")?;
                write_operand(f, start)?;
                f.write_str(", ")?;
                write_operand(f, stop)?;
                f.write_str(")")
            }
            ClauseValue::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

// Text operands are quoted so `name__exact="1"` and `grade__exact=1` differ.
fn write_operand(f: &mut fmt::Formatter<'_>, scalar: &Scalar) -> fmt::Result {
    match scalar {
        Scalar::Text(s) => write!(f, "{:?}", s),
        other => write!(f, "{}", other),
    }
}

macro_rules! clause_value_from_scalar {
    ($($source:ty),*) => {
        $(
            impl From<$source> for ClauseValue {
                fn from(value: $source) -> Self {
                    ClauseValue::Scalar(value.into())
                }
            }
        )*
    };
}

clause_value_from_scalar!(
    Scalar, String, &str, bool, Number, NaiveDate, NaiveDateTime, NaiveTime,
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

impl<T: Into<Scalar>> From<Vec<T>> for ClauseValue {
    fn from(values: Vec<T>) -> Self {
        ClauseValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Scalar>, B: Into<Scalar>> From<(A, B)> for ClauseValue {
    fn from((start, stop): (A, B)) -> Self {
        ClauseValue::Range(start.into(), stop.into())
    }
}

impl From<Regex> for ClauseValue {
    fn from(regex: Regex) -> Self {
        ClauseValue::Regex(regex)
    }
}
