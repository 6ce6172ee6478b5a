//! Raw and cleaned filter values.
//!
//! A [`RawValue`] is what a user submitted for one field. A form field
//! cleans it into a typed [`CleanedValue`], which a filter then turns into
//! a predicate.

use qfilters_store::{Number, Scalar};
use serde::{Deserialize, Serialize};

/// A submitted value: one string, or several for multi-valued inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

impl RawValue {
    /// The single value of this input. For lists this is the last entry,
    /// matching how repeated form keys read as one value.
    pub fn as_text(&self) -> &str {
        match self {
            RawValue::Text(s) => s,
            RawValue::List(items) => items.last().map(String::as_str).unwrap_or(""),
        }
    }

    /// Every submitted entry. A lone text value is a one-element list, and
    /// an empty one is an empty list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            RawValue::Text(s) if s.is_empty() => Vec::new(),
            RawValue::Text(s) => vec![s.clone()],
            RawValue::List(items) => items.clone(),
        }
    }

    /// Returns `true` for empty text or a list of empty entries.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Text(s) => s.is_empty(),
            RawValue::List(items) => items.iter().all(String::is_empty),
        }
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        RawValue::List(items)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(items: Vec<&str>) -> Self {
        RawValue::List(items.into_iter().map(String::from).collect())
    }
}

/// A validated, typed value ready to be filtered on.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CleanedValue {
    /// Nothing was selected.
    #[default]
    Null,
    Scalar(Scalar),
    List(Vec<Scalar>),
    /// Bounds of a range input; either may be missing.
    Range {
        start: Option<Scalar>,
        stop: Option<Scalar>,
    },
    /// A value paired with a lookup chosen by the user. An empty lookup
    /// means `exact`.
    Lookup {
        value: Option<Scalar>,
        lookup: String,
    },
}

impl CleanedValue {
    /// Truthiness of the value: non-empty text, `true`, non-zero numbers,
    /// any date or time, non-empty lists, ranges with a bound, and every
    /// lookup pair.
    pub fn is_truthy(&self) -> bool {
        match self {
            CleanedValue::Null => false,
            CleanedValue::Scalar(scalar) => scalar_is_truthy(scalar),
            CleanedValue::List(items) => !items.is_empty(),
            CleanedValue::Range { start, stop } => start.is_some() || stop.is_some(),
            CleanedValue::Lookup { .. } => true,
        }
    }

    /// Whether the value should restrict the result at all.
    ///
    /// Truthy values are meaningful, and so are exactly two falsy ones:
    /// boolean `false` and numeric zero. Empty text, empty lists and
    /// `Null` are not.
    pub fn is_meaningful(&self) -> bool {
        match self {
            CleanedValue::Scalar(Scalar::Bool(false)) => true,
            CleanedValue::Scalar(Scalar::Number(n)) if n.is_zero() => true,
            other => other.is_truthy(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            CleanedValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

impl From<Scalar> for CleanedValue {
    fn from(scalar: Scalar) -> Self {
        CleanedValue::Scalar(scalar)
    }
}

impl From<Option<Scalar>> for CleanedValue {
    fn from(scalar: Option<Scalar>) -> Self {
        scalar.map_or(CleanedValue::Null, CleanedValue::Scalar)
    }
}

pub(crate) fn scalar_is_truthy(scalar: &Scalar) -> bool {
    match scalar {
        Scalar::Text(s) => !s.is_empty(),
        Scalar::Bool(b) => *b,
        Scalar::Number(n) => !n.is_zero(),
        Scalar::Date(_) | Scalar::DateTime(_) | Scalar::Time(_) => true,
    }
}

/// Reads a cleaned scalar as a whole number, if it is one.
pub(crate) fn scalar_as_integer(scalar: &Scalar) -> Option<i64> {
    match scalar {
        Scalar::Number(Number::I64(n)) => Some(*n),
        Scalar::Number(Number::U64(n)) => i64::try_from(*n).ok(),
        Scalar::Number(Number::F64(f)) if f.fract() == 0.0 => Some(*f as i64),
        Scalar::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}
