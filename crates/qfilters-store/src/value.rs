//! Field values as seen by the query engine.
//!
//! [`Value`] borrows a field's value out of a record at query time. [`Scalar`]
//! is its owned counterpart, used inside clauses and for choice lists.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A field value borrowed out of a record while a query runs.
///
/// # Example
///
/// ```
/// use qfilters_store::{Number, Value};
///
/// struct Employee {
///     name: String,
///     grade: u8,
/// }
///
/// fn accessor<'a>(employee: &'a Employee, field: &str) -> Value<'a> {
///     match field {
///         "name" => Value::String(&employee.name),
///         "grade" => Value::Number(Number::U64(employee.grade as u64)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Number(Number),
    Date(NaiveDate),
    /// Naive, no zone.
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Bool(bool),
    /// Multi-valued field, such as a many-to-many relation.
    ///
    /// A clause matches when any element matches.
    Many(Vec<Value<'a>>),
    /// Missing or null. Only `isnull` can match it.
    None,
}

impl<'a> Value<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` for `Date`, `DateTime` and `Time` values.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Value::Date(_) | Value::DateTime(_) | Value::Time(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// The text, for `String` values only.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Converts a single value into an owned [`Scalar`].
    ///
    /// Returns `None` for `Value::None` and `Value::Many`.
    pub fn to_scalar(&self) -> Option<Scalar> {
        match self {
            Value::String(s) => Some(Scalar::Text((*s).to_string())),
            Value::Number(n) => Some(Scalar::Number(*n)),
            Value::Date(d) => Some(Scalar::Date(*d)),
            Value::DateTime(dt) => Some(Scalar::DateTime(*dt)),
            Value::Time(t) => Some(Scalar::Time(*t)),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Many(_) | Value::None => None,
        }
    }
}

/// A number, kept in the widest type of its family so integers never pass
/// through a float unless the other side is one.
///
/// Signed and unsigned integers compare exactly; any comparison involving
/// `F64` is done in `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Lossy for integers beyond 2^53.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::I64(n) => n == 0,
            Number::U64(n) => n == 0,
            Number::F64(n) => n == 0.0,
        }
    }

    /// `None` only when a NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),

            // Anything involving a float goes through f64
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

fn compare_signed_unsigned(signed: i64, unsigned: u64) -> Ordering {
    if signed < 0 {
        Ordering::Less
    } else {
        (signed as u64).cmp(&unsigned)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Owned single value.
///
/// Used as a clause operand, as a choice value, and as the element type of
/// distinct-value listings.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(Number),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without zone.
    DateTime(NaiveDateTime),
    /// Time of day.
    Time(NaiveTime),
    /// Boolean value.
    Bool(bool),
}

impl Scalar {
    /// Borrows this scalar as a [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Scalar::Text(s) => Value::String(s),
            Scalar::Number(n) => Value::Number(*n),
            Scalar::Date(d) => Value::Date(*d),
            Scalar::DateTime(dt) => Value::DateTime(*dt),
            Scalar::Time(t) => Value::Time(*t),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }

    /// Returns the text, if this is a `Text` scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Scalar::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Scalar::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(d: NaiveDate) -> Self {
        Scalar::Date(d)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(dt: NaiveDateTime) -> Self {
        Scalar::DateTime(dt)
    }
}

impl From<NaiveTime> for Scalar {
    fn from(t: NaiveTime) -> Self {
        Scalar::Time(t)
    }
}

macro_rules! scalar_from_number {
    ($($source:ty),*) => {
        $(
            impl From<$source> for Scalar {
                fn from(n: $source) -> Self {
                    Scalar::Number(Number::from(n))
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
