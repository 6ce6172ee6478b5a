//! Traits connecting user types to the query engine.
//!
//! [`Record`] is the field accessor every stored type implements, usually
//! through `#[derive(Record)]` from `qfilters-macros`. [`ToValue`] converts
//! a field into a [`Value`], and [`Model`] lists a type's queryable fields.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::schema::FieldDescriptor;
use crate::value::{Number, Value};

/// A stored record whose fields can be read by name.
///
/// # Derive Usage
///
/// ```ignore
/// use qfilters_macros::Record;
///
/// #[derive(Record)]
/// struct Employee {
///     #[field(Char)]
///     name: String,
///     #[field(Boolean)]
///     active: bool,
///     #[field(Date, verbose_name = "hire date")]
///     hire_date: chrono::NaiveDate,
/// }
/// ```
///
/// # Manual Implementation
///
/// ```
/// use qfilters_store::{Number, Record, Value};
///
/// struct Employee {
///     name: String,
///     grade: u8,
/// }
///
/// impl Record for Employee {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "grade" => Value::Number(Number::U64(self.grade as u64)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of a field, or [`Value::None`] if the field does
    /// not exist or is not queryable.
    fn field_value(&self, field: &str) -> Value<'_>;
}

/// A record type that can describe its stored fields.
pub trait Model: Record {
    /// One descriptor per queryable field, in declaration order.
    fn fields() -> Vec<FieldDescriptor>
    where
        Self: Sized;
}

/// Conversion from a field's Rust type into a [`Value`].
///
/// Implemented for strings, booleans, numbers, chrono date/time types,
/// `Option<T>` (where `None` becomes [`Value::None`]) and `Vec<T>`
/// (a multi-valued field).
pub trait ToValue {
    /// Borrows this field as a value.
    fn to_value(&self) -> Value<'_>;
}

impl ToValue for String {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value<'_> {
        Value::Date(*self)
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value<'_> {
        Value::DateTime(*self)
    }
}

impl ToValue for NaiveTime {
    fn to_value(&self) -> Value<'_> {
        Value::Time(*self)
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value<'_> {
        Value::Number(*self)
    }
}

macro_rules! number_to_value {
    ($($source:ty),*) => {
        $(
            impl ToValue for $source {
                fn to_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

number_to_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::None,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value<'_> {
        Value::Many(self.iter().map(ToValue::to_value).collect())
    }
}
