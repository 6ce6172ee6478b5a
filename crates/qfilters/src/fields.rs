//! Form fields: per-field cleaning of raw input into typed values.
//!
//! Every filter owns a [`FormField`] describing how its input is validated.
//! Fields are independent; one field failing never affects another.
//!
//! | Type | Accepts | Cleans to |
//! |------|---------|-----------|
//! | `Char` | any text, trimmed | text (empty when missing) |
//! | `NullBoolean` | `true`/`1`/`2`/`on`, `false`/`0`/`3`/`off` | bool, or null |
//! | `Number` | integer or decimal text | number |
//! | `Date` | `2024-01-31`, `01/31/2024`, `01/31/24` | date |
//! | `DateTime` | `2024-01-31 14:30[:00]`, `2024-01-31T14:30:00`, bare date | datetime |
//! | `Time` | `14:30[:00]` | time |
//! | `Choice` | the display text of a choice value | that choice's value |
//! | `MultipleChoice` | several choice texts | list of values |
//! | `Range` | two parts cleaned by the inner field | range bounds |
//! | `Lookup` | a value part and a lookup name | value + lookup |

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use qfilters_store::{Choice, Lookup, Number, Predicate, Scalar, ValueSource};

use crate::error::{CleanError, Result, ValidationError};
use crate::value::{CleanedValue, RawValue};

// `%Y` also accepts two-digit years, so the short form goes first; a
// four-digit year leaves trailing input under `%y` and falls through.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// The legal values of a choice field.
#[derive(Debug, Clone)]
pub enum ChoiceSet {
    /// A fixed list.
    Static(Vec<Choice>),
    /// Distinct values of `field` in a live collection, restricted by
    /// `restrict`. Read again on every access.
    Dynamic {
        source: Arc<dyn ValueSource>,
        field: String,
        restrict: Predicate,
    },
}

impl ChoiceSet {
    /// Distinct values of `field` in `source`.
    pub fn dynamic(source: Arc<dyn ValueSource>, field: impl Into<String>) -> Self {
        ChoiceSet::Dynamic {
            source,
            field: field.into(),
            restrict: Predicate::Empty,
        }
    }

    /// The current choices. Dynamic sets label each value with its own
    /// display text.
    pub fn choices(&self) -> Result<Vec<Choice>> {
        match self {
            ChoiceSet::Static(choices) => Ok(choices.clone()),
            ChoiceSet::Dynamic {
                source,
                field,
                restrict,
            } => Ok(source
                .distinct_values(field, restrict)?
                .into_iter()
                .map(Choice::plain)
                .collect()),
        }
    }

    /// Number of choices currently available.
    pub fn len(&self) -> Result<usize> {
        match self {
            ChoiceSet::Static(choices) => Ok(choices.len()),
            dynamic => Ok(dynamic.choices()?.len()),
        }
    }

    /// Finds the choice whose value displays as `text`.
    fn find(&self, text: &str) -> Result<Option<Scalar>> {
        Ok(self
            .choices()?
            .into_iter()
            .find(|choice| choice.value.to_string() == text)
            .map(|choice| choice.value))
    }
}

impl From<Vec<Choice>> for ChoiceSet {
    fn from(choices: Vec<Choice>) -> Self {
        ChoiceSet::Static(choices)
    }
}

/// What a form field accepts.
#[derive(Debug, Clone)]
pub enum FieldType {
    Char,
    NullBoolean,
    Number,
    Date,
    DateTime,
    Time,
    Choice(ChoiceSet),
    MultipleChoice(ChoiceSet),
    /// Start and stop, each cleaned by the inner type.
    Range(Box<FieldType>),
    /// A value cleaned by the inner type plus one of the allowed lookups.
    Lookup(Box<FieldType>, Vec<Lookup>),
}

/// A field's validation rules and its initial value.
#[derive(Debug, Clone)]
pub struct FormField {
    field_type: FieldType,
    initial: Option<RawValue>,
}

impl FormField {
    pub fn new(field_type: FieldType) -> Self {
        FormField {
            field_type,
            initial: None,
        }
    }

    /// Sets the value used when the filter set is unbound.
    pub fn with_initial(mut self, initial: impl Into<RawValue>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    pub(crate) fn set_initial(mut self, initial: Option<RawValue>) -> Self {
        self.initial = initial;
        self
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn initial(&self) -> Option<&RawValue> {
        self.initial.as_ref()
    }

    /// Returns `true` for fields submitted as two parts.
    pub fn is_composite(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::Range(_) | FieldType::Lookup(_, _)
        )
    }

    /// The field's current choices, for choice fields.
    pub fn choices(&self) -> Result<Option<Vec<Choice>>> {
        match &self.field_type {
            FieldType::Choice(set) | FieldType::MultipleChoice(set) => set.choices().map(Some),
            _ => Ok(None),
        }
    }

    /// Validates a raw value.
    ///
    /// A missing value cleans like an empty submission. Only failures to
    /// list a field's choices are reported as [`CleanError::Source`].
    pub fn clean(&self, raw: Option<&RawValue>) -> std::result::Result<CleanedValue, CleanError> {
        clean_value(&self.field_type, raw)
    }
}

fn clean_value(
    field_type: &FieldType,
    raw: Option<&RawValue>,
) -> std::result::Result<CleanedValue, CleanError> {
    let text = raw.map(RawValue::as_text).unwrap_or("").trim();
    match field_type {
        FieldType::Char => Ok(CleanedValue::Scalar(Scalar::Text(text.to_string()))),
        FieldType::NullBoolean => Ok(clean_null_boolean(text)),
        FieldType::MultipleChoice(set) => {
            let submitted = raw.map(RawValue::to_list).unwrap_or_default();
            let mut values = Vec::with_capacity(submitted.len());
            for item in submitted.iter().map(|item| item.trim()).filter(|item| !item.is_empty()) {
                match set.find(item)? {
                    Some(value) if values.contains(&value) => {}
                    Some(value) => values.push(value),
                    None => return Err(invalid_choice(item).into()),
                }
            }
            Ok(CleanedValue::List(values))
        }
        FieldType::Range(inner) => {
            let (start, stop) = two_parts(raw);
            let start = clean_part(inner, &start)?;
            let stop = clean_part(inner, &stop)?;
            if start.is_none() && stop.is_none() {
                return Ok(CleanedValue::Null);
            }
            Ok(CleanedValue::Range { start, stop })
        }
        FieldType::Lookup(inner, allowed) => {
            let (value, lookup) = two_parts(raw);
            let value = clean_part(inner, &value)?;
            let lookup = lookup.trim().to_string();
            if !lookup.is_empty() && !allowed.iter().any(|l| l.as_str() == lookup) {
                return Err(invalid_choice(&lookup).into());
            }
            if value.is_none() && lookup.is_empty() {
                return Ok(CleanedValue::Null);
            }
            Ok(CleanedValue::Lookup { value, lookup })
        }
        scalar => clean_scalar(scalar, text),
    }
}

// Single-valued types where empty input means "nothing selected".
fn clean_scalar(
    field_type: &FieldType,
    text: &str,
) -> std::result::Result<CleanedValue, CleanError> {
    if text.is_empty() {
        return Ok(CleanedValue::Null);
    }
    let scalar = match field_type {
        FieldType::Number => clean_number(text)?,
        FieldType::Date => parse_date(text)
            .map(Scalar::Date)
            .ok_or_else(|| ValidationError::new("Enter a valid date."))?,
        FieldType::DateTime => parse_datetime(text)
            .map(Scalar::DateTime)
            .ok_or_else(|| ValidationError::new("Enter a valid date/time."))?,
        FieldType::Time => parse_time(text)
            .map(Scalar::Time)
            .ok_or_else(|| ValidationError::new("Enter a valid time."))?,
        FieldType::Choice(set) => set.find(text)?.ok_or_else(|| invalid_choice(text))?,
        _ => Scalar::Text(text.to_string()),
    };
    Ok(CleanedValue::Scalar(scalar))
}

fn clean_null_boolean(text: &str) -> CleanedValue {
    match text {
        "true" | "True" | "1" | "2" | "on" => CleanedValue::Scalar(Scalar::Bool(true)),
        "false" | "False" | "0" | "3" | "off" => CleanedValue::Scalar(Scalar::Bool(false)),
        _ => CleanedValue::Null,
    }
}

fn clean_number(text: &str) -> std::result::Result<Scalar, CleanError> {
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Scalar::Number(Number::I64(n)));
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Scalar::Number(Number::F64(f))),
        _ => Err(ValidationError::new("Enter a number.").into()),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

fn invalid_choice(value: &str) -> ValidationError {
    ValidationError::new(format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    ))
}

fn two_parts(raw: Option<&RawValue>) -> (String, String) {
    match raw {
        Some(RawValue::List(items)) => {
            let mut parts = items.iter().cloned();
            (
                parts.next().unwrap_or_default(),
                parts.next().unwrap_or_default(),
            )
        }
        Some(RawValue::Text(text)) => (text.clone(), String::new()),
        None => (String::new(), String::new()),
    }
}

// One half of a composite field. Empty parts are absent rather than empty
// text so a blank bound never restricts.
fn clean_part(
    inner: &FieldType,
    part: &str,
) -> std::result::Result<Option<Scalar>, CleanError> {
    if part.trim().is_empty() {
        return Ok(None);
    }
    match clean_value(inner, Some(&RawValue::Text(part.to_string())))? {
        CleanedValue::Scalar(scalar) => Ok(Some(scalar)),
        CleanedValue::Null => Ok(None),
        _ => Err(ValidationError::new("Enter a single value.").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfilters_store::{MemoryStore, Record, Value};

    fn clean(field_type: FieldType, raw: &str) -> std::result::Result<CleanedValue, CleanError> {
        FormField::new(field_type).clean(Some(&RawValue::from(raw)))
    }

    fn scalar(value: impl Into<Scalar>) -> CleanedValue {
        CleanedValue::Scalar(value.into())
    }

    fn error_message(result: std::result::Result<CleanedValue, CleanError>) -> String {
        match result {
            Err(CleanError::Invalid(error)) => error.message().to_string(),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    fn grades() -> ChoiceSet {
        ChoiceSet::Static(vec![
            Choice::new(1i64, "Junior"),
            Choice::new(2i64, "Senior"),
            Choice::new("x", "Other"),
        ])
    }

    #[test]
    fn char_trims_and_defaults_to_empty() {
        assert_eq!(clean(FieldType::Char, "  ann ").unwrap(), scalar("ann"));
        assert_eq!(
            FormField::new(FieldType::Char).clean(None).unwrap(),
            scalar("")
        );
    }

    #[test]
    fn null_boolean() {
        for yes in ["true", "True", "1", "2", "on"] {
            assert_eq!(clean(FieldType::NullBoolean, yes).unwrap(), scalar(true));
        }
        for no in ["false", "False", "0", "3", "off"] {
            assert_eq!(clean(FieldType::NullBoolean, no).unwrap(), scalar(false));
        }
        assert_eq!(
            clean(FieldType::NullBoolean, "maybe").unwrap(),
            CleanedValue::Null
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(clean(FieldType::Number, "42").unwrap(), scalar(42i64));
        assert_eq!(clean(FieldType::Number, "0").unwrap(), scalar(0i64));
        assert_eq!(clean(FieldType::Number, "-1.5").unwrap(), scalar(-1.5f64));
        assert_eq!(clean(FieldType::Number, "").unwrap(), CleanedValue::Null);
        assert_eq!(error_message(clean(FieldType::Number, "abc")), "Enter a number.");
        assert_eq!(error_message(clean(FieldType::Number, "inf")), "Enter a number.");
    }

    #[test]
    fn dates_and_times() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(clean(FieldType::Date, "2024-01-31").unwrap(), scalar(day));
        assert_eq!(clean(FieldType::Date, "01/31/2024").unwrap(), scalar(day));
        assert_eq!(clean(FieldType::Date, "01/31/24").unwrap(), scalar(day));
        assert_eq!(
            clean(FieldType::Date, "12/01/99").unwrap(),
            scalar(NaiveDate::from_ymd_opt(1999, 12, 1).unwrap())
        );
        assert_eq!(
            clean(FieldType::Date, "12/01/0099").unwrap(),
            scalar(NaiveDate::from_ymd_opt(99, 12, 1).unwrap())
        );
        assert_eq!(error_message(clean(FieldType::Date, "31.01.2024")), "Enter a valid date.");

        let at = day.and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(clean(FieldType::DateTime, "2024-01-31 14:30").unwrap(), scalar(at));
        assert_eq!(clean(FieldType::DateTime, "2024-01-31T14:30:00").unwrap(), scalar(at));
        assert_eq!(
            clean(FieldType::DateTime, "2024-01-31").unwrap(),
            scalar(day.and_hms_opt(0, 0, 0).unwrap())
        );

        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(clean(FieldType::Time, "09:05").unwrap(), scalar(time));
        assert_eq!(error_message(clean(FieldType::Time, "9h")), "Enter a valid time.");
    }

    #[test]
    fn choice_returns_typed_value() {
        assert_eq!(clean(FieldType::Choice(grades()), "2").unwrap(), scalar(2i64));
        assert_eq!(clean(FieldType::Choice(grades()), "x").unwrap(), scalar("x"));
        assert_eq!(clean(FieldType::Choice(grades()), "").unwrap(), CleanedValue::Null);
        assert_eq!(
            error_message(clean(FieldType::Choice(grades()), "7")),
            "Select a valid choice. 7 is not one of the available choices."
        );
    }

    #[test]
    fn multiple_choice() {
        let field = FormField::new(FieldType::MultipleChoice(grades()));
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["1", "x"]))).unwrap(),
            CleanedValue::List(vec![Scalar::from(1i64), Scalar::from("x")])
        );
        assert_eq!(
            field.clean(Some(&RawValue::from("2"))).unwrap(),
            CleanedValue::List(vec![Scalar::from(2i64)])
        );
        assert_eq!(field.clean(None).unwrap(), CleanedValue::List(vec![]));
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["2", " 1 ", "2", "1"]))).unwrap(),
            CleanedValue::List(vec![Scalar::from(2i64), Scalar::from(1i64)])
        );
        assert!(matches!(
            field.clean(Some(&RawValue::from(vec!["1", "9"]))),
            Err(CleanError::Invalid(_))
        ));
    }

    #[test]
    fn range_parts() {
        let field = FormField::new(FieldType::Range(Box::new(FieldType::Number)));
        assert!(field.is_composite());
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["2", "5"]))).unwrap(),
            CleanedValue::Range {
                start: Some(Scalar::from(2i64)),
                stop: Some(Scalar::from(5i64)),
            }
        );
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["", "5"]))).unwrap(),
            CleanedValue::Range {
                start: None,
                stop: Some(Scalar::from(5i64)),
            }
        );
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["", " "]))).unwrap(),
            CleanedValue::Null
        );
        assert!(matches!(
            field.clean(Some(&RawValue::from(vec!["a", "5"]))),
            Err(CleanError::Invalid(_))
        ));
    }

    #[test]
    fn lookup_pairs() {
        let field = FormField::new(FieldType::Lookup(
            Box::new(FieldType::Char),
            vec![Lookup::Exact, Lookup::IContains],
        ));
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["ann", "icontains"]))).unwrap(),
            CleanedValue::Lookup {
                value: Some(Scalar::from("ann")),
                lookup: "icontains".to_string(),
            }
        );
        assert_eq!(
            field.clean(Some(&RawValue::from(vec!["ann", ""]))).unwrap(),
            CleanedValue::Lookup {
                value: Some(Scalar::from("ann")),
                lookup: String::new(),
            }
        );
        assert_eq!(field.clean(None).unwrap(), CleanedValue::Null);
        assert!(matches!(
            field.clean(Some(&RawValue::from(vec!["ann", "regex"]))),
            Err(CleanError::Invalid(_))
        ));
    }

    #[derive(Debug)]
    struct Tag(&'static str);

    impl Record for Tag {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "label" => Value::String(self.0),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn dynamic_choices_read_the_source() {
        let source = Arc::new(MemoryStore::new(vec![Tag("red"), Tag("blue"), Tag("red")]));
        let set = ChoiceSet::dynamic(source, "label");
        assert_eq!(set.len().unwrap(), 2);

        let field = FormField::new(FieldType::Choice(set));
        let labels: Vec<_> = field
            .choices()
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(labels, vec!["blue", "red"]);
        assert_eq!(
            field.clean(Some(&RawValue::from("red"))).unwrap(),
            scalar("red")
        );
    }

    #[test]
    fn initial_values() {
        let field = FormField::new(FieldType::Number).with_initial("3");
        assert_eq!(field.initial(), Some(&RawValue::from("3")));
        assert!(FormField::new(FieldType::Char).choices().unwrap().is_none());
    }
}
