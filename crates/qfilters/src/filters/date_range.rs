//! The relative-date preset strategy.
//!
//! A [`DateRangeFilter`] offers a fixed table of presets, each restricting
//! a date field relative to today:
//!
//! | Code | Label | Restriction |
//! |------|-------|-------------|
//! | (empty) | Any Date | none |
//! | 1 | Today | year, month and day equal today's |
//! | 2 | Past 7 days | `today - 7 <= date < today + 1` |
//! | 3 | This month | year and month equal today's |
//! | 4 | This year | year equals today's |
//!
//! Any other code, including ones that are not integers, means Any Date.
//! Today comes from the filter's [`Clock`], so the same input can restrict
//! differently on different days; inject a [`FixedClock`] to pin it.
//!
//! [`FixedClock`]: crate::FixedClock

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use qfilters_store::{Choice, Lookup, Predicate};

use super::{default_label, Filter};
use crate::clock::{Clock, SystemClock};
use crate::error::{FilterError, Result};
use crate::fields::{ChoiceSet, FieldType, FormField};
use crate::value::{scalar_as_integer, CleanedValue, RawValue};

/// Builds a preset's restriction on `field` given today's date.
pub type PresetBuilder = fn(field: &str, today: NaiveDate) -> Result<Predicate>;

/// One entry of the preset table.
#[derive(Debug, Clone, Copy)]
pub struct DatePreset {
    /// Submitted code; `None` for the no-restriction entry.
    pub code: Option<i64>,
    pub label: &'static str,
    build: PresetBuilder,
}

impl DatePreset {
    /// The preset's restriction on `field` for the given day.
    pub fn predicate(&self, field: &str, today: NaiveDate) -> Result<Predicate> {
        (self.build)(field, today)
    }
}

/// The preset table. The first entry applies to unknown codes.
pub static DATE_PRESETS: [DatePreset; 5] = [
    DatePreset {
        code: None,
        label: "Any Date",
        build: any_date,
    },
    DatePreset {
        code: Some(1),
        label: "Today",
        build: same_day,
    },
    DatePreset {
        code: Some(2),
        label: "Past 7 days",
        build: past_week,
    },
    DatePreset {
        code: Some(3),
        label: "This month",
        build: this_month,
    },
    DatePreset {
        code: Some(4),
        label: "This year",
        build: this_year,
    },
];

fn any_date(_field: &str, _today: NaiveDate) -> Result<Predicate> {
    Ok(Predicate::Empty)
}

fn same_day(field: &str, today: NaiveDate) -> Result<Predicate> {
    Ok(year(field, today)? & month(field, today)? & day(field, today)?)
}

fn past_week(field: &str, today: NaiveDate) -> Result<Predicate> {
    let since = today.checked_sub_days(Days::new(7)).unwrap_or(NaiveDate::MIN);
    let until = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
    Ok(Predicate::leaf(field, Lookup::Gte, since)? & Predicate::leaf(field, Lookup::Lt, until)?)
}

fn this_month(field: &str, today: NaiveDate) -> Result<Predicate> {
    Ok(year(field, today)? & month(field, today)?)
}

fn this_year(field: &str, today: NaiveDate) -> Result<Predicate> {
    year(field, today)
}

fn year(field: &str, today: NaiveDate) -> Result<Predicate> {
    Ok(Predicate::leaf(field, Lookup::Year, today.year())?)
}

fn month(field: &str, today: NaiveDate) -> Result<Predicate> {
    Ok(Predicate::leaf(field, Lookup::Month, today.month())?)
}

fn day(field: &str, today: NaiveDate) -> Result<Predicate> {
    Ok(Predicate::leaf(field, Lookup::Day, today.day())?)
}

/// Restricts a date field to a window relative to today.
#[derive(Debug, Clone)]
pub struct DateRangeFilter {
    name: String,
    label: String,
    clock: Arc<dyn Clock>,
    initial: Option<RawValue>,
}

impl DateRangeFilter {
    /// A filter reading today's date from the system clock.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        DateRangeFilter {
            label: default_label(&name),
            name,
            clock: Arc::new(SystemClock),
            initial: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn initial(mut self, initial: impl Into<RawValue>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// The preset a cleaned code selects.
    pub fn preset(code: Option<i64>) -> &'static DatePreset {
        DATE_PRESETS
            .iter()
            .find(|preset| preset.code.is_some() && preset.code == code)
            .unwrap_or(&DATE_PRESETS[0])
    }
}

impl Filter for DateRangeFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn form_field(&self) -> FormField {
        let choices = DATE_PRESETS
            .iter()
            .map(|preset| match preset.code {
                Some(code) => Choice::new(code, preset.label),
                None => Choice::new("", preset.label),
            })
            .collect();
        FormField::new(FieldType::Choice(ChoiceSet::Static(choices)))
            .set_initial(self.initial.clone())
    }

    fn filter(&self, value: &CleanedValue) -> Result<Predicate> {
        let code = match value {
            CleanedValue::Scalar(scalar) => scalar_as_integer(scalar),
            CleanedValue::Null => None,
            _ => return Err(FilterError::unsupported(&self.name, "a preset code")),
        };
        Self::preset(code).predicate(&self.name, self.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use qfilters_store::Scalar;
    use insta::assert_snapshot;

    fn on(y: i32, m: u32, d: u32) -> DateRangeFilter {
        let today = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        DateRangeFilter::new("hired").with_clock(Arc::new(FixedClock(today)))
    }

    fn code(text: &str) -> CleanedValue {
        CleanedValue::Scalar(Scalar::from(text))
    }

    fn int(n: i64) -> CleanedValue {
        CleanedValue::Scalar(Scalar::from(n))
    }

    #[test]
    fn presets_relative_to_today() {
        let filter = on(2024, 3, 5);
        assert_snapshot!(
            filter.filter(&int(1)).unwrap().to_string(),
            @"(hired__year=2024 AND hired__month=3 AND hired__day=5)"
        );
        assert_snapshot!(
            filter.filter(&int(2)).unwrap().to_string(),
            @"(hired__gte=2024-02-27 AND hired__lt=2024-03-06)"
        );
        assert_snapshot!(
            filter.filter(&int(3)).unwrap().to_string(),
            @"(hired__year=2024 AND hired__month=3)"
        );
        assert_snapshot!(
            filter.filter(&int(4)).unwrap().to_string(),
            @"hired__year=2024"
        );
    }

    #[test]
    fn unknown_codes_mean_any_date() {
        let filter = on(2024, 3, 5);
        for value in [
            CleanedValue::Null,
            code(""),
            code("abc"),
            int(0),
            int(9),
            int(-1),
        ] {
            assert!(filter.filter(&value).unwrap().is_empty(), "{:?}", value);
        }
    }

    #[test]
    fn textual_codes_are_read_as_integers() {
        let filter = on(2024, 12, 31);
        assert_eq!(filter.filter(&code("4")).unwrap().to_string(), "hired__year=2024");
    }

    #[test]
    fn past_week_crosses_year_boundaries() {
        let filter = on(2024, 1, 2);
        assert_eq!(
            filter.filter(&int(2)).unwrap().to_string(),
            "(hired__gte=2023-12-26 AND hired__lt=2024-01-03)"
        );
    }

    #[test]
    fn form_field_lists_the_presets() {
        let field = on(2024, 3, 5).form_field();
        let labels: Vec<_> = field
            .choices()
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|c| c.label)
            .collect();
        assert_eq!(
            labels,
            vec!["Any Date", "Today", "Past 7 days", "This month", "This year"]
        );
        assert_eq!(field.clean(Some(&RawValue::from("2"))).unwrap(), int(2));
        assert_eq!(field.clean(Some(&RawValue::from(""))).unwrap(), CleanedValue::Null);
        assert!(field.clean(Some(&RawValue::from("abc"))).is_err());
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(DateRangeFilter::preset(Some(3)).label, "This month");
        assert_eq!(DateRangeFilter::preset(Some(12)).label, "Any Date");
        assert_eq!(DateRangeFilter::preset(None).label, "Any Date");
    }
}
