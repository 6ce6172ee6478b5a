//! Filter strategies.
//!
//! A [`Filter`] is the per-field policy turning one cleaned value into a
//! [`Predicate`]. Filters hold configuration only: calling
//! [`filter`](Filter::filter) twice with the same value yields the same
//! predicate (date presets aside, which read their clock).
//!
//! | Strategy | Input | Predicate |
//! |----------|-------|-----------|
//! | [`LookupFilter`] | a value, or a (value, lookup) pair | `name__lookup=value` |
//! | [`BooleanFilter`] | true / false | `name__exact=value` |
//! | [`MultipleChoiceFilter`] | selected values | OR of `name__exact=v` |
//! | [`RangeFilter`] | start / stop | `name__range=(start, stop)` |
//! | [`DateRangeFilter`] | preset code | date window relative to today |
//! | [`AllValuesFilter`] | one value present in the collection | `name__exact=value` |

use std::fmt;

use qfilters_store::Predicate;

use crate::error::Result;
use crate::fields::FormField;
use crate::value::CleanedValue;

mod all_values;
mod boolean;
mod date_range;
mod lookup;
mod multiple;
mod range;

pub use all_values::AllValuesFilter;
pub use boolean::BooleanFilter;
pub use date_range::{DatePreset, DateRangeFilter, PresetBuilder, DATE_PRESETS};
pub use lookup::LookupFilter;
pub use multiple::MultipleChoiceFilter;
pub use range::RangeFilter;

/// A per-field strategy from cleaned input to predicate.
pub trait Filter: Send + Sync + fmt::Debug {
    /// The record field this filter restricts.
    fn name(&self) -> &str;

    /// Display label for the filter's input.
    fn label(&self) -> &str;

    /// The form field that validates this filter's raw input.
    fn form_field(&self) -> FormField;

    /// Builds the restriction for a cleaned value.
    ///
    /// [`Predicate::Empty`] means the value imposes no restriction.
    fn filter(&self, value: &CleanedValue) -> Result<Predicate>;
}

/// The label a filter gets when none is given: its name with `_` as
/// spaces, capitalised.
pub(crate) fn default_label(name: &str) -> String {
    capfirst(&name.replace('_', " "))
}

/// Uppercases the first character, leaving the rest untouched.
pub(crate) fn capfirst(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
