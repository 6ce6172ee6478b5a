//! The range strategy.

use qfilters_store::{Lookup, Predicate, Scalar};

use super::{default_label, Filter};
use crate::error::{FilterError, Result};
use crate::fields::{FieldType, FormField};
use crate::value::{CleanedValue, RawValue};

/// Restricts `name` to the inclusive range `[start, stop]`.
///
/// Bounds are cleaned by an inner field type, numbers unless set with
/// [`bounds`](RangeFilter::bounds). With only one bound given the range is
/// open on the other side; with neither it imposes nothing. Zero is a
/// bound like any other.
#[derive(Debug, Clone)]
pub struct RangeFilter {
    name: String,
    label: String,
    bounds: FieldType,
    initial: Option<RawValue>,
}

impl RangeFilter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        RangeFilter {
            label: default_label(&name),
            name,
            bounds: FieldType::Number,
            initial: None,
        }
    }

    /// Sets the field type that cleans each bound.
    pub fn bounds(mut self, bounds: FieldType) -> Self {
        self.bounds = bounds;
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
}

impl Filter for RangeFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn form_field(&self) -> FormField {
        FormField::new(FieldType::Range(Box::new(self.bounds.clone())))
            .set_initial(self.initial.clone())
    }

    fn filter(&self, value: &CleanedValue) -> Result<Predicate> {
        let (start, stop) = match value {
            CleanedValue::Range { start, stop } => (bound(start), bound(stop)),
            CleanedValue::Null => return Ok(Predicate::Empty),
            _ => return Err(FilterError::unsupported(&self.name, "a (start, stop) range")),
        };
        let name = self.name.as_str();
        let predicate = match (start, stop) {
            (Some(start), Some(stop)) => {
                Predicate::leaf(name, Lookup::Range, (start.clone(), stop.clone()))?
            }
            (Some(start), None) => Predicate::leaf(name, Lookup::Gte, start.clone())?,
            (None, Some(stop)) => Predicate::leaf(name, Lookup::Lte, stop.clone())?,
            (None, None) => Predicate::Empty,
        };
        Ok(predicate)
    }
}

// Empty text counts as a missing bound.
fn bound(value: &Option<Scalar>) -> Option<&Scalar> {
    value
        .as_ref()
        .filter(|scalar| !matches!(scalar, Scalar::Text(text) if text.is_empty()))
}
