//! The dynamic-choice strategy.

use std::sync::Arc;

use qfilters_store::{Lookup, Predicate, ValueSource};

use super::{default_label, Filter};
use crate::error::{FilterError, Result};
use crate::fields::{ChoiceSet, FieldType, FormField};
use crate::value::{CleanedValue, RawValue};

/// A single-choice filter over the values currently present in a
/// collection.
///
/// The choices are the distinct values of the field in `source`, sorted,
/// each labelled with its own text. They are read again every time the
/// input is cleaned, so they follow the live data.
#[derive(Debug, Clone)]
pub struct AllValuesFilter {
    name: String,
    label: String,
    source: Arc<dyn ValueSource>,
    initial: Option<RawValue>,
}

impl AllValuesFilter {
    pub fn new(name: impl Into<String>, source: Arc<dyn ValueSource>) -> Self {
        let name = name.into();
        AllValuesFilter {
            label: default_label(&name),
            name,
            source,
            initial: None,
        }
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

impl Filter for AllValuesFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn form_field(&self) -> FormField {
        let choices = ChoiceSet::dynamic(self.source.clone(), self.name.as_str());
        FormField::new(FieldType::Choice(choices)).set_initial(self.initial.clone())
    }

    fn filter(&self, value: &CleanedValue) -> Result<Predicate> {
        match value {
            CleanedValue::Scalar(scalar) if value.is_meaningful() => Ok(Predicate::leaf(
                self.name.as_str(),
                Lookup::Exact,
                scalar.clone(),
            )?),
            CleanedValue::Scalar(_) | CleanedValue::Null => Ok(Predicate::Empty),
            _ => Err(FilterError::unsupported(&self.name, "a single value")),
        }
    }
}
