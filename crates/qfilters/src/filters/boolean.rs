//! The boolean strategy.

use qfilters_store::{Lookup, Predicate, Scalar};

use super::{default_label, Filter};
use crate::error::{FilterError, Result};
use crate::fields::{FieldType, FormField};
use crate::value::{CleanedValue, RawValue};

/// Restricts `name == value` for a tri-state input.
///
/// `false` is a restriction like any other. An unknown value restricts to
/// records where the field is null; the filter set never asks for that,
/// since unknown is not a meaningful selection.
#[derive(Debug, Clone)]
pub struct BooleanFilter {
    name: String,
    label: String,
    initial: Option<RawValue>,
}

impl BooleanFilter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        BooleanFilter {
            label: default_label(&name),
            name,
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

impl Filter for BooleanFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn form_field(&self) -> FormField {
        FormField::new(FieldType::NullBoolean).set_initial(self.initial.clone())
    }

    fn filter(&self, value: &CleanedValue) -> Result<Predicate> {
        let predicate = match value {
            CleanedValue::Scalar(Scalar::Bool(b)) => {
                Predicate::leaf(self.name.as_str(), Lookup::Exact, *b)?
            }
            CleanedValue::Null => Predicate::leaf(self.name.as_str(), Lookup::IsNull, true)?,
            _ => return Err(FilterError::unsupported(&self.name, "a boolean")),
        };
        Ok(predicate)
    }
}
