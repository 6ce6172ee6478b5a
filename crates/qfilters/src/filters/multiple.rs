//! The multi-choice OR strategy.

use std::slice;

use qfilters_store::{Choice, Lookup, Predicate, RelationDescriptor, Scalar};
use tracing::trace;

use super::{default_label, Filter};
use crate::error::{FilterError, Result};
use crate::fields::{ChoiceSet, FieldType, FormField};
use crate::value::{CleanedValue, RawValue};

/// Restricts to records matching any of the selected values.
///
/// Selecting every available choice, when there are at least two, imposes
/// nothing. With a single available choice, selecting it still filters.
/// An empty selection imposes nothing.
#[derive(Debug, Clone)]
pub struct MultipleChoiceFilter {
    name: String,
    label: String,
    choices: ChoiceSet,
    initial: Option<RawValue>,
}

impl MultipleChoiceFilter {
    /// Choices from a fixed list.
    pub fn new(name: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self::with_choice_set(name, ChoiceSet::Static(choices))
    }

    /// Choices are the primary keys of the related records allowed by
    /// `limit_choices_to`, read again on every evaluation.
    pub fn model(name: impl Into<String>, relation: &RelationDescriptor) -> Self {
        let choices = ChoiceSet::Dynamic {
            source: relation.target.clone(),
            field: relation.primary_key.clone(),
            restrict: relation.limit_choices_to.clone(),
        };
        Self::with_choice_set(name, choices)
    }

    pub fn with_choice_set(name: impl Into<String>, choices: ChoiceSet) -> Self {
        let name = name.into();
        MultipleChoiceFilter {
            label: default_label(&name),
            name,
            choices,
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

    pub fn choices(&self) -> &ChoiceSet {
        &self.choices
    }
}

impl Filter for MultipleChoiceFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn form_field(&self) -> FormField {
        FormField::new(FieldType::MultipleChoice(self.choices.clone()))
            .set_initial(self.initial.clone())
    }

    fn filter(&self, value: &CleanedValue) -> Result<Predicate> {
        let selected: &[Scalar] = match value {
            CleanedValue::List(items) => items,
            CleanedValue::Scalar(item) => slice::from_ref(item),
            CleanedValue::Null => return Ok(Predicate::Empty),
            _ => return Err(FilterError::unsupported(&self.name, "a list of values")),
        };
        if selected.is_empty() {
            return Ok(Predicate::Empty);
        }

        let mut distinct: Vec<&Scalar> = Vec::with_capacity(selected.len());
        for item in selected {
            if !distinct.contains(&item) {
                distinct.push(item);
            }
        }

        let available = self.choices.len()?;
        if distinct.len() == available && available > 1 {
            trace!(filter = %self.name, available, "every choice selected");
            return Ok(Predicate::Empty);
        }

        let mut any = Predicate::Empty;
        for item in distinct {
            any |= Predicate::leaf(self.name.as_str(), Lookup::Exact, item.clone())?;
        }
        Ok(any)
    }
}
