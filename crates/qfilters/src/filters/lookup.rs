//! The exact/lookup strategy.

use qfilters_store::{Choice, Lookup, Predicate, RelationDescriptor};

use super::{default_label, Filter};
use crate::error::{FilterError, Result};
use crate::fields::{ChoiceSet, FieldType, FormField};
use crate::value::{scalar_is_truthy, CleanedValue, RawValue};

/// Restricts `name <lookup> value`.
///
/// The lookup defaults to `exact`. With [`lookup_choices`] set, the user
/// submits a `(value, lookup)` pair instead and picks one of the allowed
/// lookups; an empty lookup falls back to `exact` and an empty value
/// imposes nothing.
///
/// [`lookup_choices`]: LookupFilter::lookup_choices
#[derive(Debug, Clone)]
pub struct LookupFilter {
    name: String,
    label: String,
    field_type: FieldType,
    lookup: Lookup,
    lookup_choices: Vec<Lookup>,
    initial: Option<RawValue>,
}

impl LookupFilter {
    /// A filter whose input is cleaned by `field_type`.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        LookupFilter {
            label: default_label(&name),
            name,
            field_type,
            lookup: Lookup::Exact,
            lookup_choices: Vec::new(),
            initial: None,
        }
    }

    pub fn char(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Char)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Time)
    }

    /// One value out of a fixed list.
    pub fn choice(name: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self::new(name, FieldType::Choice(ChoiceSet::Static(choices)))
    }

    /// One related record, identified by the relation's referenced field.
    ///
    /// Choices are read from the related collection on every clean,
    /// restricted by the relation's `limit_choices_to`.
    pub fn model_choice(name: impl Into<String>, relation: &RelationDescriptor) -> Self {
        let choices = ChoiceSet::Dynamic {
            source: relation.target.clone(),
            field: relation.field_name.clone(),
            restrict: relation.limit_choices_to.clone(),
        };
        Self::new(name, FieldType::Choice(choices))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the lookup applied to plain values.
    pub fn lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Lets the user pick the lookup from `lookups`.
    pub fn lookup_choices(mut self, lookups: Vec<Lookup>) -> Self {
        self.lookup_choices = lookups;
        self
    }

    /// Restricts input to a fixed list, keeping each choice's typed value.
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.field_type = FieldType::Choice(ChoiceSet::Static(choices));
        self
    }

    /// Matches related records on `field` instead of the relation's
    /// referenced field.
    pub fn to_field_name(mut self, field: impl Into<String>) -> Self {
        if let FieldType::Choice(ChoiceSet::Dynamic { field: target, .. }) = &mut self.field_type {
            *target = field.into();
        }
        self
    }

    pub fn initial(mut self, initial: impl Into<RawValue>) -> Self {
        self.initial = Some(initial.into());
        self
    }

    /// The lookup applied to plain values.
    pub fn lookup_type(&self) -> Lookup {
        self.lookup
    }

    fn leaf(&self, lookup: Lookup, value: &qfilters_store::Scalar) -> Result<Predicate> {
        Ok(Predicate::leaf(self.name.as_str(), lookup, value.clone())?)
    }
}

impl Filter for LookupFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn form_field(&self) -> FormField {
        let field_type = if self.lookup_choices.is_empty() {
            self.field_type.clone()
        } else {
            FieldType::Lookup(Box::new(self.field_type.clone()), self.lookup_choices.clone())
        };
        FormField::new(field_type).set_initial(self.initial.clone())
    }

    fn filter(&self, value: &CleanedValue) -> Result<Predicate> {
        match value {
            CleanedValue::Null => Ok(Predicate::Empty),
            CleanedValue::Lookup { value, lookup } => {
                let lookup = if lookup.is_empty() {
                    Lookup::Exact
                } else {
                    lookup.parse()?
                };
                match value {
                    Some(scalar) if scalar_is_truthy(scalar) => self.leaf(lookup, scalar),
                    _ => Ok(Predicate::Empty),
                }
            }
            CleanedValue::Scalar(scalar) if value.is_meaningful() => {
                self.leaf(self.lookup, scalar)
            }
            CleanedValue::Scalar(_) => Ok(Predicate::Empty),
            CleanedValue::List(items) if self.lookup == Lookup::In => Ok(Predicate::leaf(
                self.name.as_str(),
                Lookup::In,
                items.clone(),
            )?),
            _ => Err(FilterError::unsupported(&self.name, "a single value")),
        }
    }
}
