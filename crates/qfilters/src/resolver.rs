//! Default filters for stored fields.
//!
//! [`FieldSchemaResolver`] maps a [`FieldDescriptor`] to the filter that
//! suits its kind. The mapping is a table from [`FieldKind`] to a
//! [`FilterClass`] plus an optional builder of extra parameters:
//!
//! | Field kinds | Class | Extra parameters |
//! |-------------|-------|------------------|
//! | Char, Text, Slug, Email, FilePath, Url, IpAddress, CommaSeparatedInteger | `Char` | |
//! | Boolean, NullBoolean | `Boolean` | |
//! | Date / DateTime / Time | `Date` / `DateTime` / `Time` | |
//! | Decimal, SmallInteger, Integer, PositiveInteger, PositiveSmallInteger, Float | `Number` | |
//! | ForeignKey, OneToOne | `ModelChoice` | relation, `to_field_name` |
//! | ManyToMany | `ModelMultipleChoice` | relation |
//! | File, Binary | none: the field gets no filter | |
//!
//! A field declaring its own choices gets them as a parameter, and a
//! `Char` field with choices becomes a `Choice` filter. Entries can be
//! replaced per kind with [`FieldSchemaResolver::with_override`].

use std::collections::HashMap;
use std::sync::Arc;

use qfilters_store::{Choice, FieldDescriptor, FieldKind, Lookup, RelationDescriptor, ValueSource};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{FilterError, Result};
use crate::filters::{
    capfirst, default_label, AllValuesFilter, BooleanFilter, DateRangeFilter, Filter, LookupFilter,
    MultipleChoiceFilter, RangeFilter,
};

/// The kinds of filter the resolver can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterClass {
    Char,
    Boolean,
    /// One value from a fixed list; needs `choices`.
    Choice,
    /// Any of several values from a fixed list; needs `choices`.
    MultipleChoice,
    Date,
    DateTime,
    Time,
    Number,
    /// One related record; needs `relation`.
    ModelChoice,
    /// Any of several related records; needs `relation`.
    ModelMultipleChoice,
    Range,
    DateRange,
    /// One of the values present in a collection; needs `source`.
    AllValues,
}

/// Parameters for [`build_filter`]. Each class reads the ones it needs.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    pub label: Option<String>,
    pub choices: Option<Vec<Choice>>,
    pub relation: Option<RelationDescriptor>,
    /// Field of the related records the filter matches on.
    pub to_field_name: Option<String>,
    pub source: Option<Arc<dyn ValueSource>>,
    /// Defaults to [`SystemClock`] for date ranges.
    pub clock: Option<Arc<dyn Clock>>,
    pub lookup: Option<Lookup>,
    pub lookup_choices: Vec<Lookup>,
}

/// Computes a field's extra parameters.
pub type ExtraBuilder = fn(&FieldDescriptor) -> Result<FilterParams>;

/// A table entry: the class to build and how to derive its parameters.
#[derive(Debug, Clone, Copy)]
pub struct FilterDefaults {
    pub class: FilterClass,
    pub extra: Option<ExtraBuilder>,
}

impl FilterDefaults {
    pub fn new(class: FilterClass) -> Self {
        FilterDefaults { class, extra: None }
    }

    pub fn with_extra(mut self, extra: ExtraBuilder) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// The built-in table entry for a field kind.
pub fn default_for(kind: FieldKind) -> Option<FilterDefaults> {
    let defaults = match kind {
        FieldKind::Char
        | FieldKind::Text
        | FieldKind::Slug
        | FieldKind::Email
        | FieldKind::FilePath
        | FieldKind::Url
        | FieldKind::IpAddress
        | FieldKind::CommaSeparatedInteger => FilterDefaults::new(FilterClass::Char),
        FieldKind::Boolean | FieldKind::NullBoolean => FilterDefaults::new(FilterClass::Boolean),
        FieldKind::Date => FilterDefaults::new(FilterClass::Date),
        FieldKind::DateTime => FilterDefaults::new(FilterClass::DateTime),
        FieldKind::Time => FilterDefaults::new(FilterClass::Time),
        FieldKind::Decimal
        | FieldKind::SmallInteger
        | FieldKind::Integer
        | FieldKind::PositiveInteger
        | FieldKind::PositiveSmallInteger
        | FieldKind::Float => FilterDefaults::new(FilterClass::Number),
        FieldKind::ForeignKey | FieldKind::OneToOne => {
            FilterDefaults::new(FilterClass::ModelChoice).with_extra(single_relation)
        }
        FieldKind::ManyToMany => {
            FilterDefaults::new(FilterClass::ModelMultipleChoice).with_extra(multiple_relation)
        }
        FieldKind::File | FieldKind::Binary => return None,
    };
    Some(defaults)
}

fn relation_of(field: &FieldDescriptor) -> Result<RelationDescriptor> {
    field
        .relation
        .clone()
        .ok_or_else(|| FilterError::missing(&field.name, "relation"))
}

fn single_relation(field: &FieldDescriptor) -> Result<FilterParams> {
    let relation = relation_of(field)?;
    Ok(FilterParams {
        to_field_name: Some(relation.field_name.clone()),
        relation: Some(relation),
        ..FilterParams::default()
    })
}

fn multiple_relation(field: &FieldDescriptor) -> Result<FilterParams> {
    Ok(FilterParams {
        relation: Some(relation_of(field)?),
        ..FilterParams::default()
    })
}

/// Maps stored fields to their default filters.
///
/// # Example
///
/// ```
/// use qfilters::{FieldSchemaResolver, FilterClass, FilterDefaults};
/// use qfilters::qfilters_store::{FieldDescriptor, FieldKind};
///
/// let resolver = FieldSchemaResolver::new()
///     .with_override(FieldKind::Date, FilterDefaults::new(FilterClass::DateRange));
///
/// let field = FieldDescriptor::new("hire_date", FieldKind::Date);
/// let filter = resolver.resolve(&field)?.expect("dates are mapped");
/// assert_eq!(filter.label(), "Hire date");
///
/// let blob = FieldDescriptor::new("photo", FieldKind::Binary);
/// assert!(resolver.resolve(&blob)?.is_none());
/// # Ok::<(), qfilters::FilterError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSchemaResolver {
    overrides: HashMap<FieldKind, FilterDefaults>,
}

impl FieldSchemaResolver {
    pub fn new() -> Self {
        FieldSchemaResolver::default()
    }

    /// Replaces the table entry for `kind`.
    pub fn with_override(mut self, kind: FieldKind, defaults: FilterDefaults) -> Self {
        self.overrides.insert(kind, defaults);
        self
    }

    /// The entry used for `kind`, overrides first.
    pub fn defaults_for(&self, kind: FieldKind) -> Option<FilterDefaults> {
        self.overrides
            .get(&kind)
            .copied()
            .or_else(|| default_for(kind))
    }

    /// Builds the default filter for a stored field.
    ///
    /// Returns `Ok(None)` for kinds with no entry. Fails when the field
    /// lacks what its class needs, such as a relation field without
    /// relation metadata.
    pub fn resolve(&self, field: &FieldDescriptor) -> Result<Option<Box<dyn Filter>>> {
        let Some(defaults) = self.defaults_for(field.kind) else {
            debug!(field = %field.name, kind = %field.kind, "no filter for field kind, skipping");
            return Ok(None);
        };

        let mut params = match defaults.extra {
            Some(extra) => extra(field)?,
            None => FilterParams::default(),
        };
        let mut class = defaults.class;
        if field.has_choices() {
            params.choices = field.choices.clone();
            if class == FilterClass::Char {
                class = FilterClass::Choice;
            }
        }
        if params.label.is_none() {
            params.label = Some(capfirst(&field.verbose_name));
        }

        build_filter(&field.name, class, params).map(Some)
    }
}

/// Constructs a filter of `class` on `name`.
///
/// Fails with [`FilterError::MissingParameter`] when `params` lacks what
/// the class needs: `choices` for the choice classes, `relation` for the
/// model classes and `source` for all-values.
pub fn build_filter(
    name: &str,
    class: FilterClass,
    params: FilterParams,
) -> Result<Box<dyn Filter>> {
    let FilterParams {
        label,
        choices,
        relation,
        to_field_name,
        source,
        clock,
        lookup,
        lookup_choices,
    } = params;
    let label = label.unwrap_or_else(|| default_label(name));

    let scalar = |filter: LookupFilter| {
        let filter = filter
            .with_label(label.as_str())
            .lookup_choices(lookup_choices.clone());
        match lookup {
            Some(lookup) => filter.lookup(lookup),
            None => filter,
        }
    };
    let with_choices = |filter: LookupFilter| match &choices {
        Some(choices) => filter.with_choices(choices.clone()),
        None => filter,
    };

    let filter: Box<dyn Filter> = match class {
        FilterClass::Char => Box::new(scalar(with_choices(LookupFilter::char(name)))),
        FilterClass::Number => Box::new(scalar(with_choices(LookupFilter::number(name)))),
        FilterClass::Date => Box::new(scalar(with_choices(LookupFilter::date(name)))),
        FilterClass::DateTime => Box::new(scalar(with_choices(LookupFilter::datetime(name)))),
        FilterClass::Time => Box::new(scalar(with_choices(LookupFilter::time(name)))),
        FilterClass::Choice => {
            let choices = choices
                .clone()
                .ok_or_else(|| FilterError::missing(name, "choices"))?;
            Box::new(scalar(LookupFilter::choice(name, choices)))
        }
        FilterClass::ModelChoice => {
            let relation = relation.ok_or_else(|| FilterError::missing(name, "relation"))?;
            let mut filter = scalar(LookupFilter::model_choice(name, &relation));
            if let Some(field) = to_field_name {
                filter = filter.to_field_name(field);
            }
            Box::new(filter)
        }
        FilterClass::Boolean => Box::new(BooleanFilter::new(name).with_label(label.as_str())),
        FilterClass::MultipleChoice => {
            let choices = choices
                .clone()
                .ok_or_else(|| FilterError::missing(name, "choices"))?;
            Box::new(MultipleChoiceFilter::new(name, choices).with_label(label.as_str()))
        }
        FilterClass::ModelMultipleChoice => {
            let relation = relation.ok_or_else(|| FilterError::missing(name, "relation"))?;
            Box::new(MultipleChoiceFilter::model(name, &relation).with_label(label.as_str()))
        }
        FilterClass::Range => Box::new(RangeFilter::new(name).with_label(label.as_str())),
        FilterClass::DateRange => {
            let clock = clock.unwrap_or_else(|| Arc::new(SystemClock));
            Box::new(
                DateRangeFilter::new(name)
                    .with_clock(clock)
                    .with_label(label.as_str()),
            )
        }
        FilterClass::AllValues => {
            let source = source.ok_or_else(|| FilterError::missing(name, "source"))?;
            Box::new(AllValuesFilter::new(name, source).with_label(label.as_str()))
        }
    };
    Ok(filter)
}
