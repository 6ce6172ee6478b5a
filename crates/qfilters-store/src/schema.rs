//! Stored-field schema.
//!
//! A [`FieldDescriptor`] describes one stored field: its [`FieldKind`], a
//! display name, an optional fixed list of legal values and, for relations,
//! where the related values live.

use std::fmt;
use std::sync::Arc;

use crate::predicate::Predicate;
use crate::store::ValueSource;
use crate::value::Scalar;

/// Declared type of a stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Char,
    Text,
    Slug,
    Email,
    FilePath,
    Url,
    IpAddress,
    CommaSeparatedInteger,
    Boolean,
    NullBoolean,
    Date,
    DateTime,
    Time,
    Decimal,
    SmallInteger,
    Integer,
    PositiveInteger,
    PositiveSmallInteger,
    Float,
    /// Single-valued relation.
    ForeignKey,
    /// Single-valued relation, unique on this side.
    OneToOne,
    /// Multi-valued relation.
    ManyToMany,
    File,
    Binary,
}

impl FieldKind {
    /// Returns `true` for relation kinds.
    pub fn is_relation(self) -> bool {
        matches!(
            self,
            FieldKind::ForeignKey | FieldKind::OneToOne | FieldKind::ManyToMany
        )
    }

    /// Returns the kind name as written in `#[field(...)]`.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Char => "Char",
            FieldKind::Text => "Text",
            FieldKind::Slug => "Slug",
            FieldKind::Email => "Email",
            FieldKind::FilePath => "FilePath",
            FieldKind::Url => "Url",
            FieldKind::IpAddress => "IpAddress",
            FieldKind::CommaSeparatedInteger => "CommaSeparatedInteger",
            FieldKind::Boolean => "Boolean",
            FieldKind::NullBoolean => "NullBoolean",
            FieldKind::Date => "Date",
            FieldKind::DateTime => "DateTime",
            FieldKind::Time => "Time",
            FieldKind::Decimal => "Decimal",
            FieldKind::SmallInteger => "SmallInteger",
            FieldKind::Integer => "Integer",
            FieldKind::PositiveInteger => "PositiveInteger",
            FieldKind::PositiveSmallInteger => "PositiveSmallInteger",
            FieldKind::Float => "Float",
            FieldKind::ForeignKey => "ForeignKey",
            FieldKind::OneToOne => "OneToOne",
            FieldKind::ManyToMany => "ManyToMany",
            FieldKind::File => "File",
            FieldKind::Binary => "Binary",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A legal value and its display label.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: Scalar,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<Scalar>, label: impl Into<String>) -> Self {
        Choice {
            value: value.into(),
            label: label.into(),
        }
    }

    /// A choice labelled with its own display text.
    pub fn plain(value: impl Into<Scalar>) -> Self {
        let value = value.into();
        let label = value.to_string();
        Choice { value, label }
    }
}

/// Where a relation's values come from.
#[derive(Clone)]
pub struct RelationDescriptor {
    /// The related collection.
    pub target: Arc<dyn ValueSource>,
    /// Restriction applied to the related collection when listing choices.
    pub limit_choices_to: Predicate,
    /// Field on the related records that this relation stores.
    pub field_name: String,
    /// Primary-key field of the related records.
    pub primary_key: String,
}

impl RelationDescriptor {
    /// A relation to `target` keyed by its `id` field.
    pub fn new(target: Arc<dyn ValueSource>) -> Self {
        RelationDescriptor {
            target,
            limit_choices_to: Predicate::Empty,
            field_name: "id".to_string(),
            primary_key: "id".to_string(),
        }
    }

    /// Restricts the related records offered as choices.
    pub fn limit_choices_to(mut self, predicate: Predicate) -> Self {
        self.limit_choices_to = predicate;
        self
    }

    /// Points the relation at a non-primary identifying field.
    pub fn to_field(mut self, field: impl Into<String>) -> Self {
        self.field_name = field.into();
        self
    }

    /// Names the related primary key (default `id`).
    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = field.into();
        self
    }
}

impl fmt::Debug for RelationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationDescriptor")
            .field("target", &self.target)
            .field("limit_choices_to", &self.limit_choices_to.to_string())
            .field("field_name", &self.field_name)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}

/// Description of one stored field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub verbose_name: String,
    pub kind: FieldKind,
    pub choices: Option<Vec<Choice>>,
    pub relation: Option<RelationDescriptor>,
}

impl FieldDescriptor {
    /// A descriptor whose verbose name is the field name with `_` as spaces.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        FieldDescriptor {
            verbose_name: name.replace('_', " "),
            name,
            kind,
            choices: None,
            relation: None,
        }
    }

    pub fn verbose_name(mut self, verbose_name: impl Into<String>) -> Self {
        self.verbose_name = verbose_name.into();
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn relation(mut self, relation: RelationDescriptor) -> Self {
        self.relation = Some(relation);
        self
    }

    /// Returns `true` when the field declares a fixed list of legal values.
    pub fn has_choices(&self) -> bool {
        self.choices.as_ref().is_some_and(|c| !c.is_empty())
    }
}
