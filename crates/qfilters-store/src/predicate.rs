//! Composable boolean predicates.
//!
//! A [`Predicate`] is either [`Predicate::Empty`] (no restriction, matches
//! every record) or a tree of clauses joined by AND, OR and NOT. Combining
//! with `Empty` is a no-op on both sides, and nested groups of the same kind
//! are flattened, so folding many fragments keeps the tree shallow.
//!
//! ```
//! use qfilters_store::{Lookup, Predicate};
//!
//! let active = Predicate::leaf("active", Lookup::Exact, true)?;
//! let senior = Predicate::leaf("grade", Lookup::Gte, 5i64)?;
//! let junior = Predicate::leaf("grade", Lookup::Lt, 2i64)?;
//!
//! let predicate = Predicate::empty() & active & (senior | junior);
//! assert_eq!(
//!     predicate.to_string(),
//!     "(active__exact=true AND (grade__gte=5 OR grade__lt=2))"
//! );
//! # Ok::<(), qfilters_store::StoreError>(())
//! ```

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use crate::clause::{Clause, ClauseValue};
use crate::error::Result;
use crate::lookup::Lookup;
use crate::record::Record;

/// A boolean condition over record fields.
#[derive(Debug, Clone, Default)]
pub enum Predicate {
    /// No restriction.
    #[default]
    Empty,
    /// A single clause.
    Leaf(Clause),
    /// Every child must match.
    And(Vec<Predicate>),
    /// At least one child must match.
    Or(Vec<Predicate>),
    /// The child must not match.
    Not(Box<Predicate>),
}

impl Predicate {
    /// The predicate that imposes no restriction.
    pub fn empty() -> Self {
        Predicate::Empty
    }

    /// A single `field lookup value` clause.
    pub fn leaf(
        field: impl Into<String>,
        lookup: Lookup,
        value: impl Into<ClauseValue>,
    ) -> Result<Self> {
        Ok(Predicate::Leaf(Clause::new(field, lookup, value)?))
    }

    /// A single clause with the lookup given by name.
    pub fn parse(
        field: impl Into<String>,
        lookup: &str,
        value: impl Into<ClauseValue>,
    ) -> Result<Self> {
        Ok(Predicate::Leaf(Clause::parse(field, lookup, value)?))
    }

    /// Returns `true` if this predicate imposes no restriction.
    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::Empty)
    }

    /// Conjunction. `Empty` on either side yields the other side.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Empty, other) => other,
            (this, Predicate::Empty) => this,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), other) => {
                left.push(other);
                Predicate::And(left)
            }
            (this, Predicate::And(mut right)) => {
                right.insert(0, this);
                Predicate::And(right)
            }
            (this, other) => Predicate::And(vec![this, other]),
        }
    }

    /// Disjunction. `Empty` on either side yields the other side.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Empty, other) => other,
            (this, Predicate::Empty) => this,
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), other) => {
                left.push(other);
                Predicate::Or(left)
            }
            (this, Predicate::Or(mut right)) => {
                right.insert(0, this);
                Predicate::Or(right)
            }
            (this, other) => Predicate::Or(vec![this, other]),
        }
    }

    /// Negation. Negating `Empty` leaves it unrestricted.
    pub fn negate(self) -> Predicate {
        match self {
            Predicate::Empty => Predicate::Empty,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    /// ANDs every predicate in the iterator.
    pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        predicates.into_iter().fold(Predicate::Empty, Predicate::and)
    }

    /// ORs every predicate in the iterator. An empty iterator yields `Empty`.
    pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        predicates.into_iter().fold(Predicate::Empty, Predicate::or)
    }

    /// Number of leaf clauses in the tree.
    pub fn clause_count(&self) -> usize {
        match self {
            Predicate::Empty => 0,
            Predicate::Leaf(_) => 1,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::clause_count).sum()
            }
            Predicate::Not(inner) => inner.clause_count(),
        }
    }

    /// Tests a record against this predicate.
    pub fn matches<R>(&self, record: &R) -> bool
    where
        R: Record + ?Sized,
    {
        match self {
            Predicate::Empty => true,
            Predicate::Leaf(clause) => clause.matches(&record.field_value(clause.field())),
            Predicate::And(children) => children.iter().all(|child| child.matches(record)),
            Predicate::Or(children) => {
                children.is_empty() || children.iter().any(|child| child.matches(record))
            }
            Predicate::Not(inner) => !inner.matches(record),
        }
    }
}

impl From<Clause> for Predicate {
    fn from(clause: Clause) -> Self {
        Predicate::Leaf(clause)
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        self.negate()
    }
}

impl BitAndAssign for Predicate {
    fn bitand_assign(&mut self, rhs: Predicate) {
        *self = std::mem::take(self).and(rhs);
    }
}

impl BitOrAssign for Predicate {
    fn bitor_assign(&mut self, rhs: Predicate) {
        *self = std::mem::take(self).or(rhs);
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Empty => f.write_str("*"),
            Predicate::Leaf(clause) => write!(f, "{}", clause),
            Predicate::And(children) => write_group(f, children, " AND "),
            Predicate::Or(children) => write_group(f, children, " OR "),
            Predicate::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", child)?;
    }
    f.write_str(")")
}
