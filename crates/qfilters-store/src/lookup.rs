//! Lookup operators for query clauses.
//!
//! The [`Lookup`] enum is the closed set of comparisons a clause can apply to
//! a field. Lookups are addressed by their short names (`exact`, `gte`,
//! `range`, ...), the same names used in `field__lookup` notation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Comparison operator for a query clause.
///
/// Operators are grouped by the operands they take:
/// - **Scalar**: `Exact`, `Gt`, `Gte`, `Lt`, `Lte`, and the text lookups
/// - **Text pattern**: `Regex`, `IRegex`
/// - **List**: `In`
/// - **Pair**: `Range` (inclusive on both ends)
/// - **Date part**: `Year`, `Month`, `Day` (numeric operand)
/// - **Bool**: `IsNull`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lookup {
    /// Equal.
    #[default]
    Exact,
    /// Case-insensitive text equality.
    IExact,
    /// Text contains substring.
    Contains,
    /// Case-insensitive substring.
    IContains,
    /// Text starts with prefix.
    StartsWith,
    /// Case-insensitive prefix.
    IStartsWith,
    /// Text ends with suffix.
    EndsWith,
    /// Case-insensitive suffix.
    IEndsWith,
    /// Text matches regular expression.
    Regex,
    /// Text matches regular expression, ignoring case.
    IRegex,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Value is one of the given set.
    In,
    /// Value lies within `[start, stop]`.
    Range,
    /// Year component of a date or datetime.
    Year,
    /// Month component of a date or datetime.
    Month,
    /// Day-of-month component of a date or datetime.
    Day,
    /// Field is (or is not) null.
    IsNull,
}

impl Lookup {
    /// Every lookup, in declaration order.
    pub const ALL: [Lookup; 20] = [
        Lookup::Exact,
        Lookup::IExact,
        Lookup::Contains,
        Lookup::IContains,
        Lookup::StartsWith,
        Lookup::IStartsWith,
        Lookup::EndsWith,
        Lookup::IEndsWith,
        Lookup::Regex,
        Lookup::IRegex,
        Lookup::Gt,
        Lookup::Gte,
        Lookup::Lt,
        Lookup::Lte,
        Lookup::In,
        Lookup::Range,
        Lookup::Year,
        Lookup::Month,
        Lookup::Day,
        Lookup::IsNull,
    ];

    /// Returns `true` for substring/prefix/suffix and case-insensitive
    /// equality lookups, which only apply to text.
    pub fn is_text_match(self) -> bool {
        matches!(
            self,
            Lookup::IExact
                | Lookup::Contains
                | Lookup::IContains
                | Lookup::StartsWith
                | Lookup::IStartsWith
                | Lookup::EndsWith
                | Lookup::IEndsWith
        )
    }

    /// Returns `true` for lookups decided by an ordering comparison.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Lookup::Exact | Lookup::Gt | Lookup::Gte | Lookup::Lt | Lookup::Lte
        )
    }

    /// Returns `true` for the date-part lookups.
    pub fn is_date_part(self) -> bool {
        matches!(self, Lookup::Year | Lookup::Month | Lookup::Day)
    }

    /// Evaluates a comparison given an ordering result.
    ///
    /// Only meaningful for [`is_ordering`](Self::is_ordering) lookups; every
    /// other lookup yields `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Lookup::Exact => ordering == Ordering::Equal,
            Lookup::Gt => ordering == Ordering::Greater,
            Lookup::Gte => ordering != Ordering::Less,
            Lookup::Lt => ordering == Ordering::Less,
            Lookup::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the lookup name.
    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::Exact => "exact",
            Lookup::IExact => "iexact",
            Lookup::Contains => "contains",
            Lookup::IContains => "icontains",
            Lookup::StartsWith => "startswith",
            Lookup::IStartsWith => "istartswith",
            Lookup::EndsWith => "endswith",
            Lookup::IEndsWith => "iendswith",
            Lookup::Regex => "regex",
            Lookup::IRegex => "iregex",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::In => "in",
            Lookup::Range => "range",
            Lookup::Year => "year",
            Lookup::Month => "month",
            Lookup::Day => "day",
            Lookup::IsNull => "isnull",
        }
    }
}

impl FromStr for Lookup {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lookup::ALL
            .iter()
            .copied()
            .find(|lookup| lookup.as_str() == s)
            .ok_or_else(|| StoreError::UnknownLookup(s.to_string()))
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_groups() {
        assert!(Lookup::Contains.is_text_match());
        assert!(Lookup::IExact.is_text_match());
        assert!(!Lookup::Exact.is_text_match());
        assert!(!Lookup::Regex.is_text_match());

        assert!(Lookup::Exact.is_ordering());
        assert!(Lookup::Lte.is_ordering());
        assert!(!Lookup::Range.is_ordering());

        assert!(Lookup::Year.is_date_part());
        assert!(!Lookup::Gte.is_date_part());
    }

    #[test]
    fn lookup_eval_ordering() {
        assert!(Lookup::Exact.eval_ordering(Ordering::Equal));
        assert!(!Lookup::Exact.eval_ordering(Ordering::Less));

        assert!(Lookup::Gt.eval_ordering(Ordering::Greater));
        assert!(!Lookup::Gt.eval_ordering(Ordering::Equal));

        assert!(Lookup::Gte.eval_ordering(Ordering::Equal));
        assert!(Lookup::Gte.eval_ordering(Ordering::Greater));
        assert!(!Lookup::Gte.eval_ordering(Ordering::Less));

        assert!(Lookup::Lt.eval_ordering(Ordering::Less));
        assert!(!Lookup::Lt.eval_ordering(Ordering::Equal));

        assert!(Lookup::Lte.eval_ordering(Ordering::Equal));
        assert!(!Lookup::Lte.eval_ordering(Ordering::Greater));

        // Not an ordering lookup
        assert!(!Lookup::Contains.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn lookup_names_parse_back() {
        for lookup in Lookup::ALL {
            assert_eq!(lookup.as_str().parse::<Lookup>().unwrap(), lookup);
        }
    }

    #[test]
    fn unknown_lookup_is_an_error() {
        let err = "between".parse::<Lookup>().unwrap_err();
        assert!(matches!(err, StoreError::UnknownLookup(name) if name == "between"));
    }

    #[test]
    fn lookup_display() {
        assert_eq!(Lookup::Gte.to_string(), "gte");
        assert_eq!(Lookup::IsNull.to_string(), "isnull");
        assert_eq!(Lookup::default(), Lookup::Exact);
    }
}
