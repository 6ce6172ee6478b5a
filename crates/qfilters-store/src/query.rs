//! Query builder and executor.
//!
//! A [`Query`] pairs a [`Predicate`] with result shaping: distinct, ordering,
//! offset and limit. It is what a [`RecordStore`](crate::RecordStore)
//! receives.

use std::collections::HashSet;

use crate::ordering::{compare_records, Dir, OrderBy};
use crate::predicate::Predicate;
use crate::record::Record;

/// A query for filtering and ordering collections.
///
/// # Example
///
/// ```
/// use qfilters_store::{Dir, Lookup, Predicate, Query};
///
/// let query = Query::all()
///     .filter(Predicate::leaf("active", Lookup::Exact, true)?)
///     .exclude(Predicate::leaf("grade", Lookup::Lt, 2i64)?)
///     .distinct()
///     .order_by("name", Dir::Asc)
///     .limit(20);
/// assert_eq!(
///     query.predicate().to_string(),
///     "(active__exact=true AND NOT grade__lt=2)"
/// );
/// # Ok::<(), qfilters_store::StoreError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    predicate: Predicate,
    distinct: bool,
    orderings: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    /// A query matching every record.
    pub fn all() -> Self {
        Query::default()
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Narrows the query: the predicate is ANDed with the current one.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate &= predicate;
        self
    }

    /// Narrows the query to records that do not match the predicate.
    pub fn exclude(mut self, predicate: Predicate) -> Self {
        self.predicate &= predicate.negate();
        self
    }

    /// Removes duplicate records from the result, keeping the first.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds an ordering clause.
    pub fn order_by(mut self, field: &str, dir: Dir) -> Self {
        self.orderings.push(OrderBy::new(field, dir));
        self
    }

    /// Appends several ordering clauses.
    pub fn order_by_all(mut self, orderings: impl IntoIterator<Item = OrderBy>) -> Self {
        self.orderings.extend(orderings);
        self
    }

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of results to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests if a single record matches this query's predicate.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.predicate.matches(record)
    }

    /// Runs the query over a slice, returning references to matching records.
    ///
    /// Matching records are deduplicated (when distinct), sorted by the
    /// ordering clauses, then offset and limit are applied.
    pub fn execute<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        let matching = records.iter().filter(|record| self.matches(*record));
        self.shape(matching)
    }

    /// Applies distinct, ordering, offset and limit to already-filtered
    /// records.
    pub fn shape<'a, R, I>(&self, records: I) -> Vec<&'a R>
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut results: Vec<&'a R> = if self.distinct {
            let mut seen = HashSet::new();
            records
                .into_iter()
                .filter(|record| seen.insert(*record as *const R))
                .collect()
        } else {
            records.into_iter().collect()
        };

        if !self.orderings.is_empty() {
            // Stable sort keeps store order among equal keys
            results.sort_by(|a, b| compare_records(*a, *b, &self.orderings));
        }

        let offset = self.offset.unwrap_or(0);
        if offset > 0 {
            if offset >= results.len() {
                return Vec::new();
            }
            results.drain(..offset);
        }

        if let Some(limit) = self.limit {
            results.truncate(limit);
        }

        results
    }

    /// Counts the number of matching records.
    pub fn count<R: Record>(&self, records: &[R]) -> usize {
        records.iter().filter(|record| self.matches(*record)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::Lookup;
    use crate::value::{Number, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct Task {
        name: String,
        priority: i64,
        archived: bool,
    }

    impl Record for Task {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "name" => Value::String(&self.name),
                "priority" => Value::Number(Number::I64(self.priority)),
                "archived" => Value::Bool(self.archived),
                _ => Value::None,
            }
        }
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task {
                name: "Write docs".into(),
                priority: 3,
                archived: false,
            },
            Task {
                name: "Fix bug".into(),
                priority: 5,
                archived: false,
            },
            Task {
                name: "Old task".into(),
                priority: 1,
                archived: true,
            },
            Task {
                name: "Review".into(),
                priority: 3,
                archived: false,
            },
        ]
    }

    fn names(results: &[&Task]) -> Vec<String> {
        results.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn empty_query_matches_all() {
        let tasks = tasks();
        assert_eq!(Query::all().execute(&tasks).len(), tasks.len());
    }

    #[test]
    fn filter_and_exclude() {
        let tasks = tasks();
        let query = Query::all()
            .filter(Predicate::leaf("priority", Lookup::Gte, 3i64).unwrap())
            .exclude(Predicate::leaf("name", Lookup::StartsWith, "Fix").unwrap());
        assert_eq!(names(&query.execute(&tasks)), vec!["Write docs", "Review"]);
        assert_eq!(query.count(&tasks), 2);
    }

    #[test]
    fn ordering_is_stable() {
        let tasks = tasks();
        let query = Query::all().order_by("priority", Dir::Desc);
        assert_eq!(
            names(&query.execute(&tasks)),
            vec!["Fix bug", "Write docs", "Review", "Old task"]
        );
    }

    #[test]
    fn multiple_orderings() {
        let tasks = tasks();
        let query = Query::all()
            .order_by("priority", Dir::Asc)
            .order_by("name", Dir::Asc);
        assert_eq!(
            names(&query.execute(&tasks)),
            vec!["Old task", "Review", "Write docs", "Fix bug"]
        );
    }

    #[test]
    fn offset_and_limit() {
        let tasks = tasks();
        let query = Query::all().offset(1).limit(2);
        assert_eq!(names(&query.execute(&tasks)), vec!["Fix bug", "Old task"]);
        assert!(Query::all().offset(10).execute(&tasks).is_empty());
    }

    #[test]
    fn distinct_drops_repeated_records() {
        let tasks = tasks();
        let doubled = tasks.iter().chain(tasks.iter().take(2));
        assert_eq!(Query::all().shape(doubled.clone()).len(), 6);
        assert_eq!(Query::all().distinct().shape(doubled).len(), 4);
    }

    #[test]
    fn introspection() {
        let query = Query::all().distinct().limit(5).offset(2).order_by("name", Dir::Asc);
        assert!(query.is_distinct());
        assert!(query.predicate().is_empty());
        assert_eq!(query.get_limit(), Some(5));
        assert_eq!(query.get_offset(), Some(2));
        assert_eq!(query.orderings(), &[OrderBy::asc("name")]);
    }
}
