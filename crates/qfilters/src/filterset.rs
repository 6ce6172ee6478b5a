//! Filter set definitions and their per-request evaluation.
//!
//! A [`FilterSetDefinition`] is the ordered list of filters for one record
//! type, built once and shared. Binding it to submitted input and a store
//! gives a [`FilterSet`], which evaluates lazily and at most once:
//!
//! 1. Each filter's raw input is read from the binding and cleaned by the
//!    filter's form field. A field that fails validation is recorded in
//!    [`FilterSet::field_errors`] and contributes nothing.
//! 2. Values that are not meaningful (empty text, empty selections,
//!    nothing chosen) are skipped. `false` and zero are meaningful.
//! 3. Every other value is handed to its filter, and the non-empty
//!    predicates are ANDed together.
//! 4. The store returns the distinct matching records in the
//!    definition's default order.
//!
//! Only store errors and misconfigured filters abort an evaluation; bad
//! user input never does.

use std::fmt;

use once_cell::unsync::OnceCell;
use qfilters_store::{FieldDescriptor, FieldKind, Model, OrderBy, Predicate, Query, RecordStore};
use tracing::{debug, trace};

use crate::binding::InputBinding;
use crate::error::{CleanError, FieldError, FilterError, Result};
use crate::filters::Filter;
use crate::resolver::{FieldSchemaResolver, FilterDefaults};

/// The filters of a filter set, in declaration order.
///
/// Read-only once built, and shareable across threads and requests.
///
/// # Example
///
/// ```
/// use qfilters::{FilterSetDefinition, LookupFilter};
/// use qfilters::qfilters_store::{FieldDescriptor, FieldKind, Lookup};
///
/// let definition = FilterSetDefinition::builder()
///     .model_fields(vec![
///         FieldDescriptor::new("name", FieldKind::Char),
///         FieldDescriptor::new("active", FieldKind::Boolean),
///     ])
///     .filter(Box::new(LookupFilter::char("name").lookup(Lookup::IContains)))
///     .order_by("-name")
///     .build()?;
///
/// assert_eq!(definition.names().collect::<Vec<_>>(), vec!["name", "active"]);
/// # Ok::<(), qfilters::FilterError>(())
/// ```
#[derive(Debug)]
pub struct FilterSetDefinition {
    filters: Vec<Box<dyn Filter>>,
    ordering: Vec<OrderBy>,
}

impl FilterSetDefinition {
    pub fn builder() -> FilterSetBuilder {
        FilterSetBuilder::default()
    }

    pub fn filters(&self) -> &[Box<dyn Filter>] {
        &self.filters
    }

    /// The filter for `name`, if declared.
    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .iter()
            .find(|filter| filter.name() == name)
            .map(|filter| filter.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|filter| filter.name())
    }

    /// Default ordering of evaluation results.
    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Starts an evaluation of this definition over `store`.
    pub fn bind<'s, S>(&self, binding: InputBinding, store: &'s S) -> FilterSet<'_, 's, S>
    where
        S: RecordStore,
        S::Record: 's,
    {
        FilterSet {
            definition: self,
            binding,
            store,
            evaluation: OnceCell::new(),
        }
    }
}

/// Builds a [`FilterSetDefinition`].
///
/// Filters come from two places: model fields, resolved through a
/// [`FieldSchemaResolver`], and explicit declarations. A declared filter
/// replaces the resolved filter of the same name in place; otherwise it is
/// appended.
#[derive(Debug, Default)]
pub struct FilterSetBuilder {
    resolver: FieldSchemaResolver,
    model_fields: Vec<FieldDescriptor>,
    only: Option<Vec<String>>,
    declared: Vec<Box<dyn Filter>>,
    ordering: Vec<OrderBy>,
}

impl FilterSetBuilder {
    /// Uses `resolver` for model fields.
    pub fn resolver(mut self, resolver: FieldSchemaResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the resolver's table entry for `kind`.
    pub fn override_kind(mut self, kind: FieldKind, defaults: FilterDefaults) -> Self {
        self.resolver = self.resolver.with_override(kind, defaults);
        self
    }

    /// Adds the stored fields of `M`.
    pub fn fields<M: Model>(self) -> Self {
        self.model_fields(M::fields())
    }

    /// Adds stored fields to resolve.
    pub fn model_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.model_fields.extend(fields);
        self
    }

    /// Limits resolution to the named fields, in the given order.
    ///
    /// A name that is neither a model field nor a declared filter fails
    /// the build with [`FilterError::UnknownField`].
    pub fn only<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declares a filter explicitly.
    pub fn filter(mut self, filter: Box<dyn Filter>) -> Self {
        self.declared.push(filter);
        self
    }

    /// Appends a default ordering; a leading `-` sorts descending.
    pub fn order_by(mut self, field: &str) -> Self {
        self.ordering.push(OrderBy::parse(field));
        self
    }

    /// Resolves the model fields and assembles the definition.
    ///
    /// Fails on unknown field names and on filters missing a required
    /// parameter. Fields of unmapped kinds are left out.
    pub fn build(self) -> Result<FilterSetDefinition> {
        let FilterSetBuilder {
            resolver,
            model_fields,
            only,
            declared,
            ordering,
        } = self;

        let selected: Vec<&FieldDescriptor> = match &only {
            None => model_fields.iter().collect(),
            Some(names) => {
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    match model_fields.iter().find(|field| &field.name == name) {
                        Some(field) => selected.push(field),
                        None if declared.iter().any(|f| f.name() == name.as_str()) => {}
                        None => return Err(FilterError::UnknownField(name.clone())),
                    }
                }
                selected
            }
        };

        let mut filters = Vec::with_capacity(selected.len() + declared.len());
        for field in selected {
            if let Some(filter) = resolver.resolve(field)? {
                filters.push(filter);
            }
        }
        for filter in declared {
            match filters.iter().position(|f| f.name() == filter.name()) {
                Some(index) => filters[index] = filter,
                None => filters.push(filter),
            }
        }

        Ok(FilterSetDefinition { filters, ordering })
    }
}

struct Evaluation<'s, R> {
    predicate: Predicate,
    errors: Vec<FieldError>,
    records: Vec<&'s R>,
}

/// One evaluation of a definition against an input binding and a store.
///
/// Nothing runs until the first call to [`result`](Self::result),
/// [`predicate`](Self::predicate) or [`field_errors`](Self::field_errors).
/// That call evaluates and caches; later calls return the cached values
/// without touching the store again. A failed evaluation is not cached.
///
/// # Example
///
/// ```
/// use qfilters::{BooleanFilter, FilterSetDefinition, FormData, InputBinding};
/// use qfilters::qfilters_store::{MemoryStore, Record, Value};
///
/// #[derive(Debug)]
/// struct Task {
///     title: &'static str,
///     done: bool,
/// }
///
/// impl Record for Task {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "title" => Value::String(self.title),
///             "done" => Value::Bool(self.done),
///             _ => Value::None,
///         }
///     }
/// }
///
/// let store = MemoryStore::new(vec![
///     Task { title: "write", done: true },
///     Task { title: "review", done: false },
/// ]);
/// let definition = FilterSetDefinition::builder()
///     .filter(Box::new(BooleanFilter::new("done")))
///     .build()?;
///
/// let binding = InputBinding::bound(FormData::new().with("done", "false"));
/// let filterset = definition.bind(binding, &store);
/// let titles: Vec<_> = filterset.result()?.iter().map(|t| t.title).collect();
/// assert_eq!(titles, vec!["review"]);
/// # Ok::<(), qfilters::FilterError>(())
/// ```
pub struct FilterSet<'d, 's, S>
where
    S: RecordStore,
    S::Record: 's,
{
    definition: &'d FilterSetDefinition,
    binding: InputBinding,
    store: &'s S,
    evaluation: OnceCell<Evaluation<'s, S::Record>>,
}

impl<'d, 's, S> FilterSet<'d, 's, S>
where
    S: RecordStore,
    S::Record: 's,
{
    /// The distinct matching records, in the definition's default order.
    pub fn result(&self) -> Result<&[&'s S::Record]> {
        Ok(&self.evaluation()?.records)
    }

    /// The combined predicate the result was fetched with.
    pub fn predicate(&self) -> Result<&Predicate> {
        Ok(&self.evaluation()?.predicate)
    }

    /// Validation failures, one per field that was ignored because of them.
    pub fn field_errors(&self) -> Result<&[FieldError]> {
        Ok(&self.evaluation()?.errors)
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    /// Returns `true` once a successful evaluation has been cached.
    pub fn is_evaluated(&self) -> bool {
        self.evaluation.get().is_some()
    }

    pub fn definition(&self) -> &'d FilterSetDefinition {
        self.definition
    }

    pub fn binding(&self) -> &InputBinding {
        &self.binding
    }

    fn evaluation(&self) -> Result<&Evaluation<'s, S::Record>> {
        self.evaluation.get_or_try_init(|| self.evaluate())
    }

    fn evaluate(&self) -> Result<Evaluation<'s, S::Record>> {
        let mut predicate = Predicate::Empty;
        let mut errors = Vec::new();
        let mut active = 0usize;

        for filter in self.definition.filters() {
            let name = filter.name();
            let field = filter.form_field();
            let raw = self.binding.raw_value(name, &field);

            let value = match field.clean(raw.as_ref()) {
                Ok(value) => value,
                Err(CleanError::Invalid(error)) => {
                    debug!(field = name, %error, "ignoring invalid filter input");
                    errors.push(FieldError::new(name, error));
                    continue;
                }
                Err(CleanError::Source(err)) => return Err(err),
            };
            if !value.is_meaningful() {
                continue;
            }

            let fragment = filter.filter(&value)?;
            if fragment.is_empty() {
                continue;
            }
            trace!(field = name, predicate = %fragment, "filter applied");
            active += 1;
            predicate &= fragment;
        }

        let query = Query::all()
            .filter(predicate.clone())
            .distinct()
            .order_by_all(self.definition.ordering().iter().cloned());
        let store: &'s S = self.store;
        let records = store.fetch(&query)?;

        debug!(
            active,
            errors = errors.len(),
            results = records.len(),
            "filter set evaluated"
        );
        Ok(Evaluation {
            predicate,
            errors,
            records,
        })
    }
}

impl<'d, 's, S> fmt::Debug for FilterSet<'d, 's, S>
where
    S: RecordStore,
    S::Record: 's,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("filters", &self.definition.names().collect::<Vec<_>>())
            .field("binding", &self.binding)
            .field("evaluated", &self.is_evaluated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::FormData;
    use crate::filters::{BooleanFilter, LookupFilter, RangeFilter};
    use crate::resolver::FilterClass;
    use qfilters_store::{Lookup, MemoryStore, Record, ToValue, Value};

    #[derive(Debug)]
    struct Item {
        name: &'static str,
        qty: i64,
        ok: bool,
    }

    impl Record for Item {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "name" => Value::String(self.name),
                "qty" => self.qty.to_value(),
                "ok" => Value::Bool(self.ok),
                _ => Value::None,
            }
        }
    }

    fn store() -> MemoryStore<Item> {
        MemoryStore::new(vec![
            Item { name: "bolt", qty: 0, ok: true },
            Item { name: "nut", qty: 5, ok: false },
            Item { name: "gear", qty: 12, ok: true },
        ])
    }

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("name", FieldKind::Char),
            FieldDescriptor::new("qty", FieldKind::Integer),
            FieldDescriptor::new("ok", FieldKind::Boolean),
            FieldDescriptor::new("photo", FieldKind::Binary),
        ]
    }

    fn names(records: &[&Item]) -> Vec<&'static str> {
        records.iter().map(|item| item.name).collect()
    }

    #[test]
    fn resolves_model_fields_in_order() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .build()
            .unwrap();
        assert_eq!(definition.names().collect::<Vec<_>>(), vec!["name", "qty", "ok"]);
        assert_eq!(definition.len(), 3);
        assert!(definition.get("photo").is_none());
    }

    #[test]
    fn declared_filters_replace_in_place() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .filter(Box::new(RangeFilter::new("qty")))
            .filter(Box::new(LookupFilter::char("extra")))
            .build()
            .unwrap();
        assert_eq!(
            definition.names().collect::<Vec<_>>(),
            vec!["name", "qty", "ok", "extra"]
        );
        let qty = definition.get("qty").unwrap();
        assert!(qty.form_field().is_composite());
    }

    #[test]
    fn only_selects_a_subset() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .only(["ok", "name"])
            .build()
            .unwrap();
        assert_eq!(definition.names().collect::<Vec<_>>(), vec!["ok", "name"]);

        let unknown = FilterSetDefinition::builder()
            .model_fields(fields())
            .only(["nope"])
            .build();
        assert!(matches!(unknown, Err(FilterError::UnknownField(name)) if name == "nope"));

        let declared = FilterSetDefinition::builder()
            .model_fields(fields())
            .only(["search"])
            .filter(Box::new(LookupFilter::char("search")))
            .build()
            .unwrap();
        assert_eq!(declared.names().collect::<Vec<_>>(), vec!["search"]);
    }

    #[test]
    fn kind_overrides_apply() {
        let definition = FilterSetDefinition::builder()
            .override_kind(FieldKind::Integer, FilterDefaults::new(FilterClass::Range))
            .model_fields(fields())
            .build()
            .unwrap();
        assert!(definition.get("qty").unwrap().form_field().is_composite());
    }

    #[test]
    fn unbound_without_initial_returns_everything() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .build()
            .unwrap();
        let store = store();
        let filterset = definition.bind(InputBinding::unbound(), &store);
        assert!(!filterset.is_bound());
        assert!(!filterset.is_evaluated());
        assert_eq!(filterset.result().unwrap().len(), 3);
        assert!(filterset.predicate().unwrap().is_empty());
        assert!(filterset.is_evaluated());
    }

    #[test]
    fn zero_and_false_restrict() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .build()
            .unwrap();
        let store = store();

        let zero = InputBinding::bound(FormData::new().with("qty", "0"));
        let filterset = definition.bind(zero, &store);
        assert_eq!(names(filterset.result().unwrap()), vec!["bolt"]);

        let no = InputBinding::bound(FormData::new().with("ok", "false"));
        let filterset = definition.bind(no, &store);
        assert_eq!(names(filterset.result().unwrap()), vec!["nut"]);
    }

    #[test]
    fn invalid_fields_are_recorded_and_ignored() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .build()
            .unwrap();
        let store = store();
        let binding = InputBinding::bound(FormData::new().with("qty", "lots").with("ok", "true"));
        let filterset = definition.bind(binding, &store);
        assert_eq!(names(filterset.result().unwrap()), vec!["bolt", "gear"]);

        let errors = filterset.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "qty: Enter a number.");
    }

    #[test]
    fn default_ordering_applies() {
        let definition = FilterSetDefinition::builder()
            .filter(Box::new(BooleanFilter::new("ok")))
            .order_by("-qty")
            .build()
            .unwrap();
        let store = store();
        let filterset = definition.bind(InputBinding::unbound(), &store);
        assert_eq!(
            names(filterset.result().unwrap()),
            vec!["gear", "nut", "bolt"]
        );
    }

    #[test]
    fn initial_values_apply_when_unbound() {
        let definition = FilterSetDefinition::builder()
            .filter(Box::new(BooleanFilter::new("ok").initial("true")))
            .filter(Box::new(LookupFilter::number("qty").lookup(Lookup::Gt)))
            .build()
            .unwrap();
        let store = store();

        let defaults = definition.bind(InputBinding::unbound(), &store);
        assert_eq!(names(defaults.result().unwrap()), vec!["bolt", "gear"]);

        let initial = InputBinding::with_initial(FormData::new().with("qty", "1"));
        let filterset = definition.bind(initial, &store);
        assert_eq!(names(filterset.result().unwrap()), vec!["gear"]);

        // A bound form ignores initial values.
        let bound = definition.bind(InputBinding::bound(FormData::new()), &store);
        assert_eq!(bound.result().unwrap().len(), 3);
    }

    #[test]
    fn misconfigured_filters_abort() {
        let definition = FilterSetDefinition::builder()
            .filter(Box::new(LookupFilter::number("qty").lookup(Lookup::Contains)))
            .build()
            .unwrap();
        let store = store();
        let binding = InputBinding::bound(FormData::new().with("qty", "5"));
        let filterset = definition.bind(binding, &store);
        assert!(matches!(filterset.result(), Err(FilterError::Store(_))));
        assert!(!filterset.is_evaluated());
    }

    #[test]
    fn definitions_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FilterSetDefinition>();
    }

    #[test]
    fn debug_lists_filters() {
        let definition = FilterSetDefinition::builder()
            .model_fields(fields())
            .build()
            .unwrap();
        let store = store();
        let filterset = definition.bind(InputBinding::unbound(), &store);
        let debug = format!("{:?}", filterset);
        assert!(debug.contains(r#"["name", "qty", "ok"]"#));
        assert!(debug.contains("evaluated: false"));
    }
}
