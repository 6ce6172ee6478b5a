//! Input binding: where each field's raw value comes from.
//!
//! A bound filter set reads the submitted [`FormData`]. An unbound one
//! reads initial values, falling back to each field's declared initial.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{FilterError, Result};
use crate::fields::FormField;
use crate::value::RawValue;

/// Submitted form data keyed by field name.
///
/// # Example
///
/// ```
/// use qfilters::{FormData, RawValue};
///
/// let data = FormData::from_pairs([("tag", "a"), ("tag", "b"), ("q", "x")]);
/// assert_eq!(data.get("tag"), Some(&RawValue::from(vec!["a", "b"])));
/// assert_eq!(data.get("q"), Some(&RawValue::from("x")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData {
    values: HashMap<String, RawValue>,
}

impl FormData {
    pub fn new() -> Self {
        FormData::default()
    }

    /// Builds form data from key/value pairs. Repeated keys collect their
    /// values into a list, in order.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut data = FormData::new();
        for (key, value) in pairs {
            data.append(key.into(), value.into());
        }
        data
    }

    /// Parses a JSON object into form data.
    ///
    /// Strings stay text, numbers and booleans are stringified, arrays become
    /// lists and nulls are left out. Anything other than an object fails.
    pub fn from_json(input: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(input).map_err(|e| FilterError::InvalidJson(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Converts an already-parsed JSON object into form data.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| FilterError::InvalidJson("expected a JSON object".to_string()))?;

        let mut data = FormData::new();
        for (key, value) in object {
            let raw = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::Array(items) => {
                    RawValue::List(items.iter().filter_map(json_text).collect())
                }
                scalar => match json_text(scalar) {
                    Some(text) => RawValue::Text(text),
                    None => {
                        return Err(FilterError::InvalidJson(format!(
                            "field '{}' must be a string, number, boolean or array",
                            key
                        )))
                    }
                },
            };
            data.values.insert(key.clone(), raw);
        }
        Ok(data)
    }

    /// Sets a field's value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    fn append(&mut self, key: String, value: String) {
        match self.values.remove(&key) {
            None => {
                self.values.insert(key, RawValue::Text(value));
            }
            Some(RawValue::Text(first)) => {
                self.values.insert(key, RawValue::List(vec![first, value]));
            }
            Some(RawValue::List(mut items)) => {
                items.push(value);
                self.values.insert(key, RawValue::List(items));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serializes the data back to a JSON object.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| FilterError::InvalidJson(e.to_string()))
    }

    /// The raw value for a field.
    ///
    /// Composite fields (ranges, lookup pairs) submit two parts. They read
    /// either a list under `name` or the `name_0` / `name_1` keys.
    pub fn value_for(&self, name: &str, composite: bool) -> Option<RawValue> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        if !composite {
            return None;
        }
        let first = self.values.get(&format!("{}_0", name));
        let second = self.values.get(&format!("{}_1", name));
        if first.is_none() && second.is_none() {
            return None;
        }
        let part = |v: Option<&RawValue>| v.map(|r| r.as_text().to_string()).unwrap_or_default();
        Some(RawValue::List(vec![part(first), part(second)]))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData::from_pairs(iter)
    }
}

fn json_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The input a filter set evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputBinding {
    /// Submitted data. Missing keys are empty submissions.
    Bound(FormData),
    /// Initial values only. Missing keys fall back to the field's initial.
    Unbound(FormData),
}

impl InputBinding {
    pub fn bound(data: FormData) -> Self {
        InputBinding::Bound(data)
    }

    /// No submission and no initial overrides.
    pub fn unbound() -> Self {
        InputBinding::Unbound(FormData::new())
    }

    /// No submission, with per-field initial values.
    pub fn with_initial(initial: FormData) -> Self {
        InputBinding::Unbound(initial)
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, InputBinding::Bound(_))
    }

    pub fn data(&self) -> &FormData {
        match self {
            InputBinding::Bound(data) | InputBinding::Unbound(data) => data,
        }
    }

    /// The raw value to clean for `name`.
    pub fn raw_value(&self, name: &str, field: &FormField) -> Option<RawValue> {
        match self {
            InputBinding::Bound(data) => data.value_for(name, field.is_composite()),
            InputBinding::Unbound(initial) => initial
                .value_for(name, field.is_composite())
                .or_else(|| field.initial().cloned()),
        }
    }
}

impl Default for InputBinding {
    fn default() -> Self {
        InputBinding::unbound()
    }
}
