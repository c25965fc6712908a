//! Form state container: values, touched flags and derived errors
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::error::FormError;
use super::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(text) => Cow::Borrowed(text),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }
    /// Numeric reading of the value, parsing text when needed
    pub fn as_number(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(text) => text.trim().parse().ok(),
        }
    }
    /// The value as a JSON number. Whole numbers stay integers, any other
    /// finite reading such as `1.5` or `1e3` becomes a float.
    pub fn as_json_number(&self) -> Option<Number> {
        match self.as_number() {
            Some(n) => Some(n.into()),
            None => self
                .as_text()
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

/// Field name to current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Values(BTreeMap<String, FieldValue>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }
    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.insert(name.to_string(), value.into());
    }
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
    /// Text of a field, empty when absent
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(|v| v.as_text().into_owned()).unwrap_or_default()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
    /// JSON object holding the named fields; absent names are skipped
    pub fn pick(&self, names: &[&str]) -> Map<String, Value> {
        names
            .iter()
            .filter_map(|name| {
                self.get(name)
                    .map(|value| (name.to_string(), field_to_json(value)))
            })
            .collect()
    }
    pub fn to_json(&self) -> Map<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), field_to_json(value)))
            .collect()
    }
}

fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) => Value::String(text.clone()),
        FieldValue::Number(n) => Value::from(*n),
    }
}

/// Read-only view of a form at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub values: Values,
    pub touched: BTreeMap<String, bool>,
    pub errors: BTreeMap<String, String>,
}

impl FormSnapshot {
    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.get(field).copied().unwrap_or(false)
    }
    /// An error is only shown once its field has been touched
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        match self.is_touched(field) {
            true => self.errors.get(field).map(String::as_str),
            false => None,
        }
    }
    pub fn visible_errors(&self) -> BTreeMap<&str, &str> {
        self.errors
            .iter()
            .filter(|(field, _)| self.is_touched(field))
            .map(|(field, message)| (field.as_str(), message.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    values: Values,
    touched: BTreeMap<String, bool>,
    errors: BTreeMap<String, String>,
}

impl FormState {
    /// The initial values fix the set of fields the form accepts.
    pub fn new(schema: Schema, initial: Values) -> Self {
        let touched = initial.iter().map(|(name, _)| (name.to_string(), false)).collect();
        let errors = schema.validate(&initial);

        Self {
            schema,
            values: initial,
            touched,
            errors,
        }
    }

    /// Stores the value, marks the field touched and recomputes errors.
    ///
    /// All errors are recomputed rather than only this field's, so a field
    /// matching against the edited one stays current.
    pub fn set_value(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        if !self.values.contains(field) {
            return Err(FormError::UnknownField(field.to_string()));
        }
        self.values.insert(field, value);
        self.touched.insert(field.to_string(), true);
        self.errors = self.schema.validate(&self.values);

        Ok(())
    }

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            touched: self.touched.clone(),
            errors: self.errors.clone(),
        }
    }

    pub fn touch_all(&mut self) {
        self.touched.values_mut().for_each(|touched| *touched = true);
        self.errors = self.schema.validate(&self.values);
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Submit-time check: touches every field, then hands back either the
    /// validated values or the full error map.
    pub fn validated(&mut self) -> Result<Values, BTreeMap<String, String>> {
        self.touch_all();

        match self.is_valid() {
            true => Ok(self.values.clone()),
            false => Err(self.errors.clone()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
