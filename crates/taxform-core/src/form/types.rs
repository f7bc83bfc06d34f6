use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How a field is driven on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Plain text input, value assigned directly
    Text,
    /// Formatted numeric widget, value typed over the current content
    Numeric,
    /// `<select>` element, option picked by value or label
    Dropdown,
    /// Radio button or checkbox that must end up checked
    Choice,
}

/// Configured value of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// Kind to use for a field that only has a value to go on
    pub fn inferred_kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Numeric,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{}", number),
        }
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

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// One field of a section: the site's identifier, what to put there, and how
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormFieldSpec {
    pub id: String,
    pub label: String,
    pub value: FieldValue,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormFieldSpec {
    pub fn text(id: &str, label: &str, value: impl Into<FieldValue>) -> Self {
        Self::new(id, label, value.into(), FieldKind::Text)
    }

    pub fn numeric(id: &str, label: &str, value: impl Into<FieldValue>) -> Self {
        Self::new(id, label, value.into(), FieldKind::Numeric)
    }

    pub fn dropdown(id: &str, label: &str, option: &str) -> Self {
        Self::new(id, label, option.into(), FieldKind::Dropdown)
    }

    /// A radio/checkbox identified by its element id; `label` doubles as the value shown in logs.
    pub fn choice(id: &str, label: &str) -> Self {
        Self::new(id, label, label.into(), FieldKind::Choice)
    }

    /// Field whose kind is decided by its value (string = text, number = numeric)
    pub fn inferred(id: &str, value: FieldValue) -> Self {
        let kind = value.inferred_kind();
        Self::new(id, id, value, kind)
    }

    fn new(id: &str, label: &str, value: FieldValue, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value,
            kind,
            required: true,
        }
    }

    /// Failure to fill this field will not block the section's save
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// CSS selector locating this field on the page
    pub fn selector(&self) -> String {
        match self.kind {
            FieldKind::Choice => format!("#{}", self.id),
            FieldKind::Dropdown => format!("select[data-cage=\"{}\"]", self.id),
            FieldKind::Text | FieldKind::Numeric => format!("input[data-cage=\"{}\"]", self.id),
        }
    }
}

/// Ordered fields of one section; identifiers are unique
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SectionFields(Vec<FormFieldSpec>);

impl SectionFields {
    pub fn new(fields: Vec<FormFieldSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate field identifier '{}'",
                    field.id
                )));
            }
        }
        Ok(Self(fields))
    }

    /// Built-in tables whose identifiers are known to be unique
    pub(crate) fn from_defaults(fields: Vec<FormFieldSpec>) -> Self {
        debug_assert!(Self::new(fields.clone()).is_ok());
        Self(fields)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormFieldSpec> {
        self.0.iter()
    }

    pub fn get(&self, id: &str) -> Option<&FormFieldSpec> {
        self.0.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with `id` set to `value`, appending a new field when `id` is unknown
    pub fn with_value(&self, id: &str, value: FieldValue) -> Self {
        let mut fields = self.0.clone();
        match fields.iter_mut().find(|f| f.id == id) {
            Some(field) => field.value = value,
            None => fields.push(FormFieldSpec::inferred(id, value)),
        }
        Self(fields)
    }
}
