use crate::flow::challenge::{ErrorDetail, NON_FIELD_ERRORS};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The JSON object a stage submits back to the executor.
///
/// Stages build it field by field; nothing is added behind their back, so
/// the body on the wire is exactly what the stage defined.
pub type Submission = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Password,
    Number,
    Checkbox,
    Choice,
    Hidden,
    Static,
}

/// One input of a rendered stage
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub initial: Option<String>,
    pub placeholder: Option<String>,
    pub choices: Vec<String>,
    pub errors: Vec<String>,
}

impl Field {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            initial: None,
            placeholder: None,
            choices: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn initial(mut self, value: impl Into<String>) -> Self {
        self.initial = Some(value.into());
        self
    }

    #[must_use]
    pub fn placeholder(mut self, value: impl Into<String>) -> Self {
        self.placeholder = Some(value.into());
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }
}

/// What a stage presents: a headless form the host renders any way it likes
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub component: String,
    pub title: Option<String>,
    pub info: Vec<String>,
    pub fields: Vec<Field>,
    pub non_field_errors: Vec<String>,
}

impl Form {
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn push_info(&mut self, line: impl Into<String>) {
        self.info.push(line.into());
    }

    /// Attach server-side validation errors to their fields.
    ///
    /// The reserved `non_field_errors` key and errors for fields the form
    /// does not carry land at form level.
    pub fn attach_errors(&mut self, errors: &HashMap<String, Vec<ErrorDetail>>) {
        for (key, details) in errors {
            if key == NON_FIELD_ERRORS {
                self.non_field_errors
                    .extend(details.iter().map(|detail| detail.string.clone()));
                continue;
            }

            match self.fields.iter_mut().find(|field| field.key == *key) {
                Some(field) => field
                    .errors
                    .extend(details.iter().map(|detail| detail.string.clone())),
                None => self
                    .non_field_errors
                    .extend(details.iter().map(|detail| format!("{key}: {}", detail.string))),
            }
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.non_field_errors.is_empty() || self.fields.iter().any(|field| !field.errors.is_empty())
    }
}

/// Answers collected for the active stage, keyed by field
#[derive(Debug, Clone, Default)]
pub struct Answers {
    values: Map<String, Value>,
}

impl Answers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
