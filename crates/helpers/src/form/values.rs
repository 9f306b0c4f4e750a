//! Read-only value resolution for form fields.

use serde_json::Value;

/// Resolves current field values from submitted params, falling back to
/// model values.
///
/// Both sources are JSON trees. Object keys are matched by name and numeric
/// path segments index into arrays. `null` counts as missing. Lookups never
/// modify either source.
#[derive(Debug, Clone, Copy)]
pub struct Values<'a> {
    params: &'a Value,
    model: &'a Value,
}

impl<'a> Values<'a> {
    pub fn new(params: &'a Value, model: &'a Value) -> Self {
        Self { params, model }
    }

    /// First non-missing value at `path`: params first, then model values.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&'a Value> {
        lookup(self.params, path).or_else(|| lookup(self.model, path))
    }

    /// Value at `path` in the submitted params only.
    pub fn param<S: AsRef<str>>(&self, path: &[S]) -> Option<&'a Value> {
        lookup(self.params, path)
    }

    pub fn params(&self) -> &'a Value {
        self.params
    }

    pub fn model(&self) -> &'a Value {
        self.model
    }
}

fn lookup<'v, S: AsRef<str>>(root: &'v Value, path: &[S]) -> Option<&'v Value> {
    let mut current = root;
    for key in path {
        let key = key.as_ref();
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() { None } else { Some(current) }
}

/// String form of a resolved value as it appears in markup.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a scalar value string-equals `candidate`. Arrays never match.
pub fn scalar_matches(value: &Value, candidate: &str) -> bool {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => false,
        other => value_text(other) == candidate,
    }
}

/// Whether `value` is an array containing `candidate`.
pub fn array_contains(value: &Value, candidate: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| scalar_matches(item, candidate)),
        _ => false,
    }
}
