//! Form identity and field option types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use formwork_html::{Attributes, SafeString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The HTTP verb a form submits with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verb {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
    /// Any other verb; only obtainable by parsing, which uppercases it.
    Other(ExtensionVerb),
}

/// An uppercase verb outside the common five, such as `PURGE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionVerb(String);

impl ExtensionVerb {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Verb {
    pub fn as_str(&self) -> &str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Other(other) => other.as_str(),
        }
    }

    /// Whether browsers can submit this verb natively.
    pub fn is_native(&self) -> bool {
        matches!(self, Verb::Get | Verb::Post)
    }

    /// Verb written to the `method` attribute of the form element.
    pub fn form_method(&self) -> Verb {
        if self.is_native() {
            self.clone()
        } else {
            Verb::Post
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.is_empty() || !upper.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("invalid HTTP verb: {s:?}"));
        }
        Ok(match upper.as_str() {
            "GET" => Verb::Get,
            "POST" => Verb::Post,
            "PUT" => Verb::Put,
            "PATCH" => Verb::Patch,
            "DELETE" => Verb::Delete,
            _ => Verb::Other(ExtensionVerb(upper)),
        })
    }
}

impl TryFrom<String> for Verb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Verb> for String {
    fn from(verb: Verb) -> Self {
        verb.as_str().to_string()
    }
}

/// A form identity: root name, action, model values and validation state.
///
/// Built once per render and not modified while rendering.
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    action: String,
    verb: Verb,
    values: Value,
    attributes: Attributes,
    errors: BTreeMap<String, Vec<String>>,
}

impl Form {
    /// Create a form named `name` submitting to `action` with `POST`.
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            verb: Verb::Post,
            values: Value::Object(serde_json::Map::new()),
            attributes: Attributes::new(),
            errors: BTreeMap::new(),
        }
    }

    /// Set the HTTP verb.
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    /// Replace all model values. Keys are root names: `{"book": {...}}`.
    pub fn values(mut self, values: Value) -> Self {
        self.values = values;
        self
    }

    /// Add model values under `key`.
    pub fn model(mut self, key: impl Into<String>, value: Value) -> Self {
        if !self.values.is_object() {
            self.values = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.values {
            map.insert(key.into(), value);
        }
        self
    }

    /// Add model values by serializing `model` under `key`.
    pub fn serialize_model<T: Serialize>(
        self,
        key: impl Into<String>,
        model: &T,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(model)?;
        Ok(self.model(key, value))
    }

    /// Set an attribute of the form element.
    pub fn attribute(mut self, name: &str, value: impl Into<formwork_html::AttrValue>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Record a validation message for a field path like `author.name`.
    pub fn error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.entry(field.into()).or_default().push(message.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn get_verb(&self) -> &Verb {
        &self.verb
    }

    pub fn get_values(&self) -> &Value {
        &self.values
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }
}

/// One choice of a select or datalist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Visible text; datalist options may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

/// Ordered choices for `select` and `datalist`.
///
/// Pairs are `(label, value)`; insertion order is rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Choices(Vec<Choice>);

impl Choices {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Choices whose value doubles as their only content.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            values
                .into_iter()
                .map(|value| Choice {
                    label: None,
                    value: value.into(),
                })
                .collect(),
        )
    }

    /// Append a labelled choice.
    pub fn choice(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(Choice {
            label: Some(label.into()),
            value: value.into(),
        });
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Choice> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L, V> FromIterator<(L, V)> for Choices
where
    L: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(label, value)| Choice {
                    label: Some(label.into()),
                    value: value.into(),
                })
                .collect(),
        )
    }
}

impl<L, V, const N: usize> From<[(L, V); N]> for Choices
where
    L: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(L, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<L, V> From<Vec<(L, V)>> for Choices
where
    L: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(L, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

/// Label content: a field name to humanize, or literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelContent {
    /// Humanized field name; `for` points at the field's input.
    Field(String),
    /// Literal text, optionally tied to a field for the `for` attribute.
    Text { text: String, field: Option<String> },
    /// Trusted markup, optionally tied to a field.
    Safe {
        markup: SafeString,
        field: Option<String>,
    },
}

impl LabelContent {
    pub fn field(name: impl Into<String>) -> Self {
        LabelContent::Field(name.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        LabelContent::Text {
            text: text.into(),
            field: None,
        }
    }

    pub fn text_for(text: impl Into<String>, field: impl Into<String>) -> Self {
        LabelContent::Text {
            text: text.into(),
            field: Some(field.into()),
        }
    }

    pub fn safe_for(markup: SafeString, field: impl Into<String>) -> Self {
        LabelContent::Safe {
            markup,
            field: Some(field.into()),
        }
    }
}

impl From<&str> for LabelContent {
    fn from(field: &str) -> Self {
        LabelContent::Field(field.to_string())
    }
}

impl From<SafeString> for LabelContent {
    fn from(markup: SafeString) -> Self {
        LabelContent::Safe {
            markup,
            field: None,
        }
    }
}

/// Checkbox value overrides. `None` uses the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckBoxOptions {
    #[serde(default)]
    pub checked_value: Option<String>,
    #[serde(default)]
    pub unchecked_value: Option<String>,
}

impl CheckBoxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checked_value(mut self, value: impl Into<String>) -> Self {
        self.checked_value = Some(value.into());
        self
    }

    pub fn unchecked_value(mut self, value: impl Into<String>) -> Self {
        self.unchecked_value = Some(value.into());
        self
    }
}

/// Select options that are not HTML attributes of the `select` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    /// Leading option without a value.
    pub prompt: Option<String>,
    /// Explicit selection; takes precedence over the resolved value.
    pub selected: Vec<String>,
    /// Extra attributes applied to every `option`.
    pub option_attributes: Attributes,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn selected(mut self, value: impl Into<String>) -> Self {
        self.selected.push(value.into());
        self
    }

    pub fn option_attributes(mut self, attributes: Attributes) -> Self {
        self.option_attributes = attributes;
        self
    }
}

/// Textarea content source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TextAreaContent {
    /// Use the resolved field value.
    #[default]
    Value,
    /// Use this text.
    Text(String),
}

impl From<&str> for TextAreaContent {
    fn from(text: &str) -> Self {
        TextAreaContent::Text(text.to_string())
    }
}

impl From<String> for TextAreaContent {
    fn from(text: String) -> Self {
        TextAreaContent::Text(text)
    }
}

/// Accepted MIME types of a file field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Accept {
    #[default]
    Any,
    One(String),
    Many(Vec<String>),
}

impl Accept {
    /// Comma-joined `accept` attribute value, if any.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            Accept::Any => None,
            Accept::One(mime) => Some(mime.clone()),
            Accept::Many(mimes) => Some(mimes.join(",")),
        }
    }
}

impl From<&str> for Accept {
    fn from(mime: &str) -> Self {
        Accept::One(mime.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for Accept {
    fn from(mimes: [&str; N]) -> Self {
        Accept::Many(mimes.iter().map(|m| m.to_string()).collect())
    }
}

impl From<Vec<String>> for Accept {
    fn from(mimes: Vec<String>) -> Self {
        Accept::Many(mimes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verb_parsing() {
        assert_eq!("patch".parse::<Verb>().unwrap(), Verb::Patch);
        assert_eq!("GET".parse::<Verb>().unwrap(), Verb::Get);
        let purge = "purge".parse::<Verb>().unwrap();
        assert!(matches!(purge, Verb::Other(_)));
        assert_eq!(purge.as_str(), "PURGE");
        assert_eq!(" get ".parse::<Verb>().unwrap(), Verb::Get);
        assert!("".parse::<Verb>().is_err());
        assert!("PO ST".parse::<Verb>().is_err());
    }

    #[test]
    fn non_native_verbs_submit_as_post() {
        assert_eq!(Verb::Patch.form_method(), Verb::Post);
        assert_eq!(Verb::Get.form_method(), Verb::Get);
        assert!(!Verb::Delete.is_native());

        let purge: Verb = serde_json::from_value(json!("purge")).unwrap();
        assert!(!purge.is_native());
        assert_eq!(purge.form_method(), Verb::Post);
        assert_eq!(serde_json::to_value(&purge).unwrap(), json!("PURGE"));

        let get: Verb = serde_json::from_value(json!("get")).unwrap();
        assert_eq!(get, Verb::Get);
    }

    #[test]
    fn form_builder_style() {
        let form = Form::new("book", "/books")
            .verb(Verb::Put)
            .model("book", json!({"title": "Dune"}))
            .error("title", "is too short");

        assert_eq!(form.name(), "book");
        assert_eq!(form.get_verb(), &Verb::Put);
        assert_eq!(form.get_values()["book"]["title"], json!("Dune"));
        assert_eq!(form.errors()["title"], vec!["is too short".to_string()]);
    }

    #[test]
    fn serialize_model_uses_serde() {
        #[derive(Serialize)]
        struct Book {
            title: String,
        }
        let form = Form::new("book", "/books")
            .serialize_model("book", &Book { title: "Emma".into() })
            .unwrap();
        assert_eq!(form.get_values()["book"]["title"], json!("Emma"));
    }

    #[test]
    fn choices_keep_insertion_order() {
        let choices = Choices::from([("Italy", "it"), ("United States", "us"), ("Austria", "at")]);
        let values: Vec<_> = choices.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["it", "us", "at"]);
    }

    #[test]
    fn accept_normalizes() {
        assert_eq!(Accept::from("text/csv").to_attribute().as_deref(), Some("text/csv"));
        assert_eq!(
            Accept::from(["image/png", "image/jpeg"]).to_attribute().as_deref(),
            Some("image/png,image/jpeg")
        );
        assert_eq!(Accept::Any.to_attribute(), None);
    }

    #[test]
    fn verb_serde_round_trip() {
        let verb: Verb = serde_json::from_value(json!("delete")).unwrap();
        assert_eq!(verb, Verb::Delete);
        assert_eq!(serde_json::to_value(Verb::Patch).unwrap(), json!("PATCH"));
    }
}
