//! Forms described as data.
//!
//! A [`FormDefinition`] is a JSON document naming the form, its action and
//! verb, model values, and a tree of elements tagged by `type`:
//!
//! ```json
//! {
//!   "name": "book",
//!   "action": "/books/1",
//!   "method": "PATCH",
//!   "elements": [
//!     { "type": "label", "field": "title" },
//!     { "type": "text", "field": "title", "attributes": { "required": true } },
//!     { "type": "group", "name": "author", "elements": [
//!       { "type": "text", "field": "name" }
//!     ]},
//!     { "type": "submit", "content": "Save" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use formwork_html::{Attributes, SafeString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::builder::{FormBuilder, FormHelper, InputKind};
use super::types::{
    Accept, CheckBoxOptions, Choices, Form, LabelContent, SelectOptions, TextAreaContent, Verb,
};
use crate::error::HelperResult;

/// A complete form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Root name; prefixes every field name.
    pub name: String,

    pub action: String,

    /// HTTP verb; defaults to `POST`.
    #[serde(default)]
    pub method: Verb,

    /// Model values, keyed like the submitted params (`{"book": {...}}`).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub values: Value,

    /// Extra attributes for the `<form>` element.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    /// Validation messages keyed by dotted field path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub elements: Vec<ElementDefinition>,
}

/// A field bound to a name, with extra attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// One element of a [`FormDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementDefinition {
    Text(FieldDefinition),
    Email(FieldDefinition),
    Url(FieldDefinition),
    Tel(FieldDefinition),
    Search(FieldDefinition),
    Date(FieldDefinition),
    Datetime(FieldDefinition),
    DatetimeLocal(FieldDefinition),
    Time(FieldDefinition),
    Month(FieldDefinition),
    Week(FieldDefinition),
    Number(FieldDefinition),
    Range(FieldDefinition),
    Color(FieldDefinition),
    Password(FieldDefinition),
    Hidden(FieldDefinition),

    CheckBox {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unchecked_value: Option<String>,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    RadioButton {
        field: String,
        value: String,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    Select {
        field: String,
        choices: Choices,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        selected: Vec<String>,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        option_attributes: Attributes,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    TextArea {
        field: String,
        /// Explicit content; the resolved value is used when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    File {
        field: String,
        #[serde(default)]
        accept: Accept,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    Datalist {
        field: String,
        list: String,
        choices: Choices,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    /// A label: `field` alone is humanized; `text` is used verbatim.
    Label {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    Submit {
        content: String,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    Button {
        content: String,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    ImageButton {
        src: String,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    Legend {
        content: String,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
    },

    /// Fields nested under `name`.
    Group {
        name: String,
        elements: Vec<ElementDefinition>,
    },

    /// `elements` repeated for every entry of the array at `name`.
    Collection {
        name: String,
        elements: Vec<ElementDefinition>,
    },

    Fieldset {
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
        elements: Vec<ElementDefinition>,
    },
}

impl FormDefinition {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> HelperResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The [`Form`] this definition describes.
    pub fn to_form(&self) -> Form {
        let mut form = Form::new(self.name.as_str(), self.action.as_str())
            .verb(self.method.clone())
            .values(self.values.clone());
        for (name, value) in self.attributes.iter() {
            form = form.attribute(name, value.clone());
        }
        for (field, messages) in &self.errors {
            for message in messages {
                form = form.error(field.as_str(), message.as_str());
            }
        }
        form
    }

    /// Render the whole form with `helper`.
    pub fn render(&self, helper: &FormHelper<'_>) -> HelperResult<SafeString> {
        debug!(form = %self.name, elements = self.elements.len(), "rendering form definition");
        let form = self.to_form();
        helper.form_for(&form, Attributes::new(), |f| render_elements(f, &self.elements))
    }
}

fn render_elements(f: &mut FormBuilder<'_>, elements: &[ElementDefinition]) -> HelperResult<()> {
    for element in elements {
        element.render(f)?;
    }
    Ok(())
}

impl ElementDefinition {
    /// Emit this element and its children into `f`.
    pub fn render(&self, f: &mut FormBuilder<'_>) -> HelperResult<()> {
        match self {
            ElementDefinition::Text(d) => d.render(f, InputKind::Text),
            ElementDefinition::Email(d) => d.render(f, InputKind::Email),
            ElementDefinition::Url(d) => d.render(f, InputKind::Url),
            ElementDefinition::Tel(d) => d.render(f, InputKind::Tel),
            ElementDefinition::Search(d) => d.render(f, InputKind::Search),
            ElementDefinition::Date(d) => d.render(f, InputKind::Date),
            ElementDefinition::Datetime(d) => d.render(f, InputKind::Datetime),
            ElementDefinition::DatetimeLocal(d) => d.render(f, InputKind::DatetimeLocal),
            ElementDefinition::Time(d) => d.render(f, InputKind::Time),
            ElementDefinition::Month(d) => d.render(f, InputKind::Month),
            ElementDefinition::Week(d) => d.render(f, InputKind::Week),
            ElementDefinition::Number(d) => d.render(f, InputKind::Number),
            ElementDefinition::Range(d) => d.render(f, InputKind::Range),
            ElementDefinition::Color(d) => d.render(f, InputKind::Color),
            ElementDefinition::Password(d) => d.render(f, InputKind::Password),
            ElementDefinition::Hidden(d) => d.render(f, InputKind::Hidden),
            ElementDefinition::CheckBox {
                field,
                checked_value,
                unchecked_value,
                attributes,
            } => {
                let mut options = CheckBoxOptions::new();
                if let Some(value) = checked_value {
                    options = options.checked_value(value.as_str());
                }
                if let Some(value) = unchecked_value {
                    options = options.unchecked_value(value.as_str());
                }
                f.check_box(field, options, attributes.clone())
            }
            ElementDefinition::RadioButton {
                field,
                value,
                attributes,
            } => f.radio_button(field, value, attributes.clone()),
            ElementDefinition::Select {
                field,
                choices,
                prompt,
                selected,
                option_attributes,
                attributes,
            } => {
                let mut options = SelectOptions::new().option_attributes(option_attributes.clone());
                if let Some(prompt) = prompt {
                    options = options.prompt(prompt.as_str());
                }
                for value in selected {
                    options = options.selected(value.as_str());
                }
                f.select(field, choices, options, attributes.clone())
            }
            ElementDefinition::TextArea {
                field,
                content,
                attributes,
            } => {
                let content = content
                    .clone()
                    .map_or(TextAreaContent::Value, TextAreaContent::Text);
                f.text_area(field, content, attributes.clone())
            }
            ElementDefinition::File {
                field,
                accept,
                attributes,
            } => f.file_field(field, accept.clone(), attributes.clone()),
            ElementDefinition::Datalist {
                field,
                list,
                choices,
                attributes,
            } => f.datalist(field, choices, list, attributes.clone()),
            ElementDefinition::Label {
                field,
                text,
                attributes,
            } => {
                let content = match (text, field) {
                    (Some(text), field) => LabelContent::Text {
                        text: text.clone(),
                        field: field.clone(),
                    },
                    (None, Some(field)) => LabelContent::Field(field.clone()),
                    (None, None) => LabelContent::text(""),
                };
                f.label(content, attributes.clone())
            }
            ElementDefinition::Submit {
                content,
                attributes,
            } => f.submit(content, attributes.clone()),
            ElementDefinition::Button {
                content,
                attributes,
            } => f.button(content, attributes.clone()),
            ElementDefinition::ImageButton { src, attributes } => {
                f.image_button(src, attributes.clone())
            }
            ElementDefinition::Legend {
                content,
                attributes,
            } => f.legend(content, attributes.clone()),
            ElementDefinition::Group { name, elements } => {
                f.fields_for(name, |f| render_elements(f, elements))
            }
            ElementDefinition::Collection { name, elements } => {
                f.fields_for_collection(name, |f| render_elements(f, elements))
            }
            ElementDefinition::Fieldset {
                attributes,
                elements,
            } => f.fieldset(attributes.clone(), |f| render_elements(f, elements)),
        }
    }
}

impl FieldDefinition {
    fn render(&self, f: &mut FormBuilder<'_>, kind: InputKind) -> HelperResult<()> {
        f.input_field(kind, &self.field, self.attributes.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::HelpersConfig;

    #[test]
    fn parses_tagged_elements() {
        let definition = FormDefinition::from_json(
            r#"{
                "name": "book",
                "action": "/books",
                "elements": [
                    { "type": "text", "field": "title" },
                    { "type": "datetime_local", "field": "published_at" },
                    { "type": "check_box", "field": "free_shipping", "checked_value": "yes" },
                    { "type": "group", "name": "author", "elements": [] }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(definition.method, Verb::Post);
        assert_eq!(definition.elements.len(), 4);
        assert!(matches!(
            &definition.elements[1],
            ElementDefinition::DatetimeLocal(FieldDefinition { field, .. })
                if field == "published_at"
        ));
    }

    #[test]
    fn unknown_type_is_a_definition_error() {
        let err = FormDefinition::from_json(
            r#"{ "name": "x", "action": "/", "elements": [{ "type": "marquee" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::HelperError::Definition(_)));
    }

    #[test]
    fn renders_nested_groups() {
        let definition = FormDefinition::from_json(
            r#"{
                "name": "delivery",
                "action": "/deliveries",
                "method": "GET",
                "elements": [
                    { "type": "group", "name": "address", "elements": [
                        { "type": "text", "field": "street" }
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let helper = FormHelper::new(HelpersConfig::default());
        let html = definition.render(&helper).unwrap();
        assert_eq!(
            html.as_str(),
            "<form action=\"&#x2F;deliveries\" method=\"GET\" accept-charset=\"utf-8\" id=\"delivery-form\">\n\
             <input type=\"text\" name=\"delivery[address][street]\" id=\"delivery-address-street\" value=\"\">\n\
             </form>"
        );
    }

    #[test]
    fn every_input_type_renders_its_input() {
        let types = [
            ("text", "text"),
            ("email", "email"),
            ("url", "url"),
            ("tel", "tel"),
            ("search", "search"),
            ("date", "date"),
            ("datetime", "datetime"),
            ("datetime_local", "datetime-local"),
            ("time", "time"),
            ("month", "month"),
            ("week", "week"),
            ("number", "number"),
            ("range", "range"),
            ("color", "color"),
            ("password", "password"),
            ("hidden", "hidden"),
        ];
        let helper = FormHelper::new(HelpersConfig::default());

        for (tag, input_type) in types {
            let definition = FormDefinition::from_json(&format!(
                r#"{{ "name": "book", "action": "/books", "method": "GET",
                     "elements": [{{ "type": "{tag}", "field": "f" }}] }}"#
            ))
            .unwrap();
            let html = definition.render(&helper).unwrap();
            assert!(
                html.contains(&format!(
                    "<input type=\"{input_type}\" name=\"book[f]\" id=\"book-f\" value=\"\">"
                )),
                "{tag}: {html}"
            );
        }
    }

    #[test]
    fn text_area_content_defaults_to_value() {
        let definition = FormDefinition::from_json(
            r#"{
                "name": "book",
                "action": "/books",
                "values": { "book": { "summary": "Spice" } },
                "elements": [ { "type": "text_area", "field": "summary" } ]
            }"#,
        )
        .unwrap();

        let helper = FormHelper::new(HelpersConfig::default());
        let html = definition.render(&helper).unwrap();
        assert!(
            html.contains("<textarea name=\"book[summary]\" id=\"book-summary\">\nSpice</textarea>")
        );
    }
}
