//! Form builder.
//!
//! [`FormHelper::form_for`] renders a complete `<form>`: method override,
//! CSRF field, then whatever the field block emits. Field groups push a name
//! prefix and fieldsets open a container for the duration of their block;
//! both are restored when the block fails or panics.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use formwork_html::{
    AttrValue, Attributes, Element, HtmlBuilder, HtmlNode, SafeString, escape_url_with_schemes,
    render_nodes,
};
use serde_json::Value;
use tracing::debug;

use super::csrf::CsrfTokenProvider;
use super::naming::{dasherize, humanize, input_id, input_name, split_input_name};
use super::types::{
    Accept, CheckBoxOptions, Choices, Form, LabelContent, SelectOptions, TextAreaContent, Verb,
};
use super::values::{Values, array_contains, scalar_matches, value_text};
use crate::config::HelpersConfig;
use crate::error::HelperResult;

const MULTIPART: &str = "multipart/form-data";

/// The `type` of an `input` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Url,
    Tel,
    Search,
    Date,
    Datetime,
    DatetimeLocal,
    Time,
    Month,
    Week,
    Number,
    Range,
    Color,
    Password,
    Hidden,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Url => "url",
            InputKind::Tel => "tel",
            InputKind::Search => "search",
            InputKind::Date => "date",
            InputKind::Datetime => "datetime",
            InputKind::DatetimeLocal => "datetime-local",
            InputKind::Time => "time",
            InputKind::Month => "month",
            InputKind::Week => "week",
            InputKind::Number => "number",
            InputKind::Range => "range",
            InputKind::Color => "color",
            InputKind::Password => "password",
            InputKind::Hidden => "hidden",
        }
    }
}

/// Request-level context for rendering forms: configuration, submitted
/// params and the CSRF token source.
pub struct FormHelper<'a> {
    config: HelpersConfig,
    params: Value,
    csrf: Option<Box<dyn CsrfTokenProvider + 'a>>,
}

impl<'a> FormHelper<'a> {
    pub fn new(config: HelpersConfig) -> Self {
        Self {
            config,
            params: Value::Object(serde_json::Map::new()),
            csrf: None,
        }
    }

    /// Submitted request params, e.g. `{"book": {"title": "..."}}`.
    pub fn params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Source of the CSRF token for non-`GET` forms.
    pub fn csrf(mut self, provider: impl CsrfTokenProvider + 'a) -> Self {
        self.csrf = Some(Box::new(provider));
        self
    }

    pub fn config(&self) -> &HelpersConfig {
        &self.config
    }

    /// Render `form`, letting `block` emit its fields.
    ///
    /// Caller `attributes` override the computed `action`, `method`,
    /// `accept-charset` and `id`.
    pub fn form_for<F>(
        &self,
        form: &Form,
        attributes: Attributes,
        block: F,
    ) -> HelperResult<SafeString>
    where
        F: FnOnce(&mut FormBuilder<'_>) -> HelperResult<()>,
    {
        let verb = form.get_verb().clone();
        let csrf_token = if verb == Verb::Get {
            None
        } else {
            self.csrf.as_ref().and_then(|provider| provider.csrf_token())
        };
        if verb != Verb::Get && csrf_token.is_none() {
            debug!(form = form.name(), "no CSRF token available; omitting field");
        }

        let values = Values::new(&self.params, form.get_values());
        let mut builder = FormBuilder::new(form.name(), values, &self.config)
            .with_errors(form.errors())
            .with_verb(verb.clone())
            .with_csrf_token(csrf_token);

        builder.hidden_form_fields()?;
        block(&mut builder)?;

        let multipart = builder.multipart;
        let children = builder.html.finish()?;

        let mut form_attributes = Attributes::new()
            .with("action", form.action())
            .with("method", verb.form_method().as_str())
            .with("accept-charset", self.config.accept_charset.as_str())
            .with("id", format!("{}-form", dasherize(form.name())))
            .merge(form.attributes().clone())
            .merge(attributes);
        if multipart && !form_attributes.contains("enctype") {
            debug!(form = form.name(), "file field present; using multipart encoding");
            form_attributes.set("enctype", MULTIPART);
        }
        form_attributes.validate()?;

        let element = Element::new("form", form_attributes).with_children(children);
        Ok(HtmlNode::from(element).to_html())
    }
}

/// Builds the fields of one form.
///
/// Obtained from [`FormHelper::form_for`], or standalone through
/// [`FormBuilder::new`] for rendering fields outside a `<form>`.
pub struct FormBuilder<'a> {
    config: &'a HelpersConfig,
    values: Values<'a>,
    errors: Option<&'a BTreeMap<String, Vec<String>>>,
    html: HtmlBuilder,
    prefix: String,
    verb: Verb,
    csrf_token: Option<String>,
    multipart: bool,
}

impl<'a> FormBuilder<'a> {
    /// A builder whose field names start at `name`.
    pub fn new(name: &str, values: Values<'a>, config: &'a HelpersConfig) -> Self {
        Self {
            config,
            values,
            errors: None,
            html: HtmlBuilder::new(),
            prefix: name.to_string(),
            verb: Verb::Post,
            csrf_token: None,
            multipart: false,
        }
    }

    fn with_errors(mut self, errors: &'a BTreeMap<String, Vec<String>>) -> Self {
        self.errors = Some(errors);
        self
    }

    fn with_verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    /// Current name prefix, e.g. `book[author]`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Whether a file field has been emitted.
    pub fn is_multipart(&self) -> bool {
        self.multipart
    }

    /// Full input name of `field` at the current prefix.
    pub fn input_name(&self, field: &str) -> String {
        input_name(&self.prefix, field)
    }

    /// Input id of `field` at the current prefix.
    pub fn input_id(&self, field: &str) -> String {
        input_id(&self.input_name(field))
    }

    /// Resolved value of `field` at the current prefix.
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        let name = self.input_name(field);
        self.values.get(&split_input_name(&name))
    }

    /// Validation messages for `field` at the current prefix.
    pub fn errors_for(&self, field: &str) -> &'a [String] {
        let Some(errors) = self.errors else {
            return &[];
        };
        let name = self.input_name(field);
        let path = split_input_name(&name);
        let key = path.get(1..).unwrap_or_default().join(".");
        errors.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Finish a standalone builder and serialize its nodes.
    pub fn render(self) -> HelperResult<SafeString> {
        Ok(render_nodes(&self.html.finish()?))
    }

    /// Finish a standalone builder and return its nodes.
    pub fn into_nodes(self) -> HelperResult<Vec<HtmlNode>> {
        Ok(self.html.finish()?)
    }

    fn hidden_form_fields(&mut self) -> HelperResult<()> {
        if !self.verb.is_native() {
            debug!(verb = %self.verb, "rewriting verb to POST with method override");
            let attributes = Attributes::new()
                .with("type", "hidden")
                .with("name", self.config.method_field.as_str())
                .with("value", self.verb.as_str());
            self.html.element("input", attributes)?;
        }

        if let Some(token) = &self.csrf_token {
            let attributes = Attributes::new()
                .with("type", "hidden")
                .with("name", self.config.csrf_field.as_str())
                .with("value", token.as_str());
            self.html.element("input", attributes)?;
        }

        Ok(())
    }

    /// Nest field names under `name` while `block` runs.
    ///
    /// `fields_for("address", ..)` inside `delivery` names its fields
    /// `delivery[address][...]`. The previous prefix is restored on every
    /// exit path.
    pub fn fields_for<F>(&mut self, name: &str, block: F) -> HelperResult<()>
    where
        F: FnOnce(&mut FormBuilder<'a>) -> HelperResult<()>,
    {
        let mut scope = PrefixScope::enter(self, name);
        block(&mut *scope)
    }

    /// Run `block` once per element of the array at `name`, nested under
    /// `name[index]`.
    pub fn fields_for_collection<F>(&mut self, name: &str, mut block: F) -> HelperResult<()>
    where
        F: FnMut(&mut FormBuilder<'a>) -> HelperResult<()>,
    {
        let len = match self.value(name) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        };
        for index in 0..len {
            self.fields_for(&format!("{name}.{index}"), &mut block)?;
        }
        Ok(())
    }

    /// Wrap the fields emitted by `block` in a `<fieldset>`.
    pub fn fieldset<F>(&mut self, attributes: Attributes, block: F) -> HelperResult<()>
    where
        F: FnOnce(&mut FormBuilder<'a>) -> HelperResult<()>,
    {
        let mut scope = ContainerScope::open(self, "fieldset", attributes)?;
        block(&mut *scope)
    }

    /// `<legend>` with escaped text.
    pub fn legend(&mut self, content: &str, attributes: Attributes) -> HelperResult<()> {
        self.html.text_element("legend", attributes, content)?;
        Ok(())
    }

    /// `<label>` for a field.
    ///
    /// A field name is humanized (`free_shipping` → `Free shipping`); text
    /// is used verbatim. `for` points at the field's input id unless the
    /// caller sets it.
    pub fn label(
        &mut self,
        content: impl Into<LabelContent>,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let (field, node) = match content.into() {
            LabelContent::Field(field) => {
                let text = humanize(&field);
                (Some(field), HtmlNode::text(text))
            }
            LabelContent::Text { text, field } => (field, HtmlNode::text(text)),
            LabelContent::Safe { markup, field } => (field, HtmlNode::raw(markup)),
        };

        let mut defaults = Attributes::new();
        if let Some(field) = &field {
            defaults.set("for", self.input_id(field));
        }
        let attributes = defaults.merge(attributes);
        attributes.validate()?;

        self.html
            .push(Element::new("label", attributes).with_children(vec![node]).into());
        Ok(())
    }

    /// `<input>` of `kind` bound to `field`.
    ///
    /// Attributes are `type`, `name`, `id`, `value`, then the caller's, which
    /// win. A missing value renders as `value=""`. Password inputs never echo
    /// the resolved value; URL inputs only echo well-formed absolute URLs,
    /// written unescaped.
    pub fn input_field(
        &mut self,
        kind: InputKind,
        field: &str,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let name = self.input_name(field);
        let value = match kind {
            InputKind::Password => AttrValue::from(""),
            InputKind::Url => self
                .value(field)
                .map(|v| escape_url_with_schemes(v, self.config.url_schemes.as_slice()))
                .unwrap_or_default()
                .into(),
            _ => self.value(field).map(value_text).unwrap_or_default().into(),
        };

        let attributes = Attributes::new()
            .with("type", kind.as_str())
            .with("name", name.as_str())
            .with("id", input_id(&name))
            .with("value", value)
            .merge(attributes);
        self.html.element("input", attributes)?;
        Ok(())
    }

    pub fn text_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Text, field, attributes)
    }

    pub fn email_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Email, field, attributes)
    }

    pub fn url_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Url, field, attributes)
    }

    pub fn tel_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Tel, field, attributes)
    }

    pub fn search_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Search, field, attributes)
    }

    pub fn date_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Date, field, attributes)
    }

    pub fn datetime_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Datetime, field, attributes)
    }

    pub fn datetime_local_field(
        &mut self,
        field: &str,
        attributes: Attributes,
    ) -> HelperResult<()> {
        self.input_field(InputKind::DatetimeLocal, field, attributes)
    }

    pub fn time_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Time, field, attributes)
    }

    pub fn month_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Month, field, attributes)
    }

    pub fn week_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Week, field, attributes)
    }

    pub fn number_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Number, field, attributes)
    }

    pub fn range_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Range, field, attributes)
    }

    pub fn color_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Color, field, attributes)
    }

    pub fn password_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Password, field, attributes)
    }

    pub fn hidden_field(&mut self, field: &str, attributes: Attributes) -> HelperResult<()> {
        self.input_field(InputKind::Hidden, field, attributes)
    }

    /// Checkbox preceded by a hidden field carrying the unchecked value, so
    /// an unchecked box still submits something.
    ///
    /// The box is checked when the resolved value equals the checked value,
    /// is `true`, or is an array containing the checked value.
    pub fn check_box(
        &mut self,
        field: &str,
        options: CheckBoxOptions,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let name = self.input_name(field);
        let checked_value = options
            .checked_value
            .unwrap_or_else(|| self.config.checked_value.clone());
        let unchecked_value = options
            .unchecked_value
            .unwrap_or_else(|| self.config.unchecked_value.clone());

        let mut attributes = Attributes::new()
            .with("type", "checkbox")
            .with("name", name.as_str())
            .with("id", input_id(&name))
            .with("value", checked_value)
            .merge(attributes);

        let hidden_name = attributes.get_text("name").unwrap_or(&name).to_string();
        let hidden = Attributes::new()
            .with("type", "hidden")
            .with("name", hidden_name)
            .with("value", unchecked_value);

        if !attributes.contains("checked") {
            let submitted = attributes.get_text("value").unwrap_or_default();
            if self
                .value(field)
                .is_some_and(|current| check_box_matches(current, submitted))
            {
                attributes.set("checked", true);
            }
        }

        self.html.element("input", hidden)?;
        self.html.element("input", attributes)?;
        Ok(())
    }

    /// Radio button for one option of `field`; checked when the resolved
    /// value equals `value`.
    pub fn radio_button(
        &mut self,
        field: &str,
        value: &str,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let mut attributes = Attributes::new()
            .with("type", "radio")
            .with("name", self.input_name(field))
            .with("value", value)
            .merge(attributes);

        if !attributes.contains("checked")
            && self
                .value(field)
                .is_some_and(|current| scalar_matches(current, value))
        {
            attributes.set("checked", true);
        }

        self.html.element("input", attributes)?;
        Ok(())
    }

    /// `<select>` with one option per choice, in order.
    ///
    /// With a `multiple` attribute the name gets a `[]` suffix and every
    /// matching option is selected; otherwise only the first match is.
    pub fn select(
        &mut self,
        field: &str,
        choices: &Choices,
        options: SelectOptions,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let multiple = attributes.is_set("multiple");
        let mut name = self.input_name(field);
        let id = input_id(&name);
        if multiple {
            name.push_str("[]");
        }

        let attributes = Attributes::new()
            .with("name", name)
            .with("id", id)
            .merge(attributes);
        let current = self.value(field);

        let mut children = Vec::with_capacity(choices.len() + 1);
        if let Some(prompt) = options.prompt {
            children.push(option_node(
                Attributes::new().with("disabled", true),
                Some(prompt),
            ));
        }

        let mut already_selected = false;
        for choice in choices.iter() {
            let mut option = Attributes::new().with("value", choice.value.as_str());
            if (multiple || !already_selected)
                && option_selected(&choice.value, &options.selected, current, multiple)
            {
                already_selected = true;
                option.set("selected", true);
            }
            let option = option.merge(options.option_attributes.clone());
            let content = choice.label.as_ref().unwrap_or(&choice.value);
            children.push(option_node(option, Some(content.clone())));
        }

        attributes.validate()?;
        options.option_attributes.validate()?;
        self.html
            .push(Element::new("select", attributes).with_children(children).into());
        Ok(())
    }

    /// `<textarea>` with either the resolved value or explicit text.
    pub fn text_area(
        &mut self,
        field: &str,
        content: impl Into<TextAreaContent>,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let name = self.input_name(field);
        let text = match content.into() {
            TextAreaContent::Text(text) => text,
            TextAreaContent::Value => self.value(field).map(value_text).unwrap_or_default(),
        };

        let attributes = Attributes::new()
            .with("name", name.as_str())
            .with("id", input_id(&name))
            .merge(attributes);
        self.html.text_element("textarea", attributes, text)?;
        Ok(())
    }

    /// File input. `accept` is comma-joined; a `multiple` attribute appends
    /// `[]` to the name. Marks the form as multipart.
    pub fn file_field(
        &mut self,
        field: &str,
        accept: impl Into<Accept>,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let mut name = self.input_name(field);
        let id = input_id(&name);
        if attributes.is_set("multiple") {
            name.push_str("[]");
        }

        let mut defaults = Attributes::new()
            .with("type", "file")
            .with("name", name)
            .with("id", id);
        if let Some(accept) = accept.into().to_attribute() {
            defaults.set("accept", accept);
        }

        self.html.element("input", defaults.merge(attributes))?;
        self.multipart = true;
        Ok(())
    }

    /// Text input wired to a sibling `<datalist id=list_id>`.
    pub fn datalist(
        &mut self,
        field: &str,
        choices: &Choices,
        list_id: &str,
        attributes: Attributes,
    ) -> HelperResult<()> {
        let input = attributes.with("list", list_id);
        self.text_field(field, input)?;

        let children = choices
            .iter()
            .map(|choice| {
                option_node(
                    Attributes::new().with("value", choice.value.as_str()),
                    choice.label.clone(),
                )
            })
            .collect();
        let list = Attributes::new().with("id", list_id);
        list.validate()?;
        self.html
            .push(Element::new("datalist", list).with_children(children).into());
        Ok(())
    }

    /// `<button type="submit">`.
    pub fn submit(&mut self, content: &str, attributes: Attributes) -> HelperResult<()> {
        let attributes = Attributes::new().with("type", "submit").merge(attributes);
        self.html.text_element("button", attributes, content)?;
        Ok(())
    }

    /// `<button type="button">`.
    pub fn button(&mut self, content: &str, attributes: Attributes) -> HelperResult<()> {
        let attributes = Attributes::new().with("type", "button").merge(attributes);
        self.html.text_element("button", attributes, content)?;
        Ok(())
    }

    /// `<input type="image">`; `src` must be an absolute URL or is emptied.
    pub fn image_button(&mut self, src: &str, attributes: Attributes) -> HelperResult<()> {
        let src = escape_url_with_schemes(src, self.config.url_schemes.as_slice());
        let attributes = Attributes::new()
            .with("type", "image")
            .with("src", src)
            .merge(attributes);
        self.html.element("input", attributes)?;
        Ok(())
    }

    /// Append escaped text between fields.
    pub fn text(&mut self, content: impl Into<String>) {
        self.html.text(content);
    }

    /// Append trusted markup between fields.
    pub fn raw(&mut self, content: SafeString) {
        self.html.raw(content);
    }
}

/// Guard for a pushed name prefix. Dropping it restores the previous prefix.
struct PrefixScope<'s, 'a> {
    builder: &'s mut FormBuilder<'a>,
    restore_len: usize,
}

impl<'s, 'a> PrefixScope<'s, 'a> {
    fn enter(builder: &'s mut FormBuilder<'a>, name: &str) -> Self {
        let restore_len = builder.prefix.len();
        builder.prefix = input_name(&builder.prefix, name);
        Self {
            builder,
            restore_len,
        }
    }
}

impl Drop for PrefixScope<'_, '_> {
    fn drop(&mut self) {
        self.builder.prefix.truncate(self.restore_len);
    }
}

impl<'a> Deref for PrefixScope<'_, 'a> {
    type Target = FormBuilder<'a>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<'a> DerefMut for PrefixScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

/// Guard for an open container. Dropping it closes the container, along
/// with anything the block left open inside it.
struct ContainerScope<'s, 'a> {
    builder: &'s mut FormBuilder<'a>,
    restore_depth: usize,
}

impl<'s, 'a> ContainerScope<'s, 'a> {
    fn open(
        builder: &'s mut FormBuilder<'a>,
        tag: &str,
        attributes: Attributes,
    ) -> HelperResult<Self> {
        let restore_depth = builder.html.depth();
        builder.html.open(tag, attributes)?;
        Ok(Self {
            builder,
            restore_depth,
        })
    }
}

impl Drop for ContainerScope<'_, '_> {
    fn drop(&mut self) {
        // Every frame above `restore_depth` is open, so closing cannot fail.
        let _ = self.builder.html.close_to(self.restore_depth);
    }
}

impl<'a> Deref for ContainerScope<'_, 'a> {
    type Target = FormBuilder<'a>;

    fn deref(&self) -> &Self::Target {
        self.builder
    }
}

impl<'a> DerefMut for ContainerScope<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.builder
    }
}

fn option_node(attributes: Attributes, label: Option<String>) -> HtmlNode {
    let children = label.map(HtmlNode::text).into_iter().collect();
    Element::new("option", attributes).with_children(children).into()
}

fn check_box_matches(current: &Value, checked_value: &str) -> bool {
    matches!(current, Value::Bool(true))
        || scalar_matches(current, checked_value)
        || array_contains(current, checked_value)
}

fn option_selected(
    value: &str,
    selected: &[String],
    current: Option<&Value>,
    multiple: bool,
) -> bool {
    if !selected.is_empty() {
        return selected.iter().any(|s| s == value);
    }
    let Some(current) = current else {
        return false;
    };
    scalar_matches(current, value) || (multiple && array_contains(current, value))
}
