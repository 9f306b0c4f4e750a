//! HTML node tree.
//!
//! Nodes are built by [`HtmlBuilder`](crate::HtmlBuilder) and serialized
//! depth-first. Text is escaped at serialization time; [`SafeString`] content
//! is written verbatim.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HtmlError, HtmlResult};
use crate::escape::{escape_html, escape_html_attribute};
use crate::safe::SafeString;

/// Elements that never have content or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose first newline is swallowed by browsers.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["textarea", "pre"];

/// An attribute value.
///
/// In JSON a flag is a boolean, text is a string and trusted text is
/// `{"safe": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Rendered as `name="name"` when true, omitted when false.
    Flag(bool),
    /// Untrusted text, escaped on output.
    Text(String),
    /// Trusted text, written verbatim.
    Safe(#[serde(with = "tagged_safe")] SafeString),
}

mod tagged_safe {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::safe::SafeString;

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Tagged<T> {
        safe: T,
    }

    pub fn serialize<S: Serializer>(value: &SafeString, serializer: S) -> Result<S::Ok, S::Error> {
        Tagged { safe: value }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SafeString, D::Error> {
        Tagged::<SafeString>::deserialize(deserializer).map(|tagged| tagged.safe)
    }
}

impl AttrValue {
    /// String form used for value comparisons.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Safe(s) => Some(s.as_str()),
            AttrValue::Flag(_) => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, AttrValue::Flag(false))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<SafeString> for AttrValue {
    fn from(value: SafeString) -> Self {
        AttrValue::Safe(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

macro_rules! numeric_attr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    AttrValue::Text(value.to_string())
                }
            }
        )*
    };
}

numeric_attr!(i32, i64, u32, u64, usize, f64);

/// Insertion-ordered attribute list.
///
/// Setting a name that is already present replaces its value in place, so
/// defaults keep their position when a caller overrides them. Serialized as
/// a map in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `name`, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` only if it is not present yet.
    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        if !self.contains(&name) {
            self.0.push((name, value.into()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Text value of `name`, if it has one.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether `name` is present and not `Flag(false)`.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(AttrValue::is_truthy)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.0.iter().position(|(existing, _)| existing == name)?;
        Some(self.0.remove(index).1)
    }

    /// Apply every attribute of `overrides` on top of `self`.
    pub fn merge(mut self, overrides: Attributes) -> Self {
        for (name, value) in overrides.0 {
            self.set(name, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Reject names that would break the markup.
    pub fn validate(&self) -> HtmlResult<()> {
        for (name, _) in &self.0 {
            validate_name(name)?;
        }
        Ok(())
    }

    /// Text values go through [`escape_html_attribute`], so `/` is written
    /// as `&#x2F;` along with the other entities.
    fn write_to(&self, out: &mut String) {
        for (name, value) in &self.0 {
            match value {
                AttrValue::Flag(false) => {}
                AttrValue::Flag(true) => {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(name);
                    out.push('"');
                }
                AttrValue::Text(text) => {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html_attribute(text));
                    out.push('"');
                }
                AttrValue::Safe(safe) => {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(safe);
                    out.push('"');
                }
            }
        }
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Attributes, A::Error> {
                let mut attributes = Attributes::new();
                while let Some((name, value)) = access.next_entry::<String, AttrValue>()? {
                    attributes.set(name, value);
                }
                Ok(attributes)
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Build an [`Attributes`] list from `name => value` pairs.
///
/// ```
/// use formwork_html::attrs;
///
/// let attributes = attrs! { "class" => "wide", "required" => true };
/// assert_eq!(attributes.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
    () => { $crate::Attributes::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut attributes = $crate::Attributes::new();
        $( attributes.set($name, $value); )+
        attributes
    }};
}

/// One HTML element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HtmlNode>,
    #[serde(default)]
    pub void: bool,
}

impl Element {
    /// A content element; void tags such as `input` are detected by name.
    pub fn new(tag: impl Into<String>, attributes: Attributes) -> Self {
        let tag = tag.into();
        let void = VOID_ELEMENTS.contains(&tag.as_str());
        Self {
            tag,
            attributes,
            children: Vec::new(),
            void,
        }
    }

    pub fn with_children(mut self, children: Vec<HtmlNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, node: HtmlNode) {
        self.children.push(node);
    }

    fn is_inline(&self) -> bool {
        self.children
            .iter()
            .all(|child| !matches!(child, HtmlNode::Element(_)))
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        self.attributes.write_to(out);
        out.push('>');

        if self.void {
            return;
        }

        if LEADING_NEWLINE_ELEMENTS.contains(&self.tag.as_str()) {
            out.push('\n');
        }

        if self.is_inline() {
            for child in &self.children {
                child.write_to(out);
            }
        } else {
            out.push('\n');
            write_joined(&self.children, out);
            out.push('\n');
        }

        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum HtmlNode {
    Element(Element),
    Text { content: String },
    Raw { content: SafeString },
}

impl HtmlNode {
    pub fn text(content: impl Into<String>) -> Self {
        HtmlNode::Text {
            content: content.into(),
        }
    }

    pub fn raw(content: SafeString) -> Self {
        HtmlNode::Raw { content }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Serialize this node and its descendants.
    pub fn to_html(&self) -> SafeString {
        let mut out = String::new();
        self.write_to(&mut out);
        SafeString::new(out)
    }

    fn write_to(&self, out: &mut String) {
        match self {
            HtmlNode::Element(element) => element.write_to(out),
            HtmlNode::Text { content } => out.push_str(&escape_html(content)),
            HtmlNode::Raw { content } => out.push_str(content),
        }
    }
}

impl From<Element> for HtmlNode {
    fn from(element: Element) -> Self {
        HtmlNode::Element(element)
    }
}

impl fmt::Display for HtmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

/// Serialize sibling nodes, one per line.
pub fn render_nodes(nodes: &[HtmlNode]) -> SafeString {
    let mut out = String::new();
    write_joined(nodes, &mut out);
    SafeString::new(out)
}

fn write_joined(nodes: &[HtmlNode], out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        node.write_to(out);
    }
}

/// Check a tag or attribute name: an ASCII letter followed by letters,
/// digits, `-`, `_`, `:` or `.`.
pub fn validate_name(name: &str) -> HtmlResult<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
    if valid {
        Ok(())
    } else {
        Err(HtmlError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut attributes = attrs! { "type" => "text", "name" => "q", "value" => "" };
        attributes.set("name", "search");
        let names: Vec<_> = attributes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["type", "name", "value"]);
        assert_eq!(attributes.get_text("name"), Some("search"));
    }

    #[test]
    fn void_element_has_no_closing_tag() {
        let node =
            HtmlNode::from(Element::new("input", attrs! { "type" => "text", "value" => "" }));
        assert_eq!(node.to_html().as_str(), r#"<input type="text" value="">"#);
    }

    #[test]
    fn flags_render_as_name_or_not_at_all() {
        let node = HtmlNode::from(Element::new(
            "input",
            attrs! { "checked" => true, "disabled" => false },
        ));
        assert_eq!(node.to_html().as_str(), r#"<input checked="checked">"#);
    }

    #[test]
    fn text_children_render_inline_and_escaped() {
        let node = HtmlNode::from(
            Element::new("label", attrs! { "for" => "a-b" })
                .with_children(vec![HtmlNode::text("Tom & Jerry")]),
        );
        assert_eq!(node.to_html().as_str(), r#"<label for="a-b">Tom &amp; Jerry</label>"#);
    }

    #[test]
    fn element_children_render_on_separate_lines() {
        let node = HtmlNode::from(Element::new("div", Attributes::new()).with_children(vec![
            Element::new("br", Attributes::new()).into(),
            Element::new("hr", Attributes::new()).into(),
        ]));
        assert_eq!(node.to_html().as_str(), "<div>\n<br>\n<hr>\n</div>");
    }

    #[test]
    fn attribute_values_are_escaped_unless_safe() {
        let node = HtmlNode::from(Element::new(
            "a",
            attrs! { "title" => "\"quoted\"", "data-raw" => SafeString::new("&amp;") },
        ));
        assert_eq!(
            node.to_html().as_str(),
            r#"<a title="&quot;quoted&quot;" data-raw="&amp;"></a>"#
        );
    }

    #[test]
    fn textarea_keeps_leading_newline() {
        let node = HtmlNode::from(
            Element::new("textarea", Attributes::new()).with_children(vec![HtmlNode::text("x")]),
        );
        assert_eq!(node.to_html().as_str(), "<textarea>\nx</textarea>");
    }

    #[test]
    fn validate_name_rejects_markup_breakers() {
        assert!(validate_name("data-id").is_ok());
        assert!(validate_name("xml:lang").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("on\"click").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("1st").is_err());
    }

    #[test]
    fn attributes_keep_map_order_through_json() {
        let attributes: Attributes =
            serde_json::from_str(r#"{"type": "text", "class": "wide", "required": true}"#).unwrap();
        let names: Vec<_> = attributes.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["type", "class", "required"]);
        assert_eq!(attributes.get("required"), Some(&AttrValue::Flag(true)));

        let json = serde_json::to_string(&attributes).unwrap();
        assert_eq!(json, r#"{"type":"text","class":"wide","required":true}"#);
    }

    #[test]
    fn safe_attribute_values_stay_trusted_through_json() {
        let node = HtmlNode::from(Element::new(
            "a",
            attrs! {
                "href" => SafeString::new("https://example.com/?a=1&amp;b=2"),
                "title" => "a/b",
            },
        ));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains(r#""href":{"safe":"https://example.com/?a=1&amp;b=2"}"#));
        assert!(json.contains(r#""title":"a/b""#));

        let back: HtmlNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
        assert_eq!(
            back.to_html().as_str(),
            r#"<a href="https://example.com/?a=1&amp;b=2" title="a&#x2F;b"></a>"#
        );
    }
}
