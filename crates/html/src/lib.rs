//! Formwork HTML layer
//!
//! Escape helpers for text, attribute and URL contexts, the [`SafeString`]
//! marker for trusted markup, and the [`HtmlNode`] tree with its generic
//! [`HtmlBuilder`]. The form builder in `formwork-helpers` is built on top of
//! this crate.

pub mod builder;
pub mod error;
pub mod escape;
pub mod node;
pub mod safe;

pub use builder::{ContainerScope, HtmlBuilder};
pub use error::{HtmlError, HtmlResult};
pub use escape::{
    AsMarkup, DEFAULT_URL_SCHEMES, EscapeMode, Markup, escape_html, escape_html_attribute,
    escape_html_attribute_hex, escape_url, escape_url_with_schemes, is_absolute_url,
};
pub use node::{AttrValue, Attributes, Element, HtmlNode, VOID_ELEMENTS, render_nodes};
pub use safe::{SafeString, mark_safe, raw};

pub mod prelude {
    pub use crate::attrs;
    pub use crate::{
        AttrValue, Attributes, HtmlBuilder, HtmlNode, SafeString, escape_html,
        escape_html_attribute, escape_html_attribute_hex, escape_url, mark_safe, raw,
    };
}
