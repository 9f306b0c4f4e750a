//! Form builder bound to request params, model values and CSRF state.
//!
//! - [`FormHelper::form_for`] renders a `<form>` with method override and
//!   CSRF hidden fields
//! - [`FormBuilder`] emits inputs, selects, labels and nested field groups
//! - [`FormDefinition`] describes a whole form as JSON

pub mod csrf;
mod builder;
mod definition;
pub mod naming;
mod types;
mod values;

pub use builder::{FormBuilder, FormHelper, InputKind};
pub use csrf::{CsrfTokenProvider, generate_csrf_token};
pub use definition::{ElementDefinition, FieldDefinition, FormDefinition};
pub use types::{
    Accept, CheckBoxOptions, Choice, Choices, ExtensionVerb, Form, LabelContent, SelectOptions,
    TextAreaContent, Verb,
};
pub use values::{Values, array_contains, scalar_matches, value_text};
