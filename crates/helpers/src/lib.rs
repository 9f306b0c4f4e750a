//! Formwork view helpers
//!
//! HTML form generation on top of `formwork-html`: nested field groups,
//! value resolution from params and model values, method override and CSRF
//! fields.
//!
//! ```
//! use formwork_helpers::form::{Form, FormHelper, Verb};
//! use formwork_helpers::HelpersConfig;
//! use formwork_html::attrs;
//!
//! let helper = FormHelper::new(HelpersConfig::default()).csrf("token");
//! let form = Form::new("book", "/books/1").verb(Verb::Patch);
//! let html = helper
//!     .form_for(&form, attrs! {}, |f| f.text_field("title", attrs! {}))
//!     .unwrap();
//! assert!(html.contains(r#"<input type="hidden" name="_method" value="PATCH">"#));
//! ```

pub mod config;
pub mod error;
pub mod form;

pub use config::HelpersConfig;
pub use error::{HelperError, HelperResult};
pub use formwork_html as html;
