//! Helper error types.

use formwork_html::HtmlError;
use thiserror::Error;

/// Errors raised while rendering forms.
#[derive(Debug, Error)]
pub enum HelperError {
    #[error("html error: {0}")]
    Html(#[from] HtmlError),

    #[error("invalid form definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// An error raised by caller code inside a field block.
    #[error(transparent)]
    Block(#[from] anyhow::Error),
}

/// Result type alias using HelperError.
pub type HelperResult<T> = Result<T, HelperError>;
