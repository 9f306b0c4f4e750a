//! HTML layer error types.

use thiserror::Error;

/// Errors raised while building a node tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HtmlError {
    #[error("invalid tag or attribute name: {0:?}")]
    InvalidName(String),

    #[error("no open element to close")]
    Unbalanced,
}

/// Result type alias using HtmlError.
pub type HtmlResult<T> = Result<T, HtmlError>;
