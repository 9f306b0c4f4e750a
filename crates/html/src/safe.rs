//! Trusted markup marker.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// A string that is already escaped or deliberately trusted.
///
/// The escape helpers return their input unchanged when it is a `SafeString`,
/// and the node serializer writes it verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeString(String);

impl SafeString {
    /// Wrap a string without escaping it.
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// An empty safe string.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append already-trusted markup.
    pub fn push_safe(&mut self, other: &SafeString) {
        self.0.push_str(&other.0);
    }
}

impl Deref for SafeString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SafeString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SafeString> for String {
    fn from(value: SafeString) -> Self {
        value.0
    }
}

impl PartialEq<str> for SafeString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SafeString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Mark `content` as trusted markup, opting it out of escaping.
pub fn mark_safe(content: impl Into<String>) -> SafeString {
    SafeString::new(content)
}

/// Alias of [`mark_safe`] for template code.
pub fn raw(content: impl Into<String>) -> SafeString {
    SafeString::new(content)
}
