//! CSRF token providers.
//!
//! The builder asks its provider for a token once per top-level form and
//! skips the hidden field for `GET` forms.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Supplies the CSRF token for the current request.
pub trait CsrfTokenProvider {
    /// The token, or `None` when the request has no session token.
    fn csrf_token(&self) -> Option<String>;
}

impl CsrfTokenProvider for Option<String> {
    fn csrf_token(&self) -> Option<String> {
        self.clone()
    }
}

impl CsrfTokenProvider for String {
    fn csrf_token(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl CsrfTokenProvider for &str {
    fn csrf_token(&self) -> Option<String> {
        Some((*self).to_string())
    }
}

impl<F> CsrfTokenProvider for F
where
    F: Fn() -> Option<String>,
{
    fn csrf_token(&self) -> Option<String> {
        self()
    }
}

/// Generate a fresh token: hex-encoded SHA-256 over 32 random bytes and the
/// current timestamp.
pub fn generate_csrf_token() -> String {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let timestamp = chrono::Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(timestamp.to_le_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn token_format() {
        let token = generate_csrf_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_differ() {
        assert_ne!(generate_csrf_token(), generate_csrf_token());
    }

    #[test]
    fn providers() {
        assert_eq!("abc".csrf_token().as_deref(), Some("abc"));
        assert_eq!(None::<String>.csrf_token(), None);
        let closure = || Some("from-session".to_string());
        assert_eq!(closure.csrf_token().as_deref(), Some("from-session"));
    }
}
