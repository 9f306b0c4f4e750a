//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Result, bail};

use formwork_html::DEFAULT_URL_SCHEMES;

/// Helper configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpersConfig {
    /// Name of the hidden CSRF field (default: `_csrf_token`).
    pub csrf_field: String,

    /// Name of the hidden method-override field (default: `_method`).
    pub method_field: String,

    /// `accept-charset` of rendered forms (default: `utf-8`).
    pub accept_charset: String,

    /// Schemes accepted by URL escaping (default: http, https, mailto).
    pub url_schemes: Vec<String>,

    /// Value submitted by a checked checkbox (default: `1`).
    pub checked_value: String,

    /// Value submitted by the hidden companion of an unchecked checkbox
    /// (default: `0`).
    pub unchecked_value: String,
}

impl Default for HelpersConfig {
    fn default() -> Self {
        Self {
            csrf_field: "_csrf_token".to_string(),
            method_field: "_method".to_string(),
            accept_charset: "utf-8".to_string(),
            url_schemes: DEFAULT_URL_SCHEMES.iter().map(|s| s.to_string()).collect(),
            checked_value: "1".to_string(),
            unchecked_value: "0".to_string(),
        }
    }
}

impl HelpersConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps variable names to
    /// values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let csrf_field = field_name(&lookup, "FORMWORK_CSRF_FIELD", defaults.csrf_field)?;
        let method_field = field_name(&lookup, "FORMWORK_METHOD_FIELD", defaults.method_field)?;

        let accept_charset =
            lookup("FORMWORK_ACCEPT_CHARSET").unwrap_or(defaults.accept_charset);

        let url_schemes = lookup("FORMWORK_URL_SCHEMES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_ascii_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.url_schemes);
        if url_schemes.is_empty() {
            bail!("FORMWORK_URL_SCHEMES must name at least one scheme");
        }

        let checked_value = lookup("FORMWORK_CHECKED_VALUE").unwrap_or(defaults.checked_value);
        let unchecked_value =
            lookup("FORMWORK_UNCHECKED_VALUE").unwrap_or(defaults.unchecked_value);
        if checked_value == unchecked_value {
            bail!("FORMWORK_CHECKED_VALUE and FORMWORK_UNCHECKED_VALUE must differ");
        }

        Ok(Self {
            csrf_field,
            method_field,
            accept_charset,
            url_schemes,
            checked_value,
            unchecked_value,
        })
    }
}

fn field_name<F>(lookup: &F, key: &str, default: String) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    let value = value.trim().to_string();
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '"') {
        bail!("{key} must be a non-empty field name without whitespace or quotes");
    }
    Ok(value)
}
