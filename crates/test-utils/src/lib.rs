//! Formwork test utilities.
//!
//! Helpers for integration testing: model and params fixtures, form
//! definitions, and assertion utilities for rendered markup.

use serde_json::{Value as JsonValue, json};

/// CSRF token used by tests that need a stable value.
pub const FIXED_CSRF_TOKEN: &str = "9d3f0c1e7b2a4f6e8d5c3b1a0f9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e";

/// Create a test book with default values.
pub fn test_book(title: &str) -> TestBook {
    TestBook {
        title: title.to_string(),
        author: json!({ "name": "Frank Herbert" }),
        tags: Vec::new(),
        free_shipping: false,
        store: None,
        extra: serde_json::Map::new(),
    }
}

/// A book builder for model values and submitted params.
#[derive(Debug, Clone)]
pub struct TestBook {
    pub title: String,
    pub author: JsonValue,
    pub tags: Vec<String>,
    pub free_shipping: bool,
    pub store: Option<String>,
    pub extra: serde_json::Map<String, JsonValue>,
}

impl TestBook {
    /// Set the author name.
    pub fn with_author(mut self, name: &str) -> Self {
        self.author = json!({ "name": name });
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Mark as shipping for free.
    pub fn free_shipping(mut self) -> Self {
        self.free_shipping = true;
        self
    }

    /// Set the store code.
    pub fn in_store(mut self, store: &str) -> Self {
        self.store = Some(store.to_string());
        self
    }

    /// Add any other field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// The book's own fields.
    pub fn fields(&self) -> JsonValue {
        let mut fields = serde_json::Map::new();
        fields.insert("title".to_string(), json!(self.title));
        fields.insert("author".to_string(), self.author.clone());
        fields.insert("tags".to_string(), json!(self.tags));
        fields.insert("free_shipping".to_string(), json!(self.free_shipping));
        if let Some(store) = &self.store {
            fields.insert("store".to_string(), json!(store));
        }
        for (name, value) in &self.extra {
            fields.insert(name.clone(), value.clone());
        }
        JsonValue::Object(fields)
    }

    /// Fields keyed under `book`, the shape of both params and model values.
    pub fn keyed(&self) -> JsonValue {
        json!({ "book": self.fields() })
    }
}

/// Form definition builders for testing.
pub mod definitions {
    use serde_json::json;

    /// A book edit form exercising most element types.
    pub fn book_form() -> serde_json::Value {
        json!({
            "name": "book",
            "action": "/books/1",
            "method": "PATCH",
            "elements": [
                { "type": "label", "field": "title" },
                { "type": "text", "field": "title", "attributes": { "required": true } },
                { "type": "group", "name": "author", "elements": [
                    { "type": "text", "field": "name" }
                ]},
                { "type": "check_box", "field": "free_shipping" },
                { "type": "select", "field": "store", "choices": [
                    { "label": "Italy", "value": "it" },
                    { "label": "United States", "value": "us" }
                ]},
                { "type": "submit", "content": "Save" }
            ]
        })
    }

    /// A search form submitted with `GET`.
    pub fn search_form() -> serde_json::Value {
        json!({
            "name": "search",
            "action": "/search",
            "method": "GET",
            "elements": [
                { "type": "search", "field": "q" },
                { "type": "submit", "content": "Search" }
            ]
        })
    }
}

/// Assertion helpers for rendered markup.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that `first` occurs, and occurs before `second`.
    pub fn appears_before(haystack: &str, first: &str, second: &str) {
        let a = haystack.find(first);
        let b = haystack.find(second);
        assert!(
            matches!((a, b), (Some(a), Some(b)) if a < b),
            "Expected '{first}' before '{second}'\nActual: {haystack}"
        );
    }

    /// Assert that `needle` occurs exactly `expected` times.
    pub fn occurs(haystack: &str, needle: &str, expected: usize) {
        let actual = haystack.matches(needle).count();
        assert_eq!(
            actual, expected,
            "Expected '{needle}' {expected} time(s), found {actual}\nActual: {haystack}"
        );
    }
}
