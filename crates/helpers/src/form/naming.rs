//! Input name and id computation.
//!
//! Names wrap each nesting level in brackets: `root[level1][level2][field]`.
//! Ids replace every bracketed segment with a hyphen-prefixed token and
//! dasherize the result: `delivery[address][street]` becomes
//! `delivery-address-street`.

use std::sync::LazyLock;

use regex::Regex;

/// Separator for dotted field paths (`address.street`).
pub const PATH_SEPARATOR: char = '.';

/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static BRACKETED_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([\w\-]*)\]").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static NAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\-]+").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static SPACE_OR_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-]").expect("valid regex literal"));

/// Full input name for `field` under `prefix`.
///
/// Dotted fields open one bracket level per segment:
/// `input_name("book", "author.name") == "book[author][name]"`.
pub fn input_name(prefix: &str, field: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + field.len() + 2);
    name.push_str(prefix);
    for segment in field.split(PATH_SEPARATOR) {
        name.push('[');
        name.push_str(segment);
        name.push(']');
    }
    name
}

/// Id derived from a full input name.
pub fn input_id(name: &str) -> String {
    dasherize(&BRACKETED_TOKEN.replace_all(name, "-$1"))
}

/// Split a full input name into its lookup path.
///
/// `book[authors][0][name]` becomes `["book", "authors", "0", "name"]`.
pub fn split_input_name(name: &str) -> Vec<&str> {
    NAME_TOKEN.find_iter(name).map(|m| m.as_str()).collect()
}

/// Lowercase with `_` word boundaries (`DeliveryAddress` → `delivery_address`).
pub fn underscore(input: &str) -> String {
    let s = input.replace("::", "/");
    let s = ACRONYM_BOUNDARY.replace_all(&s, "${1}_${2}");
    let s = CAMEL_BOUNDARY.replace_all(&s, "${1}_${2}");
    let s = SPACE_OR_DASH.replace_all(&s, "_");
    s.to_lowercase()
}

/// Lowercase with `-` word boundaries (`book_Author` → `book-author`).
pub fn dasherize(input: &str) -> String {
    underscore(input).replace('_', "-")
}

/// Human-readable label text for a field name.
///
/// Only the last dotted segment is used; word boundaries become spaces and
/// the first letter is capitalized: `address.delivery_street` becomes
/// `Delivery street`.
pub fn humanize(field: &str) -> String {
    let last = field.rsplit(PATH_SEPARATOR).next().unwrap_or(field);
    let underscored = underscore(last);
    let words: Vec<&str> = underscored.split('_').filter(|w| !w.is_empty()).collect();

    let mut out = String::with_capacity(underscored.len());
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push(' ');
            out.push_str(word);
        }
    }
    out
}
