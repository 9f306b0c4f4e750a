#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Declarative form definition tests.

use formwork_helpers::HelpersConfig;
use formwork_helpers::form::{ElementDefinition, FormDefinition, FormHelper, Verb};
use formwork_test_utils::{FIXED_CSRF_TOKEN, assert, definitions};
use serde_json::json;

const BOOK_DEMO: &str = include_str!("../demos/book_form.json");

fn render(definition: &FormDefinition) -> String {
    let helper = FormHelper::new(HelpersConfig::default()).csrf(FIXED_CSRF_TOKEN);
    definition.render(&helper).unwrap().into_string()
}

#[test]
fn book_fixture_renders() {
    let definition: FormDefinition = serde_json::from_value(definitions::book_form()).unwrap();
    assert_eq!(definition.method, Verb::Patch);

    let html = render(&definition);
    assert::appears_before(&html, "name=\"_method\" value=\"PATCH\"", "name=\"_csrf_token\"");
    assert::contains(&html, "<label for=\"book-title\">Title</label>");
    assert::contains(
        &html,
        "<input type=\"text\" name=\"book[title]\" id=\"book-title\" value=\"\" required=\"required\">",
    );
    assert::contains(&html, "name=\"book[author][name]\"");
    assert::contains(&html, "<button type=\"submit\">Save</button>");
    assert::not_contains(&html, "enctype");
}

#[test]
fn search_fixture_is_a_get_form() {
    let definition: FormDefinition = serde_json::from_value(definitions::search_form()).unwrap();
    let html = render(&definition);
    assert::contains(&html, "method=\"GET\"");
    assert::not_contains(&html, "_csrf_token");
    assert::contains(
        &html,
        "<input type=\"search\" name=\"search[q]\" id=\"search-q\" value=\"\">",
    );
}

#[test]
fn demo_definition_renders_every_section() {
    let definition = FormDefinition::from_json(BOOK_DEMO).unwrap();
    let html = render(&definition);

    assert::contains(&html, "enctype=\"multipart&#x2F;form-data\"");
    assert::contains(&html, "value=\"Dune\"");
    assert::contains(
        &html,
        "<fieldset>\n<legend>Author</legend>\n<label for=\"book-author-name\">Name</label>",
    );
    assert::contains(&html, "<option disabled=\"disabled\">Choose a store</option>");
    assert::contains(&html, "<option value=\"it\" selected=\"selected\">Italy</option>");
    assert::contains(&html, "id=\"book-free-shipping\" value=\"1\" checked=\"checked\">");
    assert::contains(
        &html,
        "<input type=\"number\" name=\"book[reviews][1][rating]\" id=\"book-reviews-1-rating\" value=\"4\" min=\"1\" max=\"5\">",
    );
    assert::contains(&html, "accept=\"image&#x2F;png,image&#x2F;jpeg\"");
    assert::contains(&html, "<button type=\"submit\">Update</button>");
}

#[test]
fn params_override_demo_values() {
    let definition = FormDefinition::from_json(BOOK_DEMO).unwrap();
    let helper = FormHelper::new(HelpersConfig::default())
        .params(json!({ "book": { "title": "Dune Messiah" } }));
    let html = definition.render(&helper).unwrap();
    assert::contains(&html, "value=\"Dune Messiah\"");
    assert::not_contains(&html, "_csrf_token");
}

#[test]
fn definitions_serialize_back() {
    let definition = FormDefinition::from_json(BOOK_DEMO).unwrap();
    let text = serde_json::to_string(&definition).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["method"], "PATCH");
    assert_eq!(json["elements"][1]["type"], "text");
    assert_eq!(json["elements"][1]["attributes"]["required"], true);

    let again = FormDefinition::from_json(&text).unwrap();
    assert_eq!(again, definition);
}

#[test]
fn errors_reach_the_builder() {
    let definition = FormDefinition::from_json(BOOK_DEMO).unwrap();
    let form = definition.to_form();
    assert_eq!(form.errors()["title"], vec!["is already taken".to_string()]);
}

#[test]
fn label_with_text_and_field() {
    let element: ElementDefinition = serde_json::from_value(json!({
        "type": "label", "field": "isbn", "text": "ISBN"
    }))
    .unwrap();
    let definition = FormDefinition {
        name: "book".into(),
        action: "/books".into(),
        method: Verb::Get,
        elements: vec![element],
        ..FormDefinition::default()
    };
    assert::contains(&render(&definition), "<label for=\"book-isbn\">ISBN</label>");
}
