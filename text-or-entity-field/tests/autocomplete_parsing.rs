//! Parser properties of autocomplete input resolution.

use proptest::prelude::*;
use text_or_entity_field::test_support::MemoryStore;
use text_or_entity_field::{
    extract_entity_id, AutocompleteElement, FieldItem, FieldSettings, Resolution,
};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    /// Property: a label followed by a parenthesized id yields that id.
    #[test]
    fn test_label_with_id_extracts_id(
        label in "[A-Za-z][A-Za-z0-9 ]{0,20}",
        id in "[1-9][0-9]{0,6}",
    ) {
        let input = format!("{label} ({id})");
        prop_assert_eq!(extract_entity_id(&input), Some(id.as_str()));
    }

    /// Property: input without parentheses never carries an id.
    #[test]
    fn test_input_without_parentheses_has_no_id(input in "[^()]{0,30}") {
        prop_assert_eq!(extract_entity_id(&input), None);
    }

    /// Property: with nothing stored, a letter-only input resolves to itself
    /// as text.
    #[test]
    fn test_unknown_words_fall_back_to_text(input in "[a-z]{1,12}( [a-z]{1,12})?") {
        let store = MemoryStore::new();
        let element = AutocompleteElement::new(&FieldSettings::new("node"));
        let submission = block_on(element.resolve(&input, &store));
        prop_assert_eq!(submission.resolution, Resolution::Text(input));
    }

    /// Property: whatever the input, applying the resolution leaves an
    /// item with at most one representation.
    #[test]
    fn test_resolution_applies_exclusively(input in ".{0,30}") {
        let mut store = MemoryStore::new();
        store.create("node", "page", "Known");
        let element = AutocompleteElement::new(&FieldSettings::new("node"));
        let submission = block_on(element.resolve(&input, &store));

        let mut item = FieldItem::reference("1");
        submission.resolution.apply_to(&mut item);
        prop_assert!(!(item.target_id().is_some() && item.text().is_some()));
    }
}

#[tokio::test]
async fn test_typed_label_resolves_to_stored_entity() {
    let mut store = MemoryStore::new();
    store.create("node", "page", "About us");
    let element = AutocompleteElement::new(&FieldSettings::new("node"));

    let mut item = FieldItem::new();
    element.resolve("About us", &store).await.resolution.apply_to(&mut item);
    assert_eq!(item.target_id().map(|id| id.as_str()), Some("1"));
    assert_eq!(item.value(), Some("1"));
}
