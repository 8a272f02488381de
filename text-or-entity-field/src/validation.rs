//! The text-length-or-valid-reference rule.
//!
//! A reference that loads is valid regardless of length. A reference that
//! does not load is treated as literal text and length-checked, the same as
//! a text value. Lengths count characters, not bytes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::item::{FieldItem, ItemValue};
use crate::list::FieldItemList;
use crate::lookup::EntityLookup;
use crate::settings::FieldSettings;

/// Violation message when the text is too long.
pub const LONG_TEXT_MESSAGE: &str = "The text is too long.";

/// A user-facing violation localized to one delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Property path of the offending item
    pub path: String,
    pub delta: usize,
    pub message: String,
}

/// Validator for text-or-entity-reference item lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOrValidReference {
    pub long_text_message: String,
}

impl Default for TextOrValidReference {
    fn default() -> Self {
        Self {
            long_text_message: LONG_TEXT_MESSAGE.to_string(),
        }
    }
}

impl TextOrValidReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every delta; at most one violation per delta.
    pub async fn validate(
        &self,
        items: &FieldItemList,
        lookup: &dyn EntityLookup,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (delta, item) in items.iter().enumerate() {
            if let Some(violation) = self
                .validate_item(delta, item, items.settings(), lookup)
                .await
            {
                violations.push(violation);
            }
        }
        violations
    }

    /// Validate one item at `delta`.
    pub async fn validate_item(
        &self,
        delta: usize,
        item: &FieldItem,
        settings: &FieldSettings,
        lookup: &dyn EntityLookup,
    ) -> Option<Violation> {
        match item.item_value() {
            ItemValue::Reference { target_id, .. } => {
                if !settings.target_type.is_empty()
                    && lookup
                        .load_unchanged(&settings.target_type, target_id)
                        .await
                        .is_some()
                {
                    return None;
                }
                debug!(delta, %target_id, "reference did not resolve, checking it as text");
                self.check_length(delta, target_id.as_str(), settings.max_length)
            }
            ItemValue::Text(text) => self.check_length(delta, text, settings.max_length),
            ItemValue::Pending(_) | ItemValue::Empty => None,
        }
    }

    fn check_length(&self, delta: usize, text: &str, max_length: usize) -> Option<Violation> {
        let length = text.chars().count();
        if length <= max_length {
            return None;
        }
        debug!(delta, length, max_length, "text too long");
        Some(Violation {
            path: delta.to_string(),
            delta,
            message: self.long_text_message.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use crate::types::ItemValues;
    use rstest::rstest;

    fn list(max_length: usize, values: Vec<ItemValues>) -> FieldItemList {
        FieldItemList::from_values(FieldSettings::new("node").with_max_length(max_length), values)
            .unwrap()
    }

    #[rstest]
    #[case("short", 0)]
    #[case("1234567890", 0)]
    #[case("1234567890123", 1)]
    #[tokio::test]
    async fn text_length_against_max(#[case] text: &str, #[case] expected: usize) {
        let store = MemoryStore::new();
        let items = list(10, vec![ItemValues::text(text)]);
        let violations = TextOrValidReference::new().validate(&items, &store).await;
        assert_eq!(violations.len(), expected);
    }

    #[tokio::test]
    async fn length_counts_characters_not_bytes() {
        let store = MemoryStore::new();
        // Five characters, ten bytes.
        let items = list(5, vec![ItemValues::text("ééééé")]);
        assert!(TextOrValidReference::new().validate(&items, &store).await.is_empty());
    }

    #[tokio::test]
    async fn resolved_reference_skips_length_check() {
        let mut store = MemoryStore::new();
        for _ in 0..120 {
            store.create("node", "page", "filler");
        }
        // Id "120" is three characters, longer than max_length 2.
        let items = list(2, vec![ItemValues::reference("120")]);
        assert!(TextOrValidReference::new().validate(&items, &store).await.is_empty());
    }

    #[tokio::test]
    async fn unresolved_reference_is_checked_as_text() {
        let store = MemoryStore::new();
        let items = list(2, vec![ItemValues::reference("999")]);
        let violations = TextOrValidReference::new().validate(&items, &store).await;
        assert_eq!(
            violations,
            vec![Violation {
                path: "0".into(),
                delta: 0,
                message: LONG_TEXT_MESSAGE.into(),
            }]
        );
    }

    #[tokio::test]
    async fn violations_are_localized_per_delta() {
        let store = MemoryStore::new();
        let items = list(
            3,
            vec![
                ItemValues::text("ok"),
                ItemValues::text("too long"),
                ItemValues::default(),
                ItemValues::reference("12345"),
            ],
        );
        let violations = TextOrValidReference::new().validate(&items, &store).await;
        let deltas: Vec<usize> = violations.iter().map(|v| v.delta).collect();
        assert_eq!(deltas, vec![1, 3]);
    }

    #[tokio::test]
    async fn empty_target_type_skips_loading() {
        let mut store = MemoryStore::new();
        store.create("node", "page", "one");
        let settings = FieldSettings::default().with_max_length(0);
        let item = FieldItem::reference("1");
        let violation = TextOrValidReference::new()
            .validate_item(0, &item, &settings, &store)
            .await;
        assert!(violation.is_some());
    }

    #[tokio::test]
    async fn custom_message_is_reported() {
        let store = MemoryStore::new();
        let validator = TextOrValidReference {
            long_text_message: "Too long!".into(),
        };
        let items = list(1, vec![ItemValues::text("ab")]);
        let violations = validator.validate(&items, &store).await;
        assert_eq!(violations[0].message, "Too long!");
    }
}
