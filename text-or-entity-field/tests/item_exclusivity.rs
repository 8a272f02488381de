//! Property tests for the one-representation-at-a-time rule.

use proptest::prelude::*;
use text_or_entity_field::{Entity, EntityId, FieldItem, ItemValue, ItemValues};

#[derive(Debug, Clone)]
enum Write {
    TargetId(Option<String>),
    Text(Option<String>),
    SavedEntity(u64),
    UnsavedEntity,
    ClearEntity,
    Values(Option<String>, Option<String>),
}

fn write_strategy() -> impl Strategy<Value = Write> {
    prop_oneof![
        proptest::option::of("[0-9]{0,4}").prop_map(Write::TargetId),
        proptest::option::of("[a-z ]{0,8}").prop_map(Write::Text),
        (1u64..1000).prop_map(Write::SavedEntity),
        Just(Write::UnsavedEntity),
        Just(Write::ClearEntity),
        (
            proptest::option::of("[0-9]{0,3}"),
            proptest::option::of("[a-z]{0,3}")
        )
            .prop_map(|(id, text)| Write::Values(id, text)),
    ]
}

fn apply(item: &mut FieldItem, write: Write) {
    match write {
        Write::TargetId(id) => item.set_target_id(id.map(EntityId::from)),
        Write::Text(text) => item.set_text(text),
        Write::SavedEntity(id) => item.set_entity(Entity::new("node", "page", id, "Saved")),
        Write::UnsavedEntity => item.set_entity(Entity::unsaved("node", "page", "Draft")),
        Write::ClearEntity => item.set_entity(None::<Entity>),
        Write::Values(target_id, text) => {
            // Rejected writes leave the item untouched.
            let _ = item.set_values(ItemValues {
                target_id: target_id.map(EntityId::from),
                text,
                target_uuid: None,
            });
        }
    }
}

proptest! {
    /// Property: after any sequence of writes, at most one of target_id and
    /// text is set.
    #[test]
    fn test_reference_and_text_never_coexist(
        writes in proptest::collection::vec(write_strategy(), 0..20),
    ) {
        let mut item = FieldItem::new();
        for write in writes {
            apply(&mut item, write);
            prop_assert!(!(item.target_id().is_some() && item.text().is_some()));
        }
    }

    /// Property: the computed value is the text if set, else the target id.
    #[test]
    fn test_computed_value_tracks_last_write(
        writes in proptest::collection::vec(write_strategy(), 1..20),
    ) {
        let mut item = FieldItem::new();
        for write in writes {
            // Read before the write so a stale cache would be observable.
            let _ = item.value();
            apply(&mut item, write);
            let expected = item
                .text()
                .map(str::to_string)
                .or_else(|| item.target_id().map(ToString::to_string));
            prop_assert_eq!(item.value().map(str::to_string), expected);
        }
    }

    /// Property: the raw map form never carries both properties.
    #[test]
    fn test_raw_values_are_exclusive(
        writes in proptest::collection::vec(write_strategy(), 0..20),
    ) {
        let mut item = FieldItem::new();
        for write in writes {
            apply(&mut item, write);
        }
        let values = item.values();
        prop_assert!(!(values.target_id.is_some() && values.text.is_some()));
        prop_assert_eq!(item.is_empty(), matches!(item.item_value(), ItemValue::Empty));
    }
}

#[test]
fn test_setting_text_after_reference_clears_reference() {
    let mut item = FieldItem::reference("5");
    item.set_text("hello".to_string());
    assert_eq!(item.target_id(), None);
    assert_eq!(item.value(), Some("hello"));
}
