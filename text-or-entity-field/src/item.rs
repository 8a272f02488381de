//! A single field item and the rule that keeps its two representations apart.
//!
//! [`ItemValue`] holds at most one representation. Every setter on
//! [`FieldItem`] replaces the whole slot, so setting a reference clears the
//! text and setting a text clears the reference in the same write.

use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::error::{FieldError, Result};
use crate::lookup::EntityLookup;
use crate::types::{Entity, EntityId, ItemValues};

/// Name of the computed property that exposes the effective value.
pub const MAIN_PROPERTY: &str = "value";

/// The value slot of a field item.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ItemValue {
    #[default]
    Empty,
    /// A reference by id; `entity` caches the resolved handle once loaded.
    Reference {
        target_id: EntityId,
        entity: Option<Entity>,
    },
    /// An entity created inline that has no id yet.
    Pending(Entity),
    /// Free text.
    Text(String),
}

impl ItemValue {
    pub fn target_id(&self) -> Option<&EntityId> {
        match self {
            ItemValue::Reference { target_id, .. } => Some(target_id),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ItemValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The entity handle, if one is held (cached reference or pending entity).
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            ItemValue::Reference { entity, .. } => entity.as_ref(),
            ItemValue::Pending(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ItemValue::Empty)
    }
}

/// One delta of a text-or-entity-reference field.
#[derive(Debug, Clone, Default)]
pub struct FieldItem {
    value: ItemValue,
    computed: OnceLock<Option<String>>,
}

impl PartialEq for FieldItem {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<ItemValue> for FieldItem {
    fn from(value: ItemValue) -> Self {
        Self {
            value,
            computed: OnceLock::new(),
        }
    }
}

impl FieldItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an item from its raw map form.
    pub fn from_values(values: ItemValues) -> Result<Self> {
        let mut item = Self::new();
        item.set_values(values)?;
        Ok(item)
    }

    pub fn reference(id: impl Into<EntityId>) -> Self {
        let id: EntityId = id.into();
        let mut item = Self::new();
        item.set_target_id(id);
        item
    }

    pub fn text_value(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let mut item = Self::new();
        item.set_text(text);
        item
    }

    /// Replace the item from its raw map form.
    ///
    /// Fails when both `text` and `target_id` are non-empty, and when an
    /// unresolved portable `target_uuid` is passed in.
    pub fn set_values(&mut self, values: ItemValues) -> Result<()> {
        if values.non_empty_text().is_some() && values.non_empty_target_id().is_some() {
            return Err(FieldError::BothSet);
        }
        if let Some(uuid) = values.target_uuid {
            if values.non_empty_target_id().is_none() {
                return Err(FieldError::invalid_argument(format!(
                    "target_uuid {uuid} must be resolved to a target_id first"
                )));
            }
        }

        let value = match (values.target_id, values.text) {
            (Some(id), _) if !id.is_empty() => ItemValue::Reference {
                target_id: id,
                entity: None,
            },
            (_, Some(text)) if !text.is_empty() => ItemValue::Text(text),
            _ => ItemValue::Empty,
        };
        self.replace(value);
        Ok(())
    }

    /// The raw map form; the computed `value` is not included.
    pub fn values(&self) -> ItemValues {
        match &self.value {
            ItemValue::Reference { target_id, .. } => ItemValues::reference(target_id.clone()),
            ItemValue::Text(text) => ItemValues::text(text.clone()),
            ItemValue::Pending(_) | ItemValue::Empty => ItemValues::default(),
        }
    }

    pub fn item_value(&self) -> &ItemValue {
        &self.value
    }

    pub fn target_id(&self) -> Option<&EntityId> {
        self.value.target_id()
    }

    pub fn text(&self) -> Option<&str> {
        self.value.text()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether the item holds an entity that has not been saved yet.
    pub fn has_new_entity(&self) -> bool {
        matches!(&self.value, ItemValue::Pending(entity) if entity.is_new)
    }

    /// Set the referenced entity and clear the text.
    ///
    /// A persisted entity becomes a reference by its id; an unsaved one is
    /// held until [`FieldItem::pre_save`] can read its id.
    pub fn set_entity(&mut self, entity: impl Into<Option<Entity>>) {
        let value = match entity.into() {
            None => ItemValue::Empty,
            Some(entity) => match entity.id.clone() {
                Some(id) if !entity.is_new && !id.is_empty() => ItemValue::Reference {
                    target_id: id,
                    entity: Some(entity),
                },
                _ => ItemValue::Pending(entity),
            },
        };
        self.replace(value);
    }

    /// Set the target id and clear the text. An empty id empties the item.
    pub fn set_target_id(&mut self, id: impl Into<Option<EntityId>>) {
        let value = match id.into() {
            Some(id) if !id.is_empty() => {
                // Keep the cached handle only if it still belongs to the id.
                let entity = match &self.value {
                    ItemValue::Reference { target_id, entity } if *target_id == id => {
                        entity.clone()
                    }
                    _ => None,
                };
                ItemValue::Reference {
                    target_id: id,
                    entity,
                }
            }
            _ => ItemValue::Empty,
        };
        self.replace(value);
    }

    /// Set the text and clear the reference. An empty text empties the item.
    pub fn set_text(&mut self, text: impl Into<Option<String>>) {
        let value = match text.into() {
            Some(text) if !text.is_empty() => ItemValue::Text(text),
            _ => ItemValue::Empty,
        };
        self.replace(value);
    }

    /// The effective value: the text if set, else the target id.
    ///
    /// Derived on first access and cached until the next write.
    pub fn value(&self) -> Option<&str> {
        self.computed
            .get_or_init(|| match &self.value {
                ItemValue::Text(text) => Some(text.clone()),
                ItemValue::Reference { target_id, .. } => Some(target_id.to_string()),
                ItemValue::Pending(_) | ItemValue::Empty => None,
            })
            .as_deref()
    }

    /// Read a property by name: `target_id`, `text`, or [`MAIN_PROPERTY`].
    pub fn property(&self, name: &str) -> Option<String> {
        match name {
            MAIN_PROPERTY => self.value().map(str::to_string),
            "target_id" => self.target_id().map(ToString::to_string),
            "text" => self.text().map(str::to_string),
            _ => None,
        }
    }

    /// Resolve the referenced entity, loading and caching it on first use.
    pub async fn entity(
        &mut self,
        lookup: &dyn EntityLookup,
        target_type: &str,
    ) -> Option<&Entity> {
        if let ItemValue::Reference { target_id, entity } = &mut self.value {
            if entity.is_none() {
                *entity = lookup.load(target_type, target_id).await;
                if entity.is_none() {
                    debug!(%target_id, target_type, "referenced entity did not load");
                }
            }
        }
        self.value.entity()
    }

    /// Promote the id of a pending entity that has since been saved.
    pub fn pre_save(&mut self) {
        let ItemValue::Pending(entity) = &self.value else {
            return;
        };
        let Some(id) = entity.id.clone().filter(|id| !id.is_empty()) else {
            debug!(label = %entity.label, "pending entity has no id yet");
            return;
        };
        let entity = entity.clone();
        self.replace(ItemValue::Reference {
            target_id: id,
            entity: Some(entity),
        });
    }

    fn replace(&mut self, value: ItemValue) {
        trace!(from = ?kind(&self.value), to = ?kind(&value), "field item write");
        self.value = value;
        self.computed = OnceLock::new();
    }
}

fn kind(value: &ItemValue) -> &'static str {
    match value {
        ItemValue::Empty => "empty",
        ItemValue::Reference { .. } => "reference",
        ItemValue::Pending(_) => "pending",
        ItemValue::Text(_) => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    #[test]
    fn new_item_is_empty() {
        let item = FieldItem::new();
        assert!(item.is_empty());
        assert_eq!(item.value(), None);
        assert_eq!(item.values(), ItemValues::default());
    }

    #[test]
    fn setting_text_clears_reference() {
        let mut item = FieldItem::reference("5");
        item.set_text("hello".to_string());
        assert_eq!(item.target_id(), None);
        assert_eq!(item.text(), Some("hello"));
        assert!(item.item_value().entity().is_none());
    }

    #[test]
    fn setting_target_id_clears_text() {
        let mut item = FieldItem::text_value("hello");
        item.set_target_id(EntityId::from("5"));
        assert_eq!(item.text(), None);
        assert_eq!(item.target_id(), Some(&EntityId::from("5")));
    }

    #[test]
    fn setting_entity_clears_text() {
        let mut item = FieldItem::text_value("hello");
        item.set_entity(Entity::new("node", "page", "9", "Nine"));
        assert_eq!(item.text(), None);
        assert_eq!(item.target_id(), Some(&EntityId::from("9")));
        assert_eq!(item.item_value().entity().map(|e| e.label.as_str()), Some("Nine"));
    }

    #[test]
    fn clearing_entity_empties_item() {
        let mut item = FieldItem::reference("1");
        item.set_entity(None::<Entity>);
        assert!(item.is_empty());
    }

    #[test]
    fn empty_text_and_id_empty_the_item() {
        let mut item = FieldItem::reference("1");
        item.set_text(String::new());
        assert!(item.is_empty());

        let mut item = FieldItem::text_value("x");
        item.set_target_id(EntityId::from(""));
        assert!(item.is_empty());
    }

    #[test]
    fn from_values_rejects_both_set() {
        let values = ItemValues {
            target_id: Some("1".into()),
            text: Some("text".into()),
            target_uuid: None,
        };
        assert!(matches!(FieldItem::from_values(values), Err(FieldError::BothSet)));
    }

    #[test]
    fn from_values_rejects_unresolved_uuid() {
        let values = ItemValues::portable(uuid::Uuid::new_v4());
        assert!(matches!(
            FieldItem::from_values(values),
            Err(FieldError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn from_values_treats_empty_strings_as_absent() {
        let values = ItemValues {
            target_id: Some("".into()),
            text: Some("words".into()),
            target_uuid: None,
        };
        let item = FieldItem::from_values(values).unwrap();
        assert_eq!(item.text(), Some("words"));
    }

    #[test]
    fn computed_value_prefers_text_then_id() {
        let item = FieldItem::text_value("typed");
        assert_eq!(item.value(), Some("typed"));

        let item = FieldItem::reference("12");
        assert_eq!(item.value(), Some("12"));
    }

    #[test]
    fn computed_value_invalidated_by_write() {
        let mut item = FieldItem::reference("12");
        assert_eq!(item.value(), Some("12"));
        item.set_text("now text".to_string());
        assert_eq!(item.value(), Some("now text"));
        item.set_target_id(EntityId::from("13"));
        assert_eq!(item.value(), Some("13"));
    }

    #[test]
    fn unsaved_entity_is_pending() {
        let mut item = FieldItem::new();
        item.set_entity(Entity::unsaved("node", "page", "Draft"));
        assert!(item.has_new_entity());
        assert!(!item.is_empty());
        assert_eq!(item.target_id(), None);
        assert_eq!(item.value(), None);
    }

    #[test]
    fn pre_save_promotes_assigned_id() {
        let mut entity = Entity::unsaved("node", "page", "Draft");
        let mut item = FieldItem::new();
        item.set_entity(entity.clone());

        // Not saved yet: nothing to promote.
        item.pre_save();
        assert_eq!(item.target_id(), None);

        // The host saved the entity and assigned an id.
        entity.id = Some("77".into());
        entity.is_new = false;
        item = FieldItem::from(ItemValue::Pending(entity));
        item.pre_save();
        assert_eq!(item.target_id(), Some(&EntityId::from("77")));
        assert_eq!(item.text(), None);
    }

    #[test]
    fn pre_save_leaves_references_and_text_alone() {
        let mut item = FieldItem::text_value("keep");
        item.pre_save();
        assert_eq!(item.text(), Some("keep"));

        let mut item = FieldItem::reference("3");
        item.pre_save();
        assert_eq!(item.target_id(), Some(&EntityId::from("3")));
    }

    #[test]
    fn set_same_target_id_keeps_cached_entity() {
        let mut item = FieldItem::new();
        item.set_entity(Entity::new("node", "page", "4", "Four"));
        item.set_target_id(EntityId::from("4"));
        assert!(item.item_value().entity().is_some());
        item.set_target_id(EntityId::from("5"));
        assert!(item.item_value().entity().is_none());
    }

    #[tokio::test]
    async fn entity_loads_lazily_and_caches() {
        let mut store = MemoryStore::new();
        let saved = store.create("node", "page", "Lazy");
        let id = saved.id.clone().unwrap();

        let mut item = FieldItem::reference(id);
        assert!(item.item_value().entity().is_none());
        let label = item.entity(&store, "node").await.map(|e| e.label.clone());
        assert_eq!(label.as_deref(), Some("Lazy"));
        assert!(item.item_value().entity().is_some());
    }

    #[tokio::test]
    async fn entity_of_missing_reference_is_none() {
        let store = MemoryStore::new();
        let mut item = FieldItem::reference("404");
        assert!(item.entity(&store, "node").await.is_none());
        // The id stays authoritative even when it does not resolve.
        assert_eq!(item.target_id(), Some(&EntityId::from("404")));
    }

    #[test]
    fn properties_read_by_name() {
        let mut item = FieldItem::reference("7");
        assert_eq!(item.property(MAIN_PROPERTY).as_deref(), Some("7"));
        assert_eq!(item.property("target_id").as_deref(), Some("7"));
        assert_eq!(item.property("text"), None);

        item.set_text("typed".to_string());
        assert_eq!(item.property("value").as_deref(), Some("typed"));
        assert_eq!(item.property("target_id"), None);
        assert_eq!(item.property("entity"), None);
    }
}
