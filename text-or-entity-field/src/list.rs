//! The ordered list of items of one field.

use std::collections::BTreeMap;

use tracing::debug;

use crate::defaults::{self, DefaultValueConfig};
use crate::error::Result;
use crate::item::{FieldItem, ItemValue};
use crate::label::entity_label;
use crate::lookup::{EntityLookup, LabelResolver};
use crate::settings::FieldSettings;
use crate::types::{Entity, EntityId, ItemValues};
use crate::validation::{TextOrValidReference, Violation};

/// The items of a text-or-entity-reference field, one per delta.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldItemList {
    settings: FieldSettings,
    items: Vec<FieldItem>,
}

impl FieldItemList {
    pub fn new(settings: FieldSettings) -> Self {
        Self {
            settings,
            items: Vec::new(),
        }
    }

    /// Build a list from raw item maps.
    pub fn from_values(settings: FieldSettings, values: Vec<ItemValues>) -> Result<Self> {
        let mut list = Self::new(settings);
        list.set_values(values)?;
        Ok(list)
    }

    /// Replace all items from raw item maps.
    pub fn set_values(&mut self, values: Vec<ItemValues>) -> Result<()> {
        self.items = values
            .into_iter()
            .map(FieldItem::from_values)
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    /// The raw item maps, one per delta.
    pub fn values(&self) -> Vec<ItemValues> {
        self.items.iter().map(FieldItem::values).collect()
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn target_type(&self) -> &str {
        &self.settings.target_type
    }

    pub fn push(&mut self, item: FieldItem) {
        self.items.push(item);
    }

    pub fn get(&self, delta: usize) -> Option<&FieldItem> {
        self.items.get(delta)
    }

    pub fn get_mut(&mut self, delta: usize) -> Option<&mut FieldItem> {
        self.items.get_mut(delta)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no item holds a value.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(FieldItem::is_empty)
    }

    /// Drop empty items and renumber the rest.
    pub fn filter_empty_items(&mut self) {
        self.items.retain(|item| !item.is_empty());
    }

    /// Run pre-persist resolution on every item.
    pub fn pre_save(&mut self) {
        for item in &mut self.items {
            item.pre_save();
        }
    }

    /// Validate every item with the text-or-valid-reference rule.
    pub async fn validate(&self, lookup: &dyn EntityLookup) -> Vec<Violation> {
        TextOrValidReference::new().validate(self, lookup).await
    }

    /// Display values per delta: the derived label of a referenced entity,
    /// or the text.
    ///
    /// A reference that does not load is shown as its raw id.
    pub async fn field_item_values(
        &self,
        lookup: &dyn EntityLookup,
        labels: &dyn LabelResolver,
    ) -> BTreeMap<usize, String> {
        let mut values = BTreeMap::new();
        for (delta, item) in self.items.iter().enumerate() {
            match item.item_value() {
                ItemValue::Reference { target_id, entity } => {
                    let loaded = match entity {
                        Some(entity) => Some(entity.clone()),
                        None => lookup.load(self.target_type(), target_id).await,
                    };
                    let value = match loaded {
                        Some(entity) => entity_label(&entity, labels),
                        None => target_id.to_string(),
                    };
                    values.insert(delta, value);
                }
                ItemValue::Text(text) => {
                    values.insert(delta, text.clone());
                }
                ItemValue::Pending(_) | ItemValue::Empty => {}
            }
        }
        values
    }

    /// The referenced entities per delta: stored entities that load, plus
    /// unsaved entities held by their items.
    pub async fn referenced_entities(&self, lookup: &dyn EntityLookup) -> BTreeMap<usize, Entity> {
        let mut target_entities = BTreeMap::new();
        let mut ids: Vec<(usize, EntityId)> = Vec::new();

        for (delta, item) in self.items.iter().enumerate() {
            match item.item_value() {
                ItemValue::Reference { target_id, .. } => ids.push((delta, target_id.clone())),
                ItemValue::Pending(entity) if entity.is_new => {
                    target_entities.insert(delta, entity.clone());
                }
                _ => {}
            }
        }

        if !ids.is_empty() {
            let wanted: Vec<EntityId> = ids.iter().map(|(_, id)| id.clone()).collect();
            let loaded = lookup.load_multiple(self.target_type(), &wanted).await;
            for (delta, id) in ids {
                match loaded.iter().find(|e| e.id.as_ref() == Some(&id)) {
                    Some(entity) => {
                        target_entities.insert(delta, entity.clone());
                    }
                    None => debug!(delta, %id, "referenced entity not found"),
                }
            }
        }

        target_entities
    }

    /// Apply a configured default value: portable UUIDs are resolved to local
    /// ids, and entries that no longer resolve are dropped.
    pub async fn apply_default_value(
        &mut self,
        config: &DefaultValueConfig,
        lookup: &dyn EntityLookup,
    ) -> Result<()> {
        let values =
            defaults::process_default_value(config.default_value.clone(), self.target_type(), lookup)
                .await;
        self.set_values(values)
    }

    /// The current values as a portable default value for configuration.
    pub async fn default_value_config(&self, lookup: &dyn EntityLookup) -> DefaultValueConfig {
        let default_value =
            defaults::default_value_for_config(self.values(), self.target_type(), lookup).await;
        DefaultValueConfig { default_value }
    }
}

impl<'a> IntoIterator for &'a FieldItemList {
    type Item = &'a FieldItem;
    type IntoIter = std::slice::Iter<'a, FieldItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
