//! In-memory collaborators for tests.
//!
//! `MemoryStore` implements [`EntityLookup`] and [`LabelResolver`] over a
//! plain list of entities, with per-entity access switches.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use uuid::Uuid;

use crate::lookup::{EntityLookup, LabelResolver};
use crate::settings::Selection;
use crate::types::{Entity, EntityId, IdFormat};

/// Entity storage held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: Vec<Entity>,
    next_id: u64,
    restricted_labels: HashSet<Uuid>,
    hidden: HashSet<Uuid>,
    id_formats: HashMap<String, IdFormat>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store an entity with the next serial id.
    pub fn create(&mut self, entity_type: &str, bundle: &str, label: &str) -> Entity {
        self.next_id += 1;
        let entity = Entity::new(entity_type, bundle, self.next_id, label);
        self.entities.push(entity.clone());
        entity
    }

    /// Store an entity as given.
    pub fn insert(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Delete an entity by id.
    pub fn remove(&mut self, entity_type: &str, id: &EntityId) {
        self.entities
            .retain(|e| !(e.entity_type == entity_type && e.id.as_ref() == Some(id)));
    }

    /// Deny "view label" access to an entity.
    pub fn restrict_label(&mut self, entity: &Entity) {
        self.restricted_labels.insert(entity.uuid);
    }

    /// Deny "view" access to an entity.
    pub fn hide(&mut self, entity: &Entity) {
        self.hidden.insert(entity.uuid);
    }

    pub fn set_id_format(&mut self, entity_type: &str, format: IdFormat) {
        self.id_formats.insert(entity_type.to_string(), format);
    }

    fn find(&self, entity_type: &str, id: &EntityId) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.entity_type == entity_type && e.id.as_ref() == Some(id))
    }
}

#[async_trait]
impl EntityLookup for MemoryStore {
    async fn load(&self, entity_type: &str, id: &EntityId) -> Option<Entity> {
        self.find(entity_type, id).cloned()
    }

    async fn load_by_uuid(&self, entity_type: &str, uuids: &[Uuid]) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|e| e.entity_type == entity_type && uuids.contains(&e.uuid))
            .cloned()
            .collect()
    }

    async fn match_label(
        &self,
        entity_type: &str,
        label: &str,
        selection: &Selection,
    ) -> Vec<Entity> {
        self.entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .filter(|e| selection.allows_bundle(&e.bundle))
            .filter(|e| selection.match_operator.matches(&e.label, label))
            .take(selection.match_limit)
            .cloned()
            .collect()
    }

    fn id_format(&self, entity_type: &str) -> IdFormat {
        self.id_formats
            .get(entity_type)
            .copied()
            .unwrap_or(IdFormat::Integer)
    }
}

impl LabelResolver for MemoryStore {
    fn view_label(&self, entity: &Entity, _langcode: Option<&str>) -> Option<String> {
        if self.restricted_labels.contains(&entity.uuid) {
            None
        } else {
            Some(entity.label.clone())
        }
    }

    fn can_view(&self, entity: &Entity) -> bool {
        !self.hidden.contains(&entity.uuid)
    }
}
