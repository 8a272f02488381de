//! Capabilities the host supplies: entity loading and label access.

use async_trait::async_trait;
use uuid::Uuid;

use crate::settings::Selection;
use crate::types::{Entity, EntityId, IdFormat};

/// Read access to the host's entity storage.
///
/// Every failure to load is reported as absence; implementations never
/// surface storage errors to the field.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    /// Load one entity by id.
    async fn load(&self, entity_type: &str, id: &EntityId) -> Option<Entity>;

    /// Load the stored version of an entity, ignoring in-flight changes.
    async fn load_unchanged(&self, entity_type: &str, id: &EntityId) -> Option<Entity> {
        self.load(entity_type, id).await
    }

    /// Load several entities; missing ids are skipped.
    async fn load_multiple(&self, entity_type: &str, ids: &[EntityId]) -> Vec<Entity> {
        let mut entities = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.load(entity_type, id).await {
                entities.push(entity);
            }
        }
        entities
    }

    /// Load the entities carrying any of the given UUIDs.
    async fn load_by_uuid(&self, entity_type: &str, uuids: &[Uuid]) -> Vec<Entity>;

    /// Referenceable entities whose label matches `label` under `selection`,
    /// at most `selection.match_limit` of them.
    async fn match_label(&self, entity_type: &str, label: &str, selection: &Selection)
        -> Vec<Entity>;

    /// The id pattern of `entity_type`.
    fn id_format(&self, _entity_type: &str) -> IdFormat {
        IdFormat::Integer
    }
}

/// Access-checked labels.
pub trait LabelResolver: Send + Sync {
    /// The entity's label, translated for `langcode`, when the current user
    /// may view it. `None` means access is denied.
    fn view_label(&self, entity: &Entity, langcode: Option<&str>) -> Option<String>;

    /// Whether the current user may view the entity itself.
    fn can_view(&self, _entity: &Entity) -> bool {
        true
    }
}
