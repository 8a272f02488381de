//! Portable default values.
//!
//! Local entity ids differ between environments, so configured default values
//! reference entities by UUID. On load each UUID is resolved to the local id;
//! entries whose UUID no longer resolves are dropped and the rest renumbered.
//! On save local ids are converted back to UUIDs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::lookup::EntityLookup;
use crate::types::{EntityId, ItemValues};

/// A field's configured default value, as stored in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultValueConfig {
    #[serde(default)]
    pub default_value: Vec<ItemValues>,
}

impl DefaultValueConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Resolve portable `target_uuid` entries to local `target_id`s.
///
/// Entries that cannot be resolved are dropped; the result has consecutive
/// deltas.
pub async fn process_default_value(
    values: Vec<ItemValues>,
    target_type: &str,
    lookup: &dyn EntityLookup,
) -> Vec<ItemValues> {
    let uuids: Vec<Uuid> = values.iter().filter_map(|v| v.target_uuid).collect();
    if uuids.is_empty() {
        return values;
    }

    let ids_by_uuid: HashMap<Uuid, EntityId> = lookup
        .load_by_uuid(target_type, &uuids)
        .await
        .into_iter()
        .filter_map(|entity| entity.id.map(|id| (entity.uuid, id)))
        .collect();

    values
        .into_iter()
        .filter_map(|mut value| {
            let Some(uuid) = value.target_uuid else {
                return Some(value);
            };
            match ids_by_uuid.get(&uuid) {
                Some(id) => {
                    value.target_id = Some(id.clone());
                    value.target_uuid = None;
                    Some(value)
                }
                None => {
                    debug!(%uuid, target_type, "dropping default value for unknown entity");
                    None
                }
            }
        })
        .collect()
}

/// Convert local `target_id`s to portable `target_uuid`s for configuration.
///
/// An id that does not load is kept as-is.
pub async fn default_value_for_config(
    values: Vec<ItemValues>,
    target_type: &str,
    lookup: &dyn EntityLookup,
) -> Vec<ItemValues> {
    let ids: Vec<EntityId> = values
        .iter()
        .filter_map(|v| v.non_empty_target_id().cloned())
        .collect();
    if ids.is_empty() {
        return values;
    }

    let uuids_by_id: HashMap<EntityId, Uuid> = lookup
        .load_multiple(target_type, &ids)
        .await
        .into_iter()
        .filter_map(|entity| entity.id.map(|id| (id, entity.uuid)))
        .collect();

    values
        .into_iter()
        .map(|mut value| {
            let Some(id) = value.non_empty_target_id().cloned() else {
                return value;
            };
            match uuids_by_id.get(&id) {
                Some(uuid) => {
                    value.target_id = None;
                    value.target_uuid = Some(*uuid);
                }
                None => warn!(%id, target_type, "default value references a missing entity"),
            }
            value
        })
        .collect()
}
