//! JSON:API field enhancer.
//!
//! A reference is exposed as a resource identifier
//! `{"type": "<entity_type>--<bundle>", "id": "<id>"}`, text as a bare string,
//! and an empty item as `null`.

use serde_json::{json, Value};
use text_or_entity_field::{EntityId, EntityLookup, ItemValues};
use tracing::debug;

use crate::error::{RenderError, Result};

/// Converts items to and from their JSON:API representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOrEntityEnhancer;

impl TextOrEntityEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Item values to API output.
    ///
    /// An id that no longer loads is exposed as text.
    pub async fn undo_transform(
        &self,
        values: &ItemValues,
        target_type: &str,
        lookup: &dyn EntityLookup,
    ) -> Value {
        if let Some(id) = values.non_empty_target_id() {
            return match lookup.load(target_type, id).await {
                Some(entity) => json!({
                    "type": entity.resource_type(),
                    "id": id,
                }),
                None => {
                    debug!(%id, target_type, "exposing unresolved reference as text");
                    Value::String(id.to_string())
                }
            };
        }
        match values.non_empty_text() {
            Some(text) => Value::String(text.to_string()),
            None => Value::Null,
        }
    }

    /// API input to item values.
    pub fn transform(&self, data: &Value, target_type: &str) -> Result<ItemValues> {
        match data {
            Value::Null => Ok(ItemValues::default()),
            Value::String(text) => Ok(ItemValues::text(text.clone())),
            Value::Object(object) => {
                let resource_type = object
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RenderError::invalid_payload("resource identifier has no type"))?;
                let prefix = format!("{target_type}--");
                if !resource_type.starts_with(&prefix) {
                    return Err(RenderError::invalid_payload(format!(
                        "resource type '{resource_type}' is not a {target_type}"
                    )));
                }
                let id: EntityId = match object.get("id") {
                    Some(id) => serde_json::from_value(id.clone())?,
                    None => return Err(RenderError::invalid_payload("resource identifier has no id")),
                };
                Ok(ItemValues::reference(id))
            }
            other => Err(RenderError::invalid_payload(format!(
                "expected an object, a string or null, got {other}"
            ))),
        }
    }

    /// Schema of the API output.
    pub fn output_json_schema(&self) -> Value {
        json!({
            "oneOf": [
                {"type": "object"},
                {"type": "string"},
                {"type": "null"},
            ]
        })
    }
}
