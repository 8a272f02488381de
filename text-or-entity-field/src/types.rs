//! Core value types: entity identifiers, entity handles, and the raw item map.
//!
//! All types serialize via serde. Entity ids are opaque strings; integer ids
//! from configuration or API payloads are accepted and normalized to strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque identifier of a referenced entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => Self(s),
            Raw::Int(n) => Self(n.to_string()),
        })
    }
}

/// The id pattern of an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdFormat {
    /// Serial integer ids (content entities)
    Integer,
    /// Machine-name string ids (configuration entities)
    String,
}

impl IdFormat {
    /// Whether `id` is a well-formed id for this format.
    pub fn accepts(&self, id: &str) -> bool {
        match self {
            IdFormat::Integer => !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()),
            IdFormat::String => {
                !id.is_empty()
                    && id
                        .chars()
                        .all(|c| !c.is_whitespace() && c != '(' && c != ')')
            }
        }
    }
}

/// A handle to an entity supplied by the host's storage.
///
/// Entities created inline (autocreated) have no id until the host saves them
/// and report `is_new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub bundle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub uuid: Uuid,
    pub label: String,
    #[serde(default)]
    pub is_new: bool,
}

impl Entity {
    /// A persisted entity with a fresh UUID.
    pub fn new(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        id: impl Into<EntityId>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            id: Some(id.into()),
            uuid: Uuid::new_v4(),
            label: label.into(),
            is_new: false,
        }
    }

    /// An entity that has not been saved yet.
    pub fn unsaved(
        entity_type: impl Into<String>,
        bundle: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            bundle: bundle.into(),
            id: None,
            uuid: Uuid::new_v4(),
            label: label.into(),
            is_new: true,
        }
    }

    pub fn with_uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = uuid;
        self
    }

    /// Cache tags the entity contributes to anything rendered from it.
    pub fn cache_tags(&self) -> Vec<String> {
        match &self.id {
            Some(id) if !self.is_new => vec![format!("{}:{}", self.entity_type, id)],
            _ => Vec::new(),
        }
    }

    /// The `<entity_type>--<bundle>` resource type name.
    pub fn resource_type(&self) -> String {
        format!("{}--{}", self.entity_type, self.bundle)
    }
}

/// The raw map form of a field item, as stored and as configured.
///
/// `target_uuid` only appears in portable default values and is resolved to
/// `target_id` before the values reach an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_uuid: Option<Uuid>,
}

impl ItemValues {
    pub fn reference(id: impl Into<EntityId>) -> Self {
        Self {
            target_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn portable(uuid: Uuid) -> Self {
        Self {
            target_uuid: Some(uuid),
            ..Self::default()
        }
    }

    /// The target id, if present and non-empty.
    pub fn non_empty_target_id(&self) -> Option<&EntityId> {
        self.target_id.as_ref().filter(|id| !id.is_empty())
    }

    /// The text, if present and non-empty.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}
