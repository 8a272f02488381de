//! Storage schema of the field: the reference column, the text column, and
//! their indexes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::settings::FieldSettings;
use crate::types::IdFormat;

/// Length of string id columns.
pub const STRING_ID_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Int,
    VarcharAscii,
    Varchar,
}

/// One storage column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default)]
    pub unsigned: bool,
    pub description: String,
}

/// Columns and indexes, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSchema {
    pub columns: IndexMap<String, ColumnSpec>,
    pub indexes: IndexMap<String, Vec<String>>,
}

impl StorageSchema {
    /// The schema for a field with `settings`, whose target ids follow
    /// `id_format`.
    pub fn for_settings(settings: &FieldSettings, id_format: IdFormat) -> Self {
        let target_id = match id_format {
            IdFormat::Integer => ColumnSpec {
                column_type: ColumnType::Int,
                length: None,
                unsigned: true,
                description: "The ID of the target entity.".into(),
            },
            IdFormat::String => ColumnSpec {
                column_type: ColumnType::VarcharAscii,
                length: Some(STRING_ID_LENGTH),
                unsigned: false,
                description: "The ID of the target entity.".into(),
            },
        };

        let mut columns = IndexMap::new();
        columns.insert("target_id".to_string(), target_id);
        columns.insert(
            "text".to_string(),
            ColumnSpec {
                column_type: ColumnType::Varchar,
                length: Some(settings.max_length),
                unsigned: false,
                description: "Free text used when no entity is referenced.".into(),
            },
        );

        let mut indexes = IndexMap::new();
        indexes.insert("target_id".to_string(), vec!["target_id".to_string()]);
        indexes.insert("text".to_string(), vec!["text".to_string()]);

        Self { columns, indexes }
    }
}
