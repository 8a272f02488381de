//! Label derivation shared by the autocomplete element and the item list.

use crate::lookup::LabelResolver;
use crate::types::Entity;

/// Placeholder shown instead of a label the user may not see.
pub const RESTRICTED_LABEL: &str = "- Restricted access -";

/// The externally visible label of an entity.
///
/// The access-checked label, or [`RESTRICTED_LABEL`]; persisted entities get
/// their id appended in parentheses so the autocomplete parser can read it
/// back.
pub fn entity_label(entity: &Entity, labels: &dyn LabelResolver) -> String {
    let mut label = labels
        .view_label(entity, None)
        .unwrap_or_else(|| RESTRICTED_LABEL.to_string());

    if !entity.is_new {
        if let Some(id) = &entity.id {
            label.push_str(&format!(" ({id})"));
        }
    }

    label
}

/// A resolver that grants access to every label, untranslated.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainLabels;

impl LabelResolver for PlainLabels {
    fn view_label(&self, entity: &Entity, _langcode: Option<&str>) -> Option<String> {
        Some(entity.label.clone())
    }
}
