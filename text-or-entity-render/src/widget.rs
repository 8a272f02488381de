//! The text-or-entity autocomplete widget.

use serde::{Deserialize, Serialize};
use text_or_entity_field::autocomplete::ELEMENT_TYPE;
use text_or_entity_field::{
    AutocompleteElement, EntityId, EntityLookup, FieldItemList, FieldSettings, ItemValues,
    LabelResolver, MatchProblem, Selection,
};
use tracing::debug;

/// Description of the edit element for one delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub target_type: String,
    pub selection_handler: String,
    pub selection_settings: Selection,
    /// References are validated by the field, not the element
    pub validate_reference: bool,
    pub maxlength: usize,
    pub default_value: Option<String>,
    pub size: usize,
    pub placeholder: String,
}

/// The `target_id` slot of a submitted row: a bare id or a nested item map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedTarget {
    Id(EntityId),
    Nested(ItemValues),
}

/// One submitted widget row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<SubmittedTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WidgetValue {
    /// Flatten a nested item map into the row; text already on the row wins.
    fn flatten(self) -> ItemValues {
        match self.target_id {
            Some(SubmittedTarget::Nested(nested)) => ItemValues {
                target_id: nested.target_id,
                text: self.text.or(nested.text),
                target_uuid: None,
            },
            Some(SubmittedTarget::Id(id)) => ItemValues {
                target_id: Some(id),
                text: self.text,
                target_uuid: None,
            },
            None => ItemValues {
                target_id: None,
                text: self.text,
                target_uuid: None,
            },
        }
    }
}

/// Autocomplete widget bound to one field.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteWidget {
    settings: FieldSettings,
}

impl AutocompleteWidget {
    pub fn new(settings: FieldSettings) -> Self {
        Self { settings }
    }

    /// The element that resolves this widget's submissions.
    pub fn element(&self) -> AutocompleteElement {
        AutocompleteElement::new(&self.settings)
    }

    /// Build the edit element for `delta`, prefilled with its display value.
    pub async fn form_element(
        &self,
        items: &FieldItemList,
        delta: usize,
        lookup: &dyn EntityLookup,
        labels: &dyn LabelResolver,
    ) -> FormElement {
        let mut field_values = items.field_item_values(lookup, labels).await;
        let widget = &self.settings.widget;

        FormElement {
            element_type: ELEMENT_TYPE.to_string(),
            target_type: self.settings.target_type.clone(),
            selection_handler: self.settings.handler.clone(),
            selection_settings: self.settings.selection(),
            validate_reference: false,
            maxlength: self.settings.max_length,
            default_value: field_values.remove(&delta),
            size: widget.size,
            placeholder: widget.placeholder.clone(),
        }
    }

    /// Resolve a typed string into item values.
    pub async fn submit(
        &self,
        input: &str,
        lookup: &dyn EntityLookup,
    ) -> (ItemValues, Option<MatchProblem>) {
        let submission = self.element().resolve(input, lookup).await;
        (submission.resolution.into_values(), submission.problem)
    }

    /// Normalize submitted rows into item values.
    ///
    /// Nested `target_id` maps are flattened, and ids that do not load are
    /// kept as text.
    pub async fn massage_form_values(
        &self,
        values: Vec<WidgetValue>,
        lookup: &dyn EntityLookup,
    ) -> Vec<ItemValues> {
        let mut massaged = Vec::with_capacity(values.len());
        for value in values {
            let mut value = value.flatten();
            if let Some(id) = value.non_empty_target_id().cloned() {
                if lookup.load(&self.settings.target_type, &id).await.is_none() {
                    debug!(%id, "submitted id did not load, keeping it as text");
                    value.target_id = None;
                    value.text = Some(id.to_string());
                }
            }
            massaged.push(value);
        }
        massaged
    }
}
