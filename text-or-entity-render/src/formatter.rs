//! The label formatter.
//!
//! Referenced entities render as their label, linked to the entity when the
//! `link` setting is on. Free text renders as plain text. Entities the viewer
//! may not see are left out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use text_or_entity_field::{
    Entity, EntityLookup, FieldItemList, FieldSettings, ItemValue, LabelResolver,
};
use tracing::{debug, warn};

use crate::error::{RenderError, Result};

/// Canonical URLs of entities.
pub trait LinkResolver: Send + Sync {
    /// The entity's URL, or [`RenderError::UndefinedLinkTemplate`] when its
    /// type has none.
    fn url(&self, entity: &Entity) -> Result<String>;
}

/// One rendered delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderElement {
    Link {
        title: String,
        url: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cache_tags: Vec<String>,
    },
    PlainText {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cache_tags: Vec<String>,
    },
}

impl RenderElement {
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            cache_tags: Vec::new(),
        }
    }

    pub fn cache_tags(&self) -> &[String] {
        match self {
            RenderElement::Link { cache_tags, .. } | RenderElement::PlainText { cache_tags, .. } => {
                cache_tags
            }
        }
    }
}

/// Formatter rendering text or the referenced entity's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFormatter {
    target_type: String,
    link: bool,
}

impl LabelFormatter {
    pub fn new(settings: &FieldSettings) -> Self {
        Self {
            target_type: settings.target_type.clone(),
            link: settings.formatter.link,
        }
    }

    /// Render every delta that has something to show.
    ///
    /// The first entity without a link template turns linking off for the
    /// rest of the pass.
    pub async fn view_elements(
        &self,
        items: &FieldItemList,
        lookup: &dyn EntityLookup,
        labels: &dyn LabelResolver,
        links: &dyn LinkResolver,
        langcode: Option<&str>,
    ) -> BTreeMap<usize, RenderElement> {
        let mut elements = BTreeMap::new();
        let mut output_as_link = self.link;

        for (delta, item) in items.iter().enumerate() {
            match item.item_value() {
                ItemValue::Reference { target_id, entity } => {
                    let entity = match entity {
                        Some(entity) => Some(entity.clone()),
                        None => lookup.load(&self.target_type, target_id).await,
                    };
                    let Some(entity) = entity else {
                        debug!(delta, %target_id, "referenced entity did not load, skipping");
                        continue;
                    };
                    if !labels.can_view(&entity) {
                        debug!(delta, %target_id, "referenced entity not viewable, skipping");
                        continue;
                    }

                    // View access already passed; fall back to the stored label.
                    let title = labels
                        .view_label(&entity, langcode)
                        .unwrap_or_else(|| entity.label.clone());
                    let cache_tags = entity.cache_tags();

                    let url = if output_as_link {
                        match links.url(&entity) {
                            Ok(url) => Some(url),
                            Err(err) => {
                                warn!(
                                    delta,
                                    entity_type = %entity.entity_type,
                                    error = %err,
                                    "disabling links for the rest of the field"
                                );
                                output_as_link = false;
                                None
                            }
                        }
                    } else {
                        None
                    };

                    let element = match url {
                        Some(url) => RenderElement::Link {
                            title,
                            url,
                            cache_tags,
                        },
                        None => RenderElement::PlainText {
                            text: title,
                            cache_tags,
                        },
                    };
                    elements.insert(delta, element);
                }
                ItemValue::Text(text) => {
                    elements.insert(delta, RenderElement::plain_text(text.clone()));
                }
                ItemValue::Pending(_) | ItemValue::Empty => {}
            }
        }

        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use text_or_entity_field::test_support::MemoryStore;
    use text_or_entity_field::ItemValues;

    struct CanonicalLinks;

    impl LinkResolver for CanonicalLinks {
        fn url(&self, entity: &Entity) -> Result<String> {
            match &entity.id {
                Some(id) => Ok(format!("/{}/{}", entity.entity_type, id)),
                None => Err(RenderError::undefined_link_template(&entity.entity_type)),
            }
        }
    }

    #[tokio::test]
    async fn link_carries_cache_tags() {
        let mut store = MemoryStore::new();
        let entity = store.create("node", "page", "Home");
        let items = FieldItemList::from_values(
            FieldSettings::new("node"),
            vec![ItemValues::reference(entity.id.clone().unwrap())],
        )
        .unwrap();

        let elements = LabelFormatter::new(items.settings())
            .view_elements(&items, &store, &store, &CanonicalLinks, None)
            .await;
        assert_eq!(
            elements[&0],
            RenderElement::Link {
                title: "Home".into(),
                url: "/node/1".into(),
                cache_tags: vec!["node:1".into()],
            }
        );
    }

    #[tokio::test]
    async fn link_off_renders_plain_label() {
        let mut store = MemoryStore::new();
        store.create("node", "page", "Home");
        let items = FieldItemList::from_values(
            FieldSettings::new("node").with_link(false),
            vec![ItemValues::reference("1")],
        )
        .unwrap();

        let elements = LabelFormatter::new(items.settings())
            .view_elements(&items, &store, &store, &CanonicalLinks, None)
            .await;
        assert_eq!(elements[&0].cache_tags(), ["node:1".to_string()]);
        assert!(matches!(&elements[&0], RenderElement::PlainText { text, .. } if text == "Home"));
    }

    #[tokio::test]
    async fn viewable_entity_with_restricted_label_shows_stored_label() {
        let mut store = MemoryStore::new();
        let entity = store.create("node", "page", "Quarterly report");
        store.restrict_label(&entity);
        let items = FieldItemList::from_values(
            FieldSettings::new("node").with_link(false),
            vec![ItemValues::reference("1")],
        )
        .unwrap();

        let elements = LabelFormatter::new(items.settings())
            .view_elements(&items, &store, &store, &CanonicalLinks, None)
            .await;
        assert!(
            matches!(&elements[&0], RenderElement::PlainText { text, .. } if text == "Quarterly report")
        );
    }
}
