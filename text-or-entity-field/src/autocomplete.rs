//! The text-or-entity autocomplete element.
//!
//! A submitted string resolves, in order, to:
//! 1. the id in a trailing `label (id)`, if the id is well formed
//! 2. the entity whose id is the whole string
//! 3. the single entity whose label equals the string
//! 4. otherwise, literal text
//!
//! The element never creates entities.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::{FieldError, Result};
use crate::item::FieldItem;
use crate::label::entity_label;
use crate::lookup::{EntityLookup, LabelResolver};
use crate::settings::{FieldSettings, Selection};
use crate::types::{Entity, EntityId, ItemValues};

/// Form element type name.
pub const ELEMENT_TYPE: &str = "text_or_entity_autocomplete";

/// Label matches fetched when resolving typed input; more than
/// [`MAX_LISTED_MATCHES`] means "too many to list".
const LABEL_MATCH_LIMIT: usize = 6;
const MAX_LISTED_MATCHES: usize = 5;

static AUTOCOMPLETE_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn autocomplete_id_regex() -> &'static Regex {
    AUTOCOMPLETE_ID_REGEX.get_or_init(|| {
        Regex::new(r"^.+\s\(([^)]+)\)$").expect("Invalid autocomplete id regex")
    })
}

/// Extract the id from input of the form `label (id)`.
pub fn extract_entity_id(input: &str) -> Option<&str> {
    autocomplete_id_regex()
        .captures(input.trim())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// What a submitted string resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing was submitted; both slots are cleared.
    Empty,
    Reference(EntityId),
    Text(String),
}

impl Resolution {
    /// Write the resolution into an item through its setters.
    pub fn apply_to(&self, item: &mut FieldItem) {
        match self {
            Resolution::Empty => item.set_text(None::<String>),
            Resolution::Reference(id) => item.set_target_id(id.clone()),
            Resolution::Text(text) => item.set_text(text.clone()),
        }
    }

    pub fn into_values(self) -> ItemValues {
        match self {
            Resolution::Empty => ItemValues::default(),
            Resolution::Reference(id) => ItemValues::reference(id),
            Resolution::Text(text) => ItemValues::text(text),
        }
    }
}

/// A label match that could not pick a single entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchProblem {
    #[error(
        "Multiple entities match this reference; \"{}\". Specify the one you want by appending the id in parentheses, like \"{input} ({example_id})\".",
        .candidates.join("\", \"")
    )]
    Multiple {
        input: String,
        candidates: Vec<String>,
        example_id: EntityId,
    },

    #[error(
        "Many entities are called {input}. Specify the one you want by appending the id in parentheses, like \"{input} ({example_id})\"."
    )]
    Many { input: String, example_id: EntityId },
}

/// The outcome of resolving a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub resolution: Resolution,
    /// Reported to the user; the resolution still falls back to text.
    pub problem: Option<MatchProblem>,
}

impl Submission {
    fn resolved(resolution: Resolution) -> Self {
        Self {
            resolution,
            problem: None,
        }
    }
}

/// Ids submitted in structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetIds {
    One(EntityId),
    Many(Vec<EntityId>),
}

impl TargetIds {
    pub fn to_vec(&self) -> Vec<EntityId> {
        match self {
            TargetIds::One(id) => vec![id.clone()],
            TargetIds::Many(ids) => ids.clone(),
        }
    }
}

/// Input submitted to the element: a flat string or `{target_id: ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedInput {
    Text(String),
    Structured { target_id: TargetIds },
}

/// An autocomplete element bound to one field.
#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteElement {
    pub target_type: String,
    pub selection_handler: String,
    pub selection: Selection,
    pub process_default_value: bool,
}

impl AutocompleteElement {
    pub fn new(settings: &FieldSettings) -> Self {
        Self {
            target_type: settings.target_type.clone(),
            selection_handler: settings.handler.clone(),
            selection: settings.selection(),
            process_default_value: true,
        }
    }

    /// Inline entity creation is always off.
    pub fn autocreate(&self) -> bool {
        false
    }

    /// The display string for the element's default value.
    ///
    /// Accepts an entity, a string, or null; arrays and other shapes are
    /// rejected.
    pub fn default_value_label(
        &self,
        default: &Value,
        labels: &dyn LabelResolver,
    ) -> Result<Option<String>> {
        if !self.process_default_value {
            return Ok(None);
        }
        match default {
            Value::Null => Ok(None),
            Value::Array(_) => Err(FieldError::invalid_argument(
                "the default value is an array but the element does not allow multiple values",
            )),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Object(_) => {
                let entity: Entity = serde_json::from_value(default.clone()).map_err(|_| {
                    FieldError::invalid_argument(
                        "the default value has to be an entity object or a string",
                    )
                })?;
                Ok(Some(entity_label(&entity, labels)))
            }
            _ => Err(FieldError::invalid_argument(
                "the default value has to be an entity object or a string",
            )),
        }
    }

    /// The display string for submitted input.
    ///
    /// Structured ids are loaded and their labels joined; when nothing
    /// loads, the raw ids are shown.
    pub async fn submitted_value_label(
        &self,
        input: &SubmittedInput,
        lookup: &dyn EntityLookup,
        labels: &dyn LabelResolver,
    ) -> String {
        match input {
            SubmittedInput::Text(text) => text.clone(),
            SubmittedInput::Structured { target_id } => {
                let ids = target_id.to_vec();
                let entities = lookup.load_multiple(&self.target_type, &ids).await;
                if entities.is_empty() {
                    return ids
                        .iter()
                        .map(EntityId::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                }
                entities
                    .iter()
                    .map(|entity| entity_label(entity, labels))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
    }

    /// Resolve `input` and write the outcome into `item`.
    pub async fn apply(
        &self,
        item: &mut FieldItem,
        input: &str,
        lookup: &dyn EntityLookup,
    ) -> Option<MatchProblem> {
        let submission = self.resolve(input, lookup).await;
        submission.resolution.apply_to(item);
        submission.problem
    }

    /// Resolve a submitted string to a reference or literal text.
    pub async fn resolve(&self, input: &str, lookup: &dyn EntityLookup) -> Submission {
        let trimmed = input.trim();
        // Whitespace-only input clears the item instead of storing blanks.
        if trimmed.is_empty() {
            return Submission::resolved(Resolution::Empty);
        }

        let id_format = lookup.id_format(&self.target_type);

        if let Some(id) = extract_entity_id(trimmed) {
            if id_format.accepts(id) {
                debug!(id, "autocomplete input carries an id");
                return Submission::resolved(Resolution::Reference(EntityId::from(id)));
            }
            debug!(id, ?id_format, "ignoring malformed id in autocomplete input");
        }

        if id_format.accepts(trimmed) {
            let candidate = EntityId::from(trimmed);
            if let Some(entity) = lookup.load(&self.target_type, &candidate).await {
                let id = entity.id.unwrap_or(candidate);
                return Submission::resolved(Resolution::Reference(id));
            }
        }

        let selection = self.selection.exact(LABEL_MATCH_LIMIT);
        let matches: Vec<(EntityId, String)> = lookup
            .match_label(&self.target_type, trimmed, &selection)
            .await
            .into_iter()
            .filter_map(|entity| entity.id.map(|id| (id, entity.label)))
            .collect();

        let problem = match matches.as_slice() {
            [] => None,
            [(id, _)] => return Submission::resolved(Resolution::Reference(id.clone())),
            [.., (example_id, _)] => {
                debug!(input = trimmed, count = matches.len(), "ambiguous label match");
                if matches.len() > MAX_LISTED_MATCHES {
                    Some(MatchProblem::Many {
                        input: trimmed.to_string(),
                        example_id: example_id.clone(),
                    })
                } else {
                    Some(MatchProblem::Multiple {
                        input: trimmed.to_string(),
                        candidates: matches
                            .iter()
                            .map(|(id, label)| format!("{label} ({id})"))
                            .collect(),
                        example_id: example_id.clone(),
                    })
                }
            }
        };

        Submission {
            resolution: Resolution::Text(input.to_string()),
            problem,
        }
    }
}
