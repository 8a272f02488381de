//! Text-or-entity-reference field values
//!
//! `text-or-entity-field` models a field value that is either a reference to an
//! existing entity or a free-text fallback. It knows nothing about the host's
//! storage, access control, or rendering. Consumers provide those through the
//! [`EntityLookup`] and [`LabelResolver`] capabilities.
//!
//! # Architecture
//!
//! - **One slot, one representation**: [`ItemValue`] is a tagged union, so a
//!   reference and a text can never both be set
//! - **Validation**: an id that does not resolve is length-checked as text
//! - **Autocomplete**: submitted strings resolve to `label (id)`, a bare id, a
//!   unique label match, or literal text
//! - **Portable defaults**: configured default values carry UUIDs, resolved to
//!   local ids on load and restored on save

pub mod autocomplete;
pub mod defaults;
pub mod error;
pub mod item;
pub mod label;
pub mod list;
pub mod lookup;
pub mod schema;
pub mod settings;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use autocomplete::{
    extract_entity_id, AutocompleteElement, MatchProblem, Resolution, SubmittedInput, Submission,
    TargetIds,
};
pub use defaults::DefaultValueConfig;
pub use error::{FieldError, Result};
pub use item::{FieldItem, ItemValue};
pub use label::{entity_label, PlainLabels, RESTRICTED_LABEL};
pub use list::FieldItemList;
pub use lookup::{EntityLookup, LabelResolver};
pub use schema::{ColumnSpec, ColumnType, StorageSchema};
pub use settings::{FieldSettings, FormatterSettings, HandlerSettings, MatchOperator, Selection, WidgetSettings};
pub use types::{Entity, EntityId, IdFormat, ItemValues};
pub use validation::{TextOrValidReference, Violation, LONG_TEXT_MESSAGE};
