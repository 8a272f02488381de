//! Presentation adapters for text-or-entity-reference fields
//!
//! Thin mappings between [`FieldItemList`](text_or_entity_field::FieldItemList)
//! and the outside world:
//!
//! - [`LabelFormatter`] turns items into links or plain text
//! - [`AutocompleteWidget`] describes the edit element and normalizes its
//!   submitted values
//! - [`TextOrEntityEnhancer`] converts items to and from JSON:API payloads

pub mod error;
pub mod formatter;
pub mod jsonapi;
pub mod widget;

pub use error::{RenderError, Result};
pub use formatter::{LabelFormatter, LinkResolver, RenderElement};
pub use jsonapi::TextOrEntityEnhancer;
pub use widget::{AutocompleteWidget, FormElement, SubmittedTarget, WidgetValue};
