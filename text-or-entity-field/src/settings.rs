//! Field settings and their loading through figment.
//!
//! Settings are layered in precedence order (later sources override earlier
//! ones):
//! 1. Built-in defaults
//! 2. A settings file (TOML, YAML, or JSON, chosen by extension)
//! 3. Environment variables prefixed with `TEXT_OR_ENTITY_`, nested keys
//!    separated by `__` (e.g. `TEXT_OR_ENTITY_WIDGET__SIZE=40`)

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldError, Result};

/// Default maximum text length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 255;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "TEXT_OR_ENTITY_";

/// How a label query compares the input with entity labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOperator {
    #[default]
    #[serde(rename = "CONTAINS")]
    Contains,
    #[serde(rename = "STARTS_WITH")]
    StartsWith,
    #[serde(rename = "=")]
    Equals,
}

impl MatchOperator {
    /// Whether `label` matches `input` under this operator (case-insensitive).
    pub fn matches(&self, label: &str, input: &str) -> bool {
        let label = label.to_lowercase();
        let input = input.to_lowercase();
        match self {
            MatchOperator::Contains => label.contains(&input),
            MatchOperator::StartsWith => label.starts_with(&input),
            MatchOperator::Equals => label == input,
        }
    }
}

/// Settings of the selection handler that finds referenceable entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_bundles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
}

/// Autocomplete widget settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub match_operator: MatchOperator,
    pub match_limit: usize,
    pub size: usize,
    pub placeholder: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            match_operator: MatchOperator::Contains,
            match_limit: 10,
            size: 60,
            placeholder: String::new(),
        }
    }
}

/// Label formatter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    pub link: bool,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self { link: true }
    }
}

/// The query a selection handler runs: handler settings plus match rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_bundles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    pub match_operator: MatchOperator,
    pub match_limit: usize,
}

impl Selection {
    /// The same selection restricted to exact label matches, at most `limit`.
    pub fn exact(&self, limit: usize) -> Self {
        Self {
            match_operator: MatchOperator::Equals,
            match_limit: limit,
            ..self.clone()
        }
    }

    /// Whether an entity of `bundle` is referenceable under this selection.
    pub fn allows_bundle(&self, bundle: &str) -> bool {
        self.target_bundles
            .as_ref()
            .is_none_or(|bundles| bundles.iter().any(|b| b == bundle))
    }
}

/// Storage, field, widget, and formatter settings for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Entity type the field references
    pub target_type: String,
    /// Maximum text length, in characters
    pub max_length: usize,
    /// Selection handler id
    pub handler: String,
    pub handler_settings: HandlerSettings,
    pub widget: WidgetSettings,
    pub formatter: FormatterSettings,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            target_type: String::new(),
            max_length: DEFAULT_MAX_LENGTH,
            handler: "default".to_string(),
            handler_settings: HandlerSettings::default(),
            widget: WidgetSettings::default(),
            formatter: FormatterSettings::default(),
        }
    }
}

impl FieldSettings {
    /// Settings referencing `target_type` with everything else defaulted.
    pub fn new(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            ..Self::default()
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_link(mut self, link: bool) -> Self {
        self.formatter.link = link;
        self
    }

    /// Load settings from defaults, a settings file, and the environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::from(Toml::file(path)),
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            other => {
                return Err(FieldError::invalid_setting(
                    "path",
                    format!("unsupported settings format: {}", other.unwrap_or("<none>")),
                ))
            }
        };

        debug!(path = %path.display(), "loading field settings");
        let figment = Figment::from(Serialized::defaults(FieldSettings::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    /// Extract and validate settings from an assembled figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let settings: FieldSettings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the field cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.target_type.trim().is_empty() {
            return Err(FieldError::invalid_setting(
                "target_type",
                "a target entity type is required",
            ));
        }
        if self.max_length < 1 {
            return Err(FieldError::invalid_setting(
                "max_length",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// The selection the autocomplete widget queries with.
    pub fn selection(&self) -> Selection {
        Selection {
            target_bundles: self.handler_settings.target_bundles.clone(),
            sort_field: self.handler_settings.sort_field.clone(),
            match_operator: self.widget.match_operator,
            match_limit: self.widget.match_limit,
        }
    }
}
