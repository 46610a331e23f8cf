//! Field specifications.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// What to read from a matched element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldTarget {
    /// The element's own (direct child) text nodes.
    Text,
    /// A named attribute.
    Attr(String),
}

/// Where a field lives relative to an element scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    /// CSS selector for sub-elements of the scope; `None` targets the scope itself.
    #[serde(default)]
    pub selector: Option<String>,
    /// What to read from each matched element.
    pub target: FieldTarget,
}

impl FieldSpec {
    /// Own text of elements matching `selector`.
    #[must_use]
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            target: FieldTarget::Text,
        }
    }

    /// Attribute `name` of elements matching `selector`.
    #[must_use]
    pub fn attr(selector: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            target: FieldTarget::Attr(name.into()),
        }
    }

    /// Attribute `name` of the scope element itself.
    #[must_use]
    pub fn own_attr(name: impl Into<String>) -> Self {
        Self {
            selector: None,
            target: FieldTarget::Attr(name.into()),
        }
    }

    /// Parses the selector.
    pub fn compile(&self) -> Result<CompiledField, ConfigurationError> {
        let selector = self.selector.as_deref().map(compile_selector).transpose()?;
        Ok(CompiledField {
            selector,
            target: self.target.clone(),
        })
    }
}

/// A [`FieldSpec`] with its selector parsed.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub(crate) selector: Option<Selector>,
    pub(crate) target: FieldTarget,
}

/// Parses a CSS selector, mapping failures to a configuration error.
pub fn compile_selector(raw: &str) -> Result<Selector, ConfigurationError> {
    Selector::parse(raw).map_err(|e| {
        ConfigurationError::new(format!("Invalid selector '{raw}': {e}"))
            .with_field("selector")
            .with_fix_hint("Use CSS selector syntax supported by the HTML engine.")
    })
}
