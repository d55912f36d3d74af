use std::fmt;

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::Result;

/// A lens filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    /// Row id, `None` until stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Manufacturer.
    pub make: String,
    /// Model, e.g. "Y2 yellow".
    pub model: String,
}

impl Filter {
    /// Create an unsaved filter.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: None,
            make: make.into(),
            model: model.into(),
        }
    }

    /// Check the filter before it is written.
    ///
    /// # Errors
    ///
    /// Returns a validation error when make or model is blank.
    pub fn validate(&self) -> Result<()> {
        require_text("filter", "make", &self.make)?;
        require_text("filter", "model", &self.model)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.make, self.model)
    }
}
