//! Column configuration.

use serde::{Deserialize, Serialize};

/// Width used when a column has no configured width (pixels).
pub const DEFAULT_COLUMN_WIDTH: f32 = 150.0;

/// Minimum width used when a column has no configured minimum (pixels).
pub const MIN_COLUMN_WIDTH: f32 = 80.0;

/// How a column's cells are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Cell value rendered as plain text
    #[default]
    Text,
    /// Cell rendered by a host-supplied renderer (badges, action buttons, ...)
    Custom,
}

/// A single column of the grid. Identity is `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique key within the table; also the field name looked up in each row
    pub key: String,
    /// Header label
    pub label: String,
    /// Configured width in pixels (None = default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Minimum width in pixels (None = default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f32>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default, rename = "type")]
    pub kind: ColumnKind,
}

impl Column {
    /// Create a text column with default sizing
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width: None,
            min_width: None,
            sortable: false,
            filterable: false,
            kind: ColumnKind::Text,
        }
    }

    /// Builder: set the configured width
    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Builder: set the minimum width
    #[must_use]
    pub fn with_min_width(mut self, min_width: f32) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Builder: mark the column sortable
    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Builder: render the column with a custom renderer
    #[must_use]
    pub fn custom(mut self) -> Self {
        self.kind = ColumnKind::Custom;
        self
    }

    /// Configured width, falling back to `default_width` when unset or not positive.
    pub fn configured_width_or(&self, default_width: f32) -> f32 {
        match self.width {
            Some(w) if w > 0.0 && w.is_finite() => w,
            _ => default_width,
        }
    }

    /// Minimum width, falling back to `default_min` when unset or not positive.
    pub fn min_width_or(&self, default_min: f32) -> f32 {
        match self.min_width {
            Some(w) if w > 0.0 && w.is_finite() => w,
            _ => default_min,
        }
    }

    /// Configured width with the stock default
    pub fn configured_width(&self) -> f32 {
        self.configured_width_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Minimum width with the stock default
    pub fn effective_min_width(&self) -> f32 {
        self.min_width_or(MIN_COLUMN_WIDTH)
    }
}
