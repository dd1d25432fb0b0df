//! Column width computation.
//!
//! Every column keeps its current width except the last one, which absorbs
//! the slack when the container is wide and falls back to its floor
//! (`max(default, configured)`) when it is narrow. When the resulting total
//! exceeds the container the table is given an explicit width and scrolls
//! horizontally; otherwise it fills the container.

use serde::Serialize;

use super::columns::{ColumnModel, WidthState};
use crate::types::LayoutOptions;

/// Measurements of the scrollable body region
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMetrics {
    /// Inner width of the body region (excludes the scrollbar gutter in browsers)
    pub client_width: f32,
    /// Inner height of the body region
    pub client_height: f32,
    /// Full content height of the body region
    pub scroll_height: f32,
}

impl ContainerMetrics {
    /// Metrics for a container whose content does not overflow vertically
    pub fn new(client_width: f32, client_height: f32) -> Self {
        Self {
            client_width,
            client_height,
            scroll_height: client_height,
        }
    }

    /// Builder: set the content height
    #[must_use]
    pub fn with_scroll_height(mut self, scroll_height: f32) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    /// True when the body content is taller than the body region
    pub fn has_vertical_scrollbar(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

/// How the table element itself is sized
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "width", rename_all = "camelCase")]
pub enum TableWidth {
    /// Table fits: fill 100% of the container, no horizontal scroll
    Fill,
    /// Table overflows: explicit pixel width, container scrolls horizontally
    Fixed(f32),
}

/// Text-overflow presentation of the last column's cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LastColumnFit {
    /// Total width fits the container (`has-space`)
    HasSpace,
    /// Total width exceeds the container (`constrained`)
    Constrained,
}

impl LastColumnFit {
    /// Class name applied to the last column's cells
    pub fn class_name(self) -> &'static str {
        match self {
            Self::HasSpace => "has-space",
            Self::Constrained => "constrained",
        }
    }
}

/// Result of one width computation, applied atomically to the rendered grid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    /// Displayed width of every column, in display order
    pub widths: WidthState,
    /// Width available to columns (container minus scrollbar gutter)
    pub available_width: f32,
    /// Sum of all displayed widths
    pub total_width: f32,
    /// Client width of the container
    pub container_width: f32,
    /// Header must compensate for the body's scrollbar gutter
    pub has_vertical_scrollbar: bool,
    pub last_column_fit: LastColumnFit,
    pub table_width: TableWidth,
}

impl LayoutPlan {
    /// True when the table is wider than its container
    pub fn is_scrollable(&self) -> bool {
        matches!(self.table_width, TableWidth::Fixed(_))
    }

    /// Displayed width of the last column
    pub fn last_column_width(&self) -> Option<f32> {
        self.widths.iter().last().map(|e| e.width)
    }
}

/// Computes displayed column widths for a container size
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Container width minus the scrollbar gutter when one is present
    pub fn available_width(&self, metrics: &ContainerMetrics) -> f32 {
        let scrollbar = if metrics.has_vertical_scrollbar() {
            self.options.scrollbar_width
        } else {
            0.0
        };
        metrics.client_width - scrollbar
    }

    /// Sum of current widths of every column except the last
    pub fn fixed_width(&self, columns: &ColumnModel) -> f32 {
        let widths = columns.current_widths();
        match widths.split_last() {
            Some((_, rest)) => rest.iter().sum(),
            None => 0.0,
        }
    }

    /// Width of the last column: `max(default, configured, available - fixed)`
    pub fn last_column_width(&self, columns: &ColumnModel, available_width: f32) -> f32 {
        let configured = columns
            .current_widths()
            .last()
            .copied()
            .unwrap_or(self.options.default_width);
        let remaining = available_width - self.fixed_width(columns);
        self.options.default_width.max(configured).max(remaining)
    }

    /// Compute the displayed width of every column.
    ///
    /// Returns None when there are no columns.
    pub fn compute(&self, columns: &ColumnModel, metrics: &ContainerMetrics) -> Option<LayoutPlan> {
        let (last_key, _) = columns.columns().split_last()?;
        let last_key = last_key.key.as_str();

        let available_width = self.available_width(metrics);
        let last_width = self.last_column_width(columns, available_width);

        let mut widths = WidthState::default();
        for (col, &current) in columns.columns().iter().zip(columns.current_widths()) {
            let width = if col.key == last_key {
                last_width
            } else {
                current
            };
            widths.push(&col.key, width);
        }

        let total_width = widths.total();
        let container_width = metrics.client_width;
        let has_extra_space = total_width <= container_width;

        Some(LayoutPlan {
            widths,
            available_width,
            total_width,
            container_width,
            has_vertical_scrollbar: metrics.has_vertical_scrollbar(),
            last_column_fit: if has_extra_space {
                LastColumnFit::HasSpace
            } else {
                LastColumnFit::Constrained
            },
            table_width: if has_extra_space {
                TableWidth::Fill
            } else {
                TableWidth::Fixed(total_width)
            },
        })
    }
}
