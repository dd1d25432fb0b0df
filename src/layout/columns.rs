//! Per-column width state.
//!
//! Holds the current (user-adjustable) width and the displayed width of every
//! column. The set of keys always equals the set of displayed column keys;
//! entries only change through [`ColumnModel::set_width`] and
//! [`ColumnModel::set_displayed`].

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Column, LayoutOptions};

/// Format a pixel width the way it is written to element styles
pub fn format_px(width: f32) -> String {
    format!("{width}px")
}

/// One entry of a [`WidthState`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidthEntry {
    pub key: String,
    pub width: f32,
    /// `width` formatted for style properties (`"150px"`)
    pub formatted: String,
}

/// Ordered mapping from column key to width, in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WidthState {
    entries: Vec<WidthEntry>,
}

impl WidthState {
    pub(crate) fn push(&mut self, key: &str, width: f32) {
        self.entries.push(WidthEntry {
            key: key.to_string(),
            width,
            formatted: format_px(width),
        });
    }

    /// Width of a column by key
    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.width)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidthEntry> {
        self.entries.iter()
    }

    /// Widths in display order
    pub fn widths(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.width).collect()
    }

    /// Sum of all widths
    pub fn total(&self) -> f32 {
        self.entries.iter().map(|e| e.width).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Columns of the current config with their current and displayed widths
#[derive(Debug, Clone, Default)]
pub struct ColumnModel {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    /// Current width per column (configured, then mutated by drag-resize)
    current: Vec<f32>,
    /// Minimum width per column
    min: Vec<f32>,
    /// Width last written to the rendered grid
    displayed: Vec<f32>,
    default_width: f32,
}

impl ColumnModel {
    /// Set every column's current width to its configured width (default if
    /// unset), clamped to at least its minimum width.
    pub fn initialize(columns: &[Column], options: &LayoutOptions) -> Self {
        let mut current = Vec::with_capacity(columns.len());
        let mut min = Vec::with_capacity(columns.len());
        let mut index = HashMap::with_capacity(columns.len());

        for (i, col) in columns.iter().enumerate() {
            let min_width = col.min_width_or(options.min_width);
            let width = col.configured_width_or(options.default_width).max(min_width);
            current.push(width);
            min.push(min_width);
            index.insert(col.key.clone(), i);
        }

        Self {
            columns: columns.to_vec(),
            index,
            displayed: current.clone(),
            current,
            min,
            default_width: options.default_width,
        }
    }

    /// Overwrite a column's current width, clamped to its minimum.
    ///
    /// Unknown keys are ignored. Returns whether a column was updated.
    pub fn set_width(&mut self, key: &str, width: f32) -> bool {
        let Some(&i) = self.index.get(key) else {
            return false;
        };
        let floor = self.min.get(i).copied().unwrap_or(0.0);
        match self.current.get_mut(i) {
            Some(slot) => {
                *slot = width.max(floor);
                true
            }
            None => false,
        }
    }

    /// Current width of a column
    pub fn width(&self, key: &str) -> Option<f32> {
        self.index
            .get(key)
            .and_then(|&i| self.current.get(i))
            .copied()
    }

    /// Minimum width of a column
    pub fn min_width(&self, key: &str) -> Option<f32> {
        self.index.get(key).and_then(|&i| self.min.get(i)).copied()
    }

    /// Width last written to the rendered grid
    pub fn displayed_width(&self, key: &str) -> Option<f32> {
        self.index
            .get(key)
            .and_then(|&i| self.displayed.get(i))
            .copied()
    }

    /// Displayed width formatted for styles, `"150px"` for unknown keys
    pub fn formatted_width(&self, key: &str) -> String {
        format_px(self.displayed_width(key).unwrap_or(self.default_width))
    }

    /// Record the displayed widths from a computed layout
    pub fn set_displayed(&mut self, widths: &WidthState) {
        for entry in widths.iter() {
            if let Some(slot) = self
                .index
                .get(&entry.key)
                .and_then(|&i| self.displayed.get_mut(i))
            {
                *slot = entry.width;
            }
        }
    }

    /// Current widths as a [`WidthState`]
    pub fn current_state(&self) -> WidthState {
        let mut state = WidthState::default();
        for (col, &w) in self.columns.iter().zip(&self.current) {
            state.push(&col.key, w);
        }
        state
    }

    /// Displayed widths as a [`WidthState`]
    pub fn displayed_state(&self) -> WidthState {
        let mut state = WidthState::default();
        for (col, &w) in self.columns.iter().zip(&self.displayed) {
            state.push(&col.key, w);
        }
        state
    }

    /// Column configuration by key
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.index.get(key).and_then(|&i| self.columns.get(i))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Keys in display order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Current widths in display order
    pub fn current_widths(&self) -> &[f32] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn model() -> ColumnModel {
        ColumnModel::initialize(
            &[
                Column::new("title", "Title").with_width(200.0),
                Column::new("author", "Author"),
                Column::new("year", "Year").with_width(40.0),
                Column::new("notes", "Notes")
                    .with_width(90.0)
                    .with_min_width(120.0),
            ],
            &LayoutOptions::default(),
        )
    }

    #[test]
    fn test_initialize_defaults_and_clamps() {
        let m = model();
        assert_eq!(m.width("title"), Some(200.0));
        assert_eq!(m.width("author"), Some(150.0));
        // Below the default minimum of 80
        assert_eq!(m.width("year"), Some(80.0));
        // Below its own minimum of 120
        assert_eq!(m.width("notes"), Some(120.0));
        assert_eq!(m.min_width("notes"), Some(120.0));
    }

    #[test]
    fn test_keys_match_displayed_columns() {
        let m = model();
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["title", "author", "year", "notes"]);
        assert_eq!(m.current_state().len(), 4);
        assert_eq!(m.displayed_state().len(), 4);
    }

    #[test]
    fn test_set_width_unknown_key_is_noop() {
        let mut m = model();
        let before = m.current_state();
        assert!(!m.set_width("isbn", 300.0));
        assert_eq!(m.current_state(), before);
    }

    #[test]
    fn test_set_width_clamps_to_min() {
        let mut m = model();
        assert!(m.set_width("title", 10.0));
        assert_eq!(m.width("title"), Some(80.0));
        assert!(m.set_width("title", 260.0));
        assert_eq!(m.width("title"), Some(260.0));
    }

    #[test]
    fn test_formatted_width_fallback() {
        let m = model();
        assert_eq!(m.formatted_width("title"), "200px");
        assert_eq!(m.formatted_width("missing"), "150px");
    }

    #[test]
    fn test_format_px_fractional() {
        assert_eq!(format_px(150.0), "150px");
        assert_eq!(format_px(150.5), "150.5px");
    }
}
