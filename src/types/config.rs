//! Table configuration and tuning options.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::column::{Column, DEFAULT_COLUMN_WIDTH, MIN_COLUMN_WIDTH};
use crate::error::{CfTableError, Result};

/// Fixed width reserved for a vertical scrollbar (pixels)
pub const SCROLLBAR_WIDTH: f32 = 17.0;

/// Page sizes offered when the config does not specify any
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];

/// Page size used when the configured options are empty
pub const FALLBACK_PAGE_SIZE: usize = 10;

/// Column configuration plus display options.
///
/// Immutable once handed to a table; supplying a new config re-initializes
/// every column width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub show_search: bool,
    #[serde(default = "default_search_placeholder")]
    pub search_placeholder: String,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    #[serde(default)]
    pub show_pagination: bool,
    /// CSS height of the body region (e.g. `"400px"`); None lets the host size it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

fn default_search_placeholder() -> String {
    "Search".to_string()
}

fn default_page_size_options() -> Vec<usize> {
    DEFAULT_PAGE_SIZE_OPTIONS.to_vec()
}

impl TableConfig {
    /// Config with the given columns and default display options
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            show_search: false,
            search_placeholder: default_search_placeholder(),
            page_size_options: default_page_size_options(),
            show_pagination: false,
            height: None,
        }
    }

    /// Parse a config from JSON text
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the columns are invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every column key is non-empty and unique.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for col in &self.columns {
            if col.key.is_empty() {
                return Err(CfTableError::InvalidConfig(format!(
                    "column '{}' has an empty key",
                    col.label
                )));
            }
            if !seen.insert(col.key.as_str()) {
                return Err(CfTableError::InvalidConfig(format!(
                    "duplicate column key '{}'",
                    col.key
                )));
            }
        }
        Ok(())
    }

    /// Initial page size: the first positive configured option
    pub fn initial_page_size(&self) -> usize {
        self.page_size_options
            .iter()
            .copied()
            .find(|&size| size > 0)
            .unwrap_or(FALLBACK_PAGE_SIZE)
    }
}

/// Sizing constants used by the layout engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Width given to columns without a configured width, and the floor of the last column
    pub default_width: f32,
    /// Minimum width given to columns without a configured minimum
    pub min_width: f32,
    /// Width subtracted from the container when a vertical scrollbar is present
    pub scrollbar_width: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_COLUMN_WIDTH,
            min_width: MIN_COLUMN_WIDTH,
            scrollbar_width: SCROLLBAR_WIDTH,
        }
    }
}

/// Delays used by the observation loop (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
    /// Quiet period after the last container size notification
    pub resize_debounce_ms: f64,
    /// Settle delay after mount before the first measurement
    pub mount_settle_ms: f64,
    /// Settle delay after new rows arrive
    pub data_settle_ms: f64,
    /// Settle delay after a page change
    pub page_settle_ms: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 150.0,
            mount_settle_ms: 200.0,
            data_settle_ms: 100.0,
            page_settle_ms: 50.0,
        }
    }
}

/// All tuning options of a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    pub layout: LayoutOptions,
    pub timings: Timings,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TableConfig::from_json(r#"{"columns":[{"key":"title","label":"Title"}]}"#)
            .unwrap();
        assert!(!config.show_search);
        assert!(!config.show_pagination);
        assert_eq!(config.search_placeholder, "Search");
        assert_eq!(config.page_size_options, vec![5, 10, 25, 50]);
        assert_eq!(config.initial_page_size(), 5);
        assert!(config.height.is_none());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = TableConfig::from_json(
            r#"{"columns":[{"key":"a","label":"A"},{"key":"a","label":"Again"}]}"#,
        )
        .unwrap_err();
        match err {
            CfTableError::InvalidConfig(msg) => assert!(msg.contains("'a'")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_page_size_options_fall_back() {
        let mut config = TableConfig::new(vec![Column::new("a", "A")]);
        config.page_size_options.clear();
        assert_eq!(config.initial_page_size(), FALLBACK_PAGE_SIZE);
    }

    #[test]
    fn test_partial_options_keep_defaults() {
        let options: TableOptions =
            serde_json::from_str(r#"{"timings":{"resizeDebounceMs":300}}"#).unwrap();
        assert_eq!(options.timings.resize_debounce_ms, 300.0);
        assert_eq!(options.timings.mount_settle_ms, 200.0);
        assert_eq!(options.layout.scrollbar_width, SCROLLBAR_WIDTH);
    }
}
