//! Rows held by the grid: filtering, sorting and pagination.
//!
//! Rows are opaque JSON records. The filter matches against the lower-cased
//! concatenation of every field value, each followed by a `◬` separator so a
//! match cannot span two fields.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::types::FALLBACK_PAGE_SIZE;

/// Separator appended after every field value when building a row's filter text
const FILTER_FIELD_SEPARATOR: char = '◬';

/// Sort direction for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

/// Pagination position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
    /// Rows after filtering
    pub length: usize,
    pub page_count: usize,
}

/// Plain-text form of a field value
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn filter_text(row: &Value) -> String {
    let mut text = String::new();
    match row {
        Value::Object(map) => {
            for value in map.values() {
                match value {
                    Value::Null => text.push_str("null"),
                    other => text.push_str(&value_text(other)),
                }
                text.push(FILTER_FIELD_SEPARATOR);
            }
        }
        other => {
            text.push_str(&value_text(other));
            text.push(FILTER_FIELD_SEPARATOR);
        }
    }
    text.to_lowercase()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => value_text(x)
            .to_lowercase()
            .cmp(&value_text(y).to_lowercase()),
    }
}

/// Rows plus filter, sort and pagination state
#[derive(Debug, Clone)]
pub struct DataSource {
    rows: Vec<Value>,
    filter: String,
    sort: Option<SortState>,
    paginate: bool,
    page_index: usize,
    page_size: usize,
    /// Indices into `rows` after filtering and sorting
    view: Vec<usize>,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            filter: String::new(),
            sort: None,
            paginate: false,
            page_index: 0,
            page_size: FALLBACK_PAGE_SIZE,
            view: Vec::new(),
        }
    }
}

impl DataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rows; filter and sort are kept, the page is clamped
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
        self.refresh();
    }

    /// Set the normalized filter text and return to the first page
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.trim().to_lowercase();
        self.page_index = 0;
        self.refresh();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Set or clear the active sort
    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
        self.refresh();
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Enable or disable pagination with the given page size
    pub fn configure_paging(&mut self, enabled: bool, page_size: usize) {
        self.paginate = enabled;
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    pub fn is_paginated(&self) -> bool {
        self.paginate
    }

    /// Number of pages (at least 1)
    pub fn page_count(&self) -> usize {
        if !self.paginate {
            return 1;
        }
        self.view.len().div_ceil(self.page_size).max(1)
    }

    /// Move to `index`, clamped to the last page. Returns whether the page changed.
    pub fn set_page(&mut self, index: usize) -> bool {
        let clamped = index.min(self.page_count().saturating_sub(1));
        if clamped == self.page_index {
            return false;
        }
        self.page_index = clamped;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page_index.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> bool {
        match self.page_index.checked_sub(1) {
            Some(index) => self.set_page(index),
            None => false,
        }
    }

    /// Change the page size, keeping the previous first row on screen
    pub fn set_page_size(&mut self, size: usize) -> bool {
        let size = size.max(1);
        if size == self.page_size {
            return false;
        }
        let first_row = self.page_index * self.page_size;
        self.page_size = size;
        self.page_index = first_row / size;
        true
    }

    pub fn page(&self) -> PageState {
        PageState {
            page_index: self.page_index,
            page_size: self.page_size,
            length: self.view.len(),
            page_count: self.page_count(),
        }
    }

    /// Rows after filtering, before pagination
    pub fn filtered_len(&self) -> usize {
        self.view.len()
    }

    /// Rows of the current page, filtered and sorted
    pub fn visible_rows(&self) -> Vec<&Value> {
        let indices: &[usize] = if self.paginate {
            let start = (self.page_index * self.page_size).min(self.view.len());
            let end = (start + self.page_size).min(self.view.len());
            self.view.get(start..end).unwrap_or(&[])
        } else {
            &self.view
        };
        indices.iter().filter_map(|&i| self.rows.get(i)).collect()
    }

    /// Row at `index` of the current page
    pub fn visible_row(&self, index: usize) -> Option<&Value> {
        let offset = if self.paginate {
            self.page_index * self.page_size
        } else {
            0
        };
        if self.paginate && index >= self.page_size {
            return None;
        }
        self.view
            .get(offset + index)
            .and_then(|&i| self.rows.get(i))
    }

    fn refresh(&mut self) {
        let filter = self.filter.as_str();
        let mut view: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.is_empty() || filter_text(row).contains(filter))
            .map(|(i, _)| i)
            .collect();

        if let Some(sort) = &self.sort {
            let rows = &self.rows;
            view.sort_by(|&a, &b| {
                let ord = compare_values(
                    rows.get(a).and_then(|r| r.get(&sort.key)),
                    rows.get(b).and_then(|r| r.get(&sort.key)),
                );
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        self.view = view;
        let last_page = self.page_count().saturating_sub(1);
        self.page_index = self.page_index.min(last_page);
    }
}
