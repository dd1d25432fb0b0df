//! Events emitted by the grid to its host.

use serde::Serialize;
use serde_json::Value;

/// A caller-defined action invoked on a row (e.g. "delete")
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowAction {
    pub action: String,
    pub row: Value,
}

/// Output of the grid, drained by the host after each interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableEvent {
    /// Filter input changed; carries the trimmed, lower-cased text
    SearchChanged { filter: String },
    /// A row action was invoked
    RowAction(RowAction),
}
