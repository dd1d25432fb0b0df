//! Structured error types for cf-table.
//!
//! Layout itself never fails; errors only come from configuration input
//! and from the host boundary (JSON, files, JS values).

/// All errors that can occur while configuring or hosting a table.
#[derive(Debug, thiserror::Error)]
pub enum CfTableError {
    /// Column configuration violates an invariant (empty or duplicate key).
    #[error("Invalid table config: {0}")]
    InvalidConfig(String),

    /// Malformed JSON input.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Conversion failure at the JavaScript boundary.
    #[error("JS value: {0}")]
    Js(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CfTableError>;

impl From<serde_wasm_bindgen::Error> for CfTableError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::Js(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<CfTableError> for wasm_bindgen::JsValue {
    fn from(e: CfTableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
