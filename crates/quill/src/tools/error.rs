//! Tool Error Types
//!
//! All tool operations return `Result<T, ToolError>` for consistent error handling.

use thiserror::Error;

use crate::macro_data::MacroDataError;

/// Tool execution error types
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid parameters provided to tool
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Upstream data source failed
    #[error(transparent)]
    MacroData(#[from] MacroDataError),
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidParams(reason.into())
    }

    /// Whether the failure is on the caller side (bad name or arguments)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidParams(_))
    }
}
