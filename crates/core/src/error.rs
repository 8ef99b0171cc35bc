//! Resolution error model.

use thiserror::Error;

/// Result type used across the resolution layer.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure classes surfaced by SKU resolution.
///
/// Only [`CatalogError::NotFound`] drives internal fallback behavior (search
/// falls through to creation). Every other class propagates to the caller
/// unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog returned zero matching items.
    #[error("not found: {0}")]
    NotFound(String),

    /// Ambiguous or partially-missing result set.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller-supplied attributes failed the required-field rules.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Connectivity, timeout or decoding failure talking to the catalog.
    #[error("catalog transport error: {0}")]
    Transport(String),

    /// Unrecognized search discriminator or missing request field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CatalogError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Stable machine-readable code for the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_error",
            Self::Transport(_) => "catalog_unavailable",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }
}
