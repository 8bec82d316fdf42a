//! Error types for ByteVault

use thiserror::Error;

/// Result type alias for ByteVault operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by store operations.
///
/// Missing keys are not errors: lookups report absence through `Option`
/// and `bool` results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("empty key")]
    EmptyKey,
}
