//! Error types for the model

/// Errors raised while constructing model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Version tag is not `major.minor.patch`
    #[error("invalid schema version: '{0}'")]
    InvalidVersion(String),
}
