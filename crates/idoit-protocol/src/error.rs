//! Error types for building protocol values.

/// Errors raised while assembling a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// A batch key is already taken by an earlier entry.
    #[error("duplicate batch key '{0}'")]
    DuplicateKey(String),
}
