use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by conversation operations.
///
/// Provider failures never appear here: the responder absorbs them and
/// answers from a later tier instead.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Input rejected before any mutation or network call.
    #[error("{0}")]
    Validation(String),

    /// The store was unreachable or a write failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),

    /// The caller went away before the exchange was persisted.
    #[error("exchange cancelled")]
    Cancelled,
}
