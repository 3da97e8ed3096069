use std::io;
use thiserror::Error;

/// Errors surfaced by the ownership ledger collaborator.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// IO errors that occur when reading/writing journal files
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Database errors from the underlying storage backend
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Object or capability reference does not resolve to a live instance
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller does not own the referenced object
    #[error("Not owned by caller: {0}")]
    NotOwned(String),

    /// Second initialization attempt on a collection. Fatal: the
    /// collection identity is burned and cannot be claimed again.
    #[error("Collection already initialized: {0}")]
    AlreadyInitialized(String),

    /// Identity derivation exhausted every bump value
    #[error("Identity derivation failed: {0}")]
    Identity(String),

    /// Errors that occur during journal operations
    #[error("Journal error: {0}")]
    Journal(String),

    /// Generic errors that don't fit in other categories
    #[error("Other error: {0}")]
    Other(String),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

// Additional From conversions for common error types

impl From<bincode::Error> for LedgerError {
    fn from(err: bincode::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => {
                LedgerError::NotFound("Row not found".to_string())
            }
            _ => LedgerError::Database(err.to_string()),
        }
    }
}

impl From<String> for LedgerError {
    fn from(err: String) -> Self {
        LedgerError::Other(err)
    }
}

impl From<&str> for LedgerError {
    fn from(err: &str) -> Self {
        LedgerError::Other(err.to_string())
    }
}

/// Errors produced by the capability-gated lifecycle operations.
///
/// Authorization and argument validation fail locally; everything the
/// ledger rejects (NotFound, NotOwned, AlreadyInitialized) arrives
/// wrapped in the `Ledger` variant. No operation is retried
/// internally.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Wrong or missing capability token presented to a gated operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed call: zero count or attributes that do not satisfy
    /// the collection schema
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the ownership ledger
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
