use std::path::PathBuf;

/// Failure reading or writing a document through a [`crate::store::DocumentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// The transform step rejected the document text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Outline nests {depth} levels deep, limit is {limit}")]
    TooDeep { depth: usize, limit: usize },
}

/// Reasons a synchronization pass aborted. The previously rendered diagram stays in place.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
