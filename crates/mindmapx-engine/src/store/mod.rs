//! Document storage collaborator: whole-text reads and writes keyed by handle,
//! plus the change notifications that drive synchronization.

mod fs;
mod memory;

pub use fs::{FsDocumentStore, validate_notes_dir};
pub use memory::MemoryDocumentStore;

use crate::error::StoreError;
use crate::models::DocumentHandle;

pub trait DocumentStore {
    fn read(&self, handle: &DocumentHandle) -> Result<String, StoreError>;
    /// Replace the full content of the document
    fn write(&mut self, handle: &DocumentHandle, text: &str) -> Result<(), StoreError>;
}

/// External notification that a document's text may have changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The stored file was modified
    Modified(DocumentHandle),
    /// Live typing in an editor open on the document
    EditorChanged(DocumentHandle),
}

impl DocumentEvent {
    pub fn handle(&self) -> &DocumentHandle {
        match self {
            DocumentEvent::Modified(handle) | DocumentEvent::EditorChanged(handle) => handle,
        }
    }
}
