use std::collections::HashMap;

use super::{DocumentEvent, DocumentStore};
use crate::error::StoreError;
use crate::models::DocumentHandle;

/// In-memory store. Every successful write queues a [`DocumentEvent::Modified`],
/// the way a file system reports the store's own writes back. An event that is
/// already queued is not queued again, so an undrained queue holds at most
/// one event per document and kind.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: HashMap<DocumentHandle, String>,
    events: Vec<DocumentEvent>,
    read_only: bool,
    writes: usize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, handle: impl Into<DocumentHandle>, text: &str) -> Self {
        self.documents.insert(handle.into(), text.to_string());
        self
    }

    /// Change a document as an outside actor would
    pub fn modify_externally(&mut self, handle: &DocumentHandle, text: &str) {
        self.documents.insert(handle.clone(), text.to_string());
        self.queue(DocumentEvent::Modified(handle.clone()));
    }

    /// Make writes fail with a permission error
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn text(&self, handle: &DocumentHandle) -> Option<&str> {
        self.documents.get(handle).map(String::as_str)
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    fn queue(&mut self, event: DocumentEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, handle: &DocumentHandle) -> Result<String, StoreError> {
        self.documents
            .get(handle)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(handle.relative_path().to_path("")))
    }

    fn write(&mut self, handle: &DocumentHandle, text: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{handle} is read only"),
            )));
        }
        self.documents.insert(handle.clone(), text.to_string());
        self.queue(DocumentEvent::Modified(handle.clone()));
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_queues_modified_event() {
        let handle = DocumentHandle::from("a.md");
        let mut store = MemoryDocumentStore::new().with_document("a.md", "- a\n");

        store.write(&handle, "- b\n").unwrap();

        assert_eq!(store.text(&handle), Some("- b\n"));
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.take_events(), vec![DocumentEvent::Modified(handle)]);
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn test_read_only_write_fails() {
        let handle = DocumentHandle::from("a.md");
        let mut store = MemoryDocumentStore::new().with_document("a.md", "- a\n");
        store.set_read_only(true);

        assert!(matches!(store.write(&handle, "x"), Err(StoreError::Io(_))));
        assert_eq!(store.text(&handle), Some("- a\n"));
    }

    #[test]
    fn test_missing_document() {
        let store = MemoryDocumentStore::new();
        assert!(matches!(
            store.read(&DocumentHandle::from("nope.md")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_undrained_events_do_not_pile_up() {
        let handle = DocumentHandle::from("a.md");
        let mut store = MemoryDocumentStore::new().with_document("a.md", "- a\n");

        for i in 0..100 {
            store.write(&handle, &format!("- {i}\n")).unwrap();
        }
        store.modify_externally(&handle, "- outside\n");

        assert_eq!(store.write_count(), 100);
        assert_eq!(store.take_events(), vec![DocumentEvent::Modified(handle)]);
    }
}
