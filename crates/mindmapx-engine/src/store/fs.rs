use std::fs;
use std::path::{Path, PathBuf};

use super::DocumentStore;
use crate::error::StoreError;
use crate::models::DocumentHandle;

/// Documents stored as files below a notes directory.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    notes_root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(notes_root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let notes_root = notes_root.into();
        validate_notes_dir(&notes_root)?;
        Ok(Self { notes_root })
    }

    pub fn notes_root(&self) -> &Path {
        &self.notes_root
    }

    /// Absolute path of the file behind `handle`
    pub fn path_of(&self, handle: &DocumentHandle) -> PathBuf {
        handle.relative_path().to_path(&self.notes_root)
    }
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, handle: &DocumentHandle) -> Result<String, StoreError> {
        let absolute_path = self.path_of(handle);
        if !absolute_path.exists() {
            return Err(StoreError::NotFound(absolute_path));
        }
        fs::read_to_string(&absolute_path).map_err(StoreError::Io)
    }

    fn write(&mut self, handle: &DocumentHandle, text: &str) -> Result<(), StoreError> {
        let absolute_path = self.path_of(handle);

        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Io)?;
        }

        fs::write(&absolute_path, text).map_err(StoreError::Io)
    }
}

pub fn validate_notes_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() || !path.is_dir() {
        return Err(StoreError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
