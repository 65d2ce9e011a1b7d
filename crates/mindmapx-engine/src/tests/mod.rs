use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary notes directory seeded with `(relative path, content)` documents
pub fn notes_dir_with(documents: &[(&str, &str)]) -> TempDir {
    let notes_dir = tempfile::tempdir().unwrap();
    for (relative, content) in documents {
        write_document(&notes_dir, relative, content);
    }
    notes_dir
}

/// Write one document below the notes directory, creating folders as needed
pub fn write_document(notes_dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let path = notes_dir.path().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
