use relative_path::{RelativePath, RelativePathBuf};

/// Stable reference to one markdown document under the notes root.
///
/// Two handles are the same document when their relative paths match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    relative_path: RelativePathBuf,
}

impl DocumentHandle {
    pub fn new(relative_path: impl Into<RelativePathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// File name without the `.md` extension
    pub fn basename(&self) -> &str {
        self.relative_path
            .file_name()
            .map(|name| name.strip_suffix(".md").unwrap_or(name))
            .unwrap_or("Untitled")
    }
}

impl From<&str> for DocumentHandle {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl std::fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.relative_path.as_str())
    }
}
