//! In-place node editing and write-back into the document.

use crate::error::EditError;
use crate::index::NodeLineIndex;
use crate::models::DocumentHandle;
use crate::store::DocumentStore;
use crate::text::classify;

/// Narrowest editor the overlay will draw, in surface units.
pub const MIN_EDITOR_WIDTH: f64 = 100.0;

/// On-screen geometry of the node being edited, relative to the diagram surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Anchor {
    pub fn editor_width(&self) -> f64 {
        self.width.max(MIN_EDITOR_WIDTH)
    }
}

/// The live edit: what the node showed, where it is, and what the user typed.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    original: String,
    anchor: Anchor,
    draft: String,
}

impl EditSession {
    fn new(original: String, anchor: Anchor) -> Self {
        let draft = original.clone();
        Self {
            original,
            anchor,
            draft,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn backspace(&mut self) {
        self.draft.pop();
    }
}

/// Keys and focus changes the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Confirm,
    Cancel,
    /// The editor lost focus
    Blur,
}

/// Why an edit could not be placed in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMiss {
    /// The pre-edit text has no entry in the index
    NotIndexed,
    /// The indexed line is past the end of the current text
    LineGone,
    /// The indexed line is no longer a heading or list item
    NotOutline,
    /// The line no longer contains the pre-edit text
    TextNotInLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The document was rewritten with the edited line
    Written { line: usize },
    /// New text was empty or equal to the old text; nothing written
    Unchanged,
    /// The edit could not be mapped to a line and was dropped
    Discarded(EditMiss),
    /// No edit session was active
    NotEditing,
    /// No document is bound
    Unbound,
}

/// Replace `old_display` with `new_text` on the line the index maps it to.
///
/// The marker prefix (`#` run, or indentation and bullet) is left as is and
/// only the first occurrence after it is replaced. Returns the full updated
/// text and the line that changed.
pub fn apply_node_edit(
    document_text: &str,
    index: &NodeLineIndex,
    old_display: &str,
    new_text: &str,
) -> Result<(String, usize), EditMiss> {
    let span = index.lookup(old_display).ok_or(EditMiss::NotIndexed)?;
    let lines: Vec<&str> = document_text.split('\n').collect();
    let line = *lines.get(span.start_line).ok_or(EditMiss::LineGone)?;
    let outline = classify(line).ok_or(EditMiss::NotOutline)?;

    let old = old_display.trim();
    if old.is_empty() || !outline.text.contains(old) {
        return Err(EditMiss::TextNotInLine);
    }
    let edited = format!("{}{}", outline.prefix, outline.text.replacen(old, new_text, 1));
    let updated = lines
        .iter()
        .enumerate()
        .map(|(i, l)| if i == span.start_line { edited.as_str() } else { *l })
        .collect::<Vec<_>>()
        .join("\n");
    Ok((updated, span.start_line))
}

/// Owner of the single edit session. Starting while one is active is a no-op.
#[derive(Debug, Default)]
pub struct EditOverlay {
    session: Option<EditSession>,
}

impl EditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an editor on a node. Returns false, leaving the current session
    /// untouched, when one is already active.
    pub fn start(&mut self, display_text: impl Into<String>, anchor: Anchor) -> bool {
        if self.session.is_some() {
            log::debug!("edit already active, ignoring new start");
            return false;
        }
        self.session = Some(EditSession::new(display_text.into(), anchor));
        true
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    /// Close the editor without touching the document
    pub fn cancel(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    /// Close the editor and write the edit back through `index`.
    ///
    /// The session ends whatever the outcome, including errors. The document
    /// is read fresh; `index` is the snapshot from the last render.
    pub fn commit<S: DocumentStore>(
        &mut self,
        store: &mut S,
        handle: Option<&DocumentHandle>,
        index: &NodeLineIndex,
    ) -> Result<CommitOutcome, EditError> {
        let Some(session) = self.session.take() else {
            return Ok(CommitOutcome::NotEditing);
        };

        let new_text = session.draft.trim();
        if new_text.is_empty() || new_text == session.original.trim() {
            return Ok(CommitOutcome::Unchanged);
        }
        let Some(handle) = handle else {
            return Ok(CommitOutcome::Unbound);
        };

        let current = store.read(handle)?;
        match apply_node_edit(&current, index, &session.original, new_text) {
            Ok((updated, line)) => {
                store.write(handle, &updated)?;
                log::debug!("wrote node edit to {handle} line {line}");
                Ok(CommitOutcome::Written { line })
            }
            Err(miss) => {
                log::warn!(
                    "dropping edit of {:?} in {handle}: {miss:?}",
                    session.original
                );
                Ok(CommitOutcome::Discarded(miss))
            }
        }
    }
}
