//! Synchronization core between a markdown outline and its mind map.
//!
//! Text flows one way through [`sync::SyncEngine`]: the document is read,
//! transformed into a [`diagram::Node`] tree, indexed line by line and pushed
//! to the renderer. Edits flow back through [`edit::EditOverlay`], which finds
//! the source line through the [`index::NodeLineIndex`] and rewrites the
//! document, which in turn re-enters the sync loop as a change notification.

pub mod diagram;
pub mod edit;
pub mod error;
pub mod index;
pub mod models;
pub mod schedule;
pub mod store;
pub mod sync;
pub mod text;
pub mod view;
pub mod viewport;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use diagram::{
    Diagram, FeatureSet, HeadlessRenderer, MarkdownTransformer, Node, RenderOptions, Renderer,
    Transformed, Transformer,
};
pub use edit::{Anchor, CommitOutcome, EditKey, EditMiss, EditOverlay, EditSession};
pub use error::{EditError, ParseError, StoreError, SyncError};
pub use index::{LineSpan, NodeLineIndex, build_index};
pub use models::DocumentHandle;
pub use store::{DocumentEvent, DocumentStore, FsDocumentStore, MemoryDocumentStore};
pub use sync::{SyncEngine, SyncOutcome, SyncSettings, SyncTrigger};
pub use text::normalize;
pub use view::{MindMapView, ViewSettings, Workspace};
pub use viewport::{Viewport, ViewportLimits};
