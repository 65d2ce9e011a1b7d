//! Boundary to the tree-building transform and the diagram renderer.

pub mod headless;
pub mod markdown;
pub mod node;
pub mod render;

pub use headless::{HeadlessHandle, HeadlessRenderer, RenderCall};
pub use markdown::MarkdownTransformer;
pub use node::{FeatureSet, Node, Transformed};
pub use render::{Diagram, RenderOptions, Renderer};

use crate::error::ParseError;

/// Tree-building side of the diagram adapter. Must be deterministic.
pub trait Transformer {
    fn transform(&self, document_text: &str) -> Result<Transformed, ParseError>;
}
