//! Line-level text handling shared by the index builder and the edit write-back.

pub mod normalize;
pub mod patterns;

pub use normalize::normalize;
pub use patterns::{LineKind, OutlineLine, classify};
