pub mod document_handle;

pub use document_handle::DocumentHandle;
