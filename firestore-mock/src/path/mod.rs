//! Addressing: slash-separated resource paths for documents and collections,
//! dotted field paths for values inside a document.

mod field_path;
mod resource_path;

pub use field_path::FieldPath;
pub use resource_path::ResourcePath;
