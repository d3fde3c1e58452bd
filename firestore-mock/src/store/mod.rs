//! In-memory document storage and the collection membership index.

mod collection_index;
mod document_store;

pub(crate) use collection_index::CollectionIndex;
pub(crate) use document_store::{DocumentStore, WriteOutcome};
