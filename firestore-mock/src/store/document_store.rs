use crate::collection::DocumentData;
use crate::errors::{raise, ErrorKind, FirestoreResult};
use crate::path::ResourcePath;
use crate::store::CollectionIndex;

/// What a single write did to the collection index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct WriteOutcome {
    pub(crate) created_collection: bool,
}

/// Authoritative map from document path to document data.
///
/// Documents live in a persistent hash map so the whole store can be cloned
/// cheaply into an isolated surrogate; the collection index is updated as
/// part of every write, before the caller publishes any event.
#[derive(Clone, Default)]
pub(crate) struct DocumentStore {
    documents: im::HashMap<ResourcePath, DocumentData>,
    index: CollectionIndex,
}

impl DocumentStore {
    pub(crate) fn new() -> Self {
        DocumentStore {
            documents: im::HashMap::new(),
            index: CollectionIndex::new(),
        }
    }

    pub(crate) fn read(&self, path: &ResourcePath) -> Option<&DocumentData> {
        self.documents.get(path)
    }

    /// Replaces the document at `path`, or deletes it when `data` is `None`.
    pub(crate) fn write(&mut self, path: &ResourcePath, data: Option<DocumentData>) -> WriteOutcome {
        debug_assert!(path.is_document(), "write to non-document path {:?}", path);
        match data {
            Some(data) => {
                self.documents.insert(path.clone(), data);
                let created_collection = self.index.add(path);
                if created_collection {
                    log::debug!("Created collection {:?}", path.parent());
                }
                WriteOutcome { created_collection }
            }
            None => {
                self.documents.remove(path);
                self.index.remove(path);
                WriteOutcome::default()
            }
        }
    }

    /// Deep-merges `partial` into the existing document; a missing document
    /// merges into empty data.
    pub(crate) fn merge(&mut self, path: &ResourcePath, partial: &DocumentData) -> FirestoreResult<WriteOutcome> {
        let mut data = self.read(path).cloned().unwrap_or_default();
        data.merge(partial)?;
        Ok(self.write(path, Some(data)))
    }

    /// Applies dotted-key updates to an existing document.
    pub(crate) fn update(&mut self, path: &ResourcePath, update: &DocumentData) -> FirestoreResult<WriteOutcome> {
        let Some(existing) = self.read(path) else {
            return Err(raise(
                &format!("No document to update: {}", path),
                ErrorKind::NotFound,
            ));
        };
        let mut data = existing.clone();
        data.apply_update(update)?;
        Ok(self.write(path, Some(data)))
    }

    /// Document paths of a collection, in first-write order.
    pub(crate) fn children(&self, collection: &ResourcePath) -> Vec<ResourcePath> {
        self.index.members(collection)
    }

    pub(crate) fn has_collection(&self, collection: &ResourcePath) -> bool {
        self.index.contains(collection)
    }

    pub(crate) fn collections_with_id(&self, id: &str) -> Vec<ResourcePath> {
        self.index.collections_with_id(id)
    }

    pub(crate) fn document_count(&self) -> usize {
        self.documents.len()
    }
}
