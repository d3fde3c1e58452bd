use crate::path::ResourcePath;
use indexmap::{IndexMap, IndexSet};

/// Collection path to member document paths, both in first-write order.
///
/// A collection stays indexed after its last document is deleted, so a later
/// write into it is not reported as a new collection again.
#[derive(Clone, Default, Debug)]
pub(crate) struct CollectionIndex {
    collections: IndexMap<ResourcePath, IndexSet<ResourcePath>>,
}

impl CollectionIndex {
    pub(crate) fn new() -> Self {
        CollectionIndex::default()
    }

    /// Records `document` as a member of its parent collection. Returns
    /// `true` if the collection was not indexed before.
    pub(crate) fn add(&mut self, document: &ResourcePath) -> bool {
        let Some(collection) = document.parent() else {
            return false;
        };
        let created = !self.collections.contains_key(&collection);
        self.collections
            .entry(collection)
            .or_default()
            .insert(document.clone());
        created
    }

    pub(crate) fn remove(&mut self, document: &ResourcePath) {
        if let Some(collection) = document.parent() {
            if let Some(members) = self.collections.get_mut(&collection) {
                members.shift_remove(document);
            }
        }
    }

    pub(crate) fn contains(&self, collection: &ResourcePath) -> bool {
        self.collections.contains_key(collection)
    }

    pub(crate) fn members(&self, collection: &ResourcePath) -> Vec<ResourcePath> {
        self.collections
            .get(collection)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Collections at any depth below the root whose final segment is `id`.
    pub(crate) fn collections_with_id(&self, id: &str) -> Vec<ResourcePath> {
        self.collections
            .keys()
            .filter(|collection| collection.ends_with_id(id))
            .cloned()
            .collect()
    }
}
